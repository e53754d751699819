use crate::cli::{Command, SchemaAction};
use crate::error::{CliError, CliResult};
use crate::fields::parse_field_flags;
use crate::output::{emit, OutputFormat};
use crate::schema_file;
use binder_core::FieldChangeset;
use binder_schema::Namespace;
use binder_store::{LogStore, WorkspaceConfig};
use binder_tx::canonical::{EntitiesChangeset, EntityChangeset};
use binder_tx::materializer::{entity_state, materialize, EntityState};
use std::path::Path;
use std::time::Duration;

const LOCK_TIMEOUT: Duration = Duration::from_secs(10);

pub fn run(command: Command, workspace: &Path, author_override: Option<String>, format: OutputFormat) -> CliResult<()> {
    match command {
        Command::Init => init(workspace, format),
        Command::Create { type_name, fields } => create(workspace, author_override, format, &type_name, &fields),
        Command::Read { reference } => read(workspace, format, &reference),
        Command::Update { reference, type_name, fields, patch } => {
            update(workspace, author_override, format, &reference, &type_name, &fields, patch.as_deref())
        }
        Command::Delete { reference, type_name } => delete(workspace, author_override, format, &reference, &type_name),
        Command::Search { query } => search(workspace, format, &query),
        Command::Schema(action) => schema(workspace, format, action),
        Command::Transaction { id } => transaction(workspace, format, id),
        Command::Undo { n } => undo(workspace, author_override, format, n.unwrap_or(1)),
        Command::Redo { n } => redo(workspace, author_override, format, n.unwrap_or(1)),
    }
}

fn init(workspace: &Path, format: OutputFormat) -> CliResult<()> {
    if workspace.join("log.bin").exists() {
        return Err(CliError::AlreadyInitialized {
            path: workspace.display().to_string(),
        });
    }
    let schema = binder_schema::Schema::new();
    let _store = LogStore::open(workspace, schema.clone(), LOCK_TIMEOUT)?;
    WorkspaceConfig::default().save(workspace)?;
    schema_file::save(workspace, &schema)?;
    emit(format, &serde_json::json!({ "initialized": true }), || format!("initialized workspace at {}", workspace.display()));
    Ok(())
}

fn open_store(workspace: &Path) -> CliResult<LogStore> {
    if !workspace.join("log.bin").exists() {
        return Err(CliError::NotInitialized {
            path: workspace.display().to_string(),
        });
    }
    let schema = schema_file::load(workspace)?;
    Ok(LogStore::open(workspace, schema, LOCK_TIMEOUT)?)
}

fn resolve_author(workspace: &Path, author_override: Option<String>) -> CliResult<String> {
    if let Some(author) = author_override {
        return Ok(author);
    }
    Ok(WorkspaceConfig::load(workspace)?.author)
}

fn now() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

fn create(workspace: &Path, author_override: Option<String>, format: OutputFormat, type_name: &str, field_flags: &[String]) -> CliResult<()> {
    let mut store = open_store(workspace)?;
    let author = resolve_author(workspace, author_override)?;

    let mut raw = parse_field_flags(field_flags)?;
    raw.insert("type".to_string(), binder_core::Value::text(type_name));

    let (reference, type_name, mut changeset) = binder_input::normalize_create(store.schema(), Namespace::Record, &raw)?;

    // `id` is an ordinary schema field by convention, not a magic key — set
    // it to the entity's own reference when the type defines one and the
    // caller didn't already, so `delete`'s tombstone check (`id` present,
    // everything else absent) has something to find.
    let defines_id = store.schema().type_def(Namespace::Record, &type_name).is_some_and(|t| t.get_field("id").is_some());
    if defines_id && !changeset.contains_key("id") {
        changeset.insert("id".to_string(), binder_core::ValueChange::set(binder_core::Value::text(&reference)));
    }

    let tx = append_record_change(&mut store, &author, &reference, &type_name, changeset)?;

    emit(format, &serde_json::json!({ "reference": reference, "transaction": tx.id }), || {
        format!("created {reference} (transaction {})", tx.id)
    });
    Ok(())
}

fn read(workspace: &Path, format: OutputFormat, reference: &str) -> CliResult<()> {
    let store = open_store(workspace)?;
    let fieldset = materialize_reference(&store, reference)?;
    match entity_state(&fieldset) {
        EntityState::NeverExisted => return Err(CliError::NoSuchEntity { reference: reference.to_string() }),
        EntityState::Live | EntityState::Deleted => {}
    }

    emit(format, &fieldset, || {
        let mut out = format!("{reference}:\n");
        for (key, value) in &fieldset {
            out.push_str(&format!("  {key}: {value}\n"));
        }
        out
    });
    Ok(())
}

fn update(
    workspace: &Path,
    author_override: Option<String>,
    format: OutputFormat,
    reference: &str,
    type_name: &str,
    field_flags: &[String],
    patch: Option<&str>,
) -> CliResult<()> {
    let mut store = open_store(workspace)?;
    let author = resolve_author(workspace, author_override)?;
    let prior = materialize_reference(&store, reference)?;

    let mut raw = parse_field_flags(field_flags)?;
    raw.insert("$ref".to_string(), binder_core::Value::text(reference));

    let (_, mut changeset) = binder_input::normalize_update(store.schema(), Namespace::Record, type_name, &raw, &prior)?;

    if let Some(patch) = patch {
        let type_def = store.schema().require_type(Namespace::Record, type_name)?;
        let patch_changeset = binder_dsl::parse_str(type_def, patch)?;
        for (key, change) in patch_changeset {
            changeset.insert(key, change);
        }
    }

    let tx = append_record_change(&mut store, &author, reference, type_name, changeset)?;
    emit(format, &serde_json::json!({ "reference": reference, "transaction": tx.id }), || {
        format!("updated {reference} (transaction {})", tx.id)
    });
    Ok(())
}

fn delete(workspace: &Path, author_override: Option<String>, format: OutputFormat, reference: &str, type_name: &str) -> CliResult<()> {
    let mut store = open_store(workspace)?;
    let author = resolve_author(workspace, author_override)?;
    store.schema().require_type(Namespace::Record, type_name)?;
    let prior = materialize_reference(&store, reference)?;
    if entity_state(&prior) == EntityState::NeverExisted {
        return Err(CliError::NoSuchEntity { reference: reference.to_string() });
    }

    let mut changeset = FieldChangeset::new();
    for (key, value) in &prior {
        if key != "id" && !value.is_absent() {
            changeset.insert(key.clone(), binder_core::ValueChange::clear(value.clone()));
        }
    }

    let tx = append_record_change(&mut store, &author, reference, type_name, changeset)?;
    emit(format, &serde_json::json!({ "reference": reference, "transaction": tx.id }), || {
        format!("deleted {reference} (transaction {})", tx.id)
    });
    Ok(())
}

fn search(workspace: &Path, format: OutputFormat, query: &str) -> CliResult<()> {
    let store = open_store(workspace)?;
    let mut matches = Vec::new();
    for reference in store.index().record_references() {
        if reference.contains(query) {
            let fieldset = materialize_reference(&store, reference)?;
            if entity_state(&fieldset) == EntityState::Live {
                matches.push(reference.to_string());
            }
        }
    }
    matches.sort();

    emit(format, &matches, || {
        if matches.is_empty() {
            "no matches".to_string()
        } else {
            matches.join("\n")
        }
    });
    Ok(())
}

fn schema(workspace: &Path, format: OutputFormat, action: SchemaAction) -> CliResult<()> {
    match action {
        SchemaAction::Show => {
            let schema = schema_file::load(workspace)?;
            let record_types: Vec<&str> = schema.types(Namespace::Record).map(|t| t.ident.as_str()).collect();
            let config_types: Vec<&str> = schema.types(Namespace::Config).map(|t| t.ident.as_str()).collect();
            emit(format, &serde_json::json!({ "record_types": record_types, "config_types": config_types }), || {
                format!("record types: {}\nconfig types: {}", record_types.join(", "), config_types.join(", "))
            });
        }
        SchemaAction::Define { from } => {
            let text = std::fs::read_to_string(&from)?;
            let schema: SchemaDefinition = serde_json::from_str(&text)?;
            let mut built = binder_schema::Schema::new();
            for type_def in schema.record_types {
                built.insert_type(Namespace::Record, type_def)?;
            }
            for type_def in schema.config_types {
                built.insert_type(Namespace::Config, type_def)?;
            }
            schema_file::save(workspace, &built)?;
            emit(format, &serde_json::json!({ "defined": true }), || "schema defined".to_string());
        }
    }
    Ok(())
}

#[derive(serde::Deserialize)]
struct SchemaDefinition {
    #[serde(default)]
    record_types: Vec<binder_schema::TypeDef>,
    #[serde(default)]
    config_types: Vec<binder_schema::TypeDef>,
}

fn transaction(workspace: &Path, format: OutputFormat, id: Option<u64>) -> CliResult<()> {
    let store = open_store(workspace)?;
    let summary = match id {
        Some(id) => store.at(id)?.summary(),
        None => store.head(),
    };
    emit(format, &summary, || {
        format!(
            "transaction {} by {} at {} (hash {}, {} records, {} configs)",
            summary.id, summary.author, summary.created_at, summary.hash, summary.record_count, summary.config_count
        )
    });
    Ok(())
}

fn undo(workspace: &Path, author_override: Option<String>, format: OutputFormat, n: u64) -> CliResult<()> {
    let mut store = open_store(workspace)?;
    let author = resolve_author(workspace, author_override)?;
    let undone = store.rollback(n, author, now())?;
    emit(format, &serde_json::json!({ "undone": undone.len() }), || format!("undid {} transaction(s)", undone.len()));
    Ok(())
}

fn redo(workspace: &Path, author_override: Option<String>, format: OutputFormat, n: u64) -> CliResult<()> {
    let mut store = open_store(workspace)?;
    let author = resolve_author(workspace, author_override)?;
    let redone = store.redo(n, author, now())?;
    emit(format, &serde_json::json!({ "redone": redone.len() }), || format!("redid {} transaction(s)", redone.len()));
    Ok(())
}

fn materialize_reference(store: &LogStore, reference: &str) -> CliResult<binder_core::Fieldset> {
    let ids = store.index().record_ids(reference);
    let transactions = ids.iter().map(|id| store.at(*id)).collect::<Result<Vec<_>, _>>()?;
    Ok(materialize(Namespace::Record, reference, &transactions)?)
}

fn append_record_change(
    store: &mut LogStore,
    author: &str,
    reference: &str,
    type_name: &str,
    changeset: FieldChangeset,
) -> CliResult<binder_tx::Transaction> {
    let mut records = EntitiesChangeset::new();
    records.insert(reference.to_string(), EntityChangeset::new(type_name.to_string(), changeset));
    Ok(store.append(author, now(), records, EntitiesChangeset::new())?)
}
