//! On-disk persistence for a workspace's [`Schema`], which the core crates
//! treat as something the caller already has in hand. The CLI is the
//! caller, so it owns a `schema.json` format: the record and config type
//! tables, each a plain list of [`TypeDef`] (already `Serialize`).

use crate::error::CliResult;
use binder_schema::{Namespace, Schema, TypeDef};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    record_types: Vec<TypeDef>,
    #[serde(default)]
    config_types: Vec<TypeDef>,
}

pub fn load(dir: &Path) -> CliResult<Schema> {
    let path = dir.join("schema.json");
    let file: SchemaFile = if path.exists() {
        let text = std::fs::read_to_string(&path)?;
        serde_json::from_str(&text)?
    } else {
        SchemaFile::default()
    };

    let mut schema = Schema::new();
    for type_def in file.record_types {
        schema.insert_type(Namespace::Record, type_def)?;
    }
    for type_def in file.config_types {
        schema.insert_type(Namespace::Config, type_def)?;
    }
    Ok(schema)
}

pub fn save(dir: &Path, schema: &Schema) -> CliResult<()> {
    let file = SchemaFile {
        record_types: schema.types(Namespace::Record).cloned().collect(),
        config_types: schema.types(Namespace::Config).cloned().collect(),
    };
    let text = serde_json::to_string_pretty(&file)?;
    std::fs::write(dir.join("schema.json"), text)?;
    Ok(())
}
