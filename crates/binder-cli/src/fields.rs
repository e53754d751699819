//! Parses `--field key=value` flags into a raw [`Fieldset`], the same
//! untyped shape `binder-input` expects as a create/update payload.

use crate::error::CliError;
use binder_core::{Fieldset, Value};

pub fn parse_field_flags(flags: &[String]) -> Result<Fieldset, CliError> {
    let mut fields = Fieldset::new();
    for flag in flags {
        let (key, raw) = flag.split_once('=').ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("--field {flag:?} must be key=value"))
        })?;
        fields.insert(key.to_string(), parse_literal(raw));
    }
    Ok(fields)
}

fn parse_literal(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    serde_yaml::from_str(raw).unwrap_or_else(|_| Value::text(raw))
}
