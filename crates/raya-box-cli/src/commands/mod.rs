//! Subcommand implementations

pub mod boxing;
pub mod info;
pub mod inspect;

use anyhow::anyhow;
use raya_box::convert::string_to_number;
use raya_box::{BoxConfig, ObjectRef, Realm, Value};
use std::path::PathBuf;
use termcolor::ColorChoice;

/// Settings shared by every subcommand
pub struct Context {
    /// Loaded configuration
    pub config: BoxConfig,
    /// File the configuration came from, if any
    pub config_path: Option<PathBuf>,
    /// Resolved color choice
    pub choice: ColorChoice,
}

/// Look up a realm builtin by name
pub fn builtin(realm: &Realm, name: &str) -> anyhow::Result<ObjectRef> {
    realm.global(name).ok_or_else(|| {
        anyhow!(
            "Unknown builtin '{}'. Available: {}",
            name,
            realm.global_names().join(", ")
        )
    })
}

/// Parse a command-line literal: `true`/`false`, a number, or a string
pub fn parse_literal(text: &str) -> Value {
    match text {
        "true" => return Value::from(true),
        "false" => return Value::from(false),
        _ => {}
    }
    let number = string_to_number(text);
    if text.trim().is_empty() || number.is_nan() {
        Value::from(text)
    } else {
        Value::from(number)
    }
}
