use crate::error::SckannerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use toml::map::Map;
use toml::Value;

pub const DEFAULT_CONFIG: &str = include_str!("resources/default_config.toml");
pub const CONFIG_FILE: &str = "sckanner.toml";

#[derive(Clone, Debug, Serialize, Deserialize, PartialOrd, Ord, PartialEq, Eq)]
pub enum Debug {
    INFO,
    WARN,
    ERROR,
}

impl Debug {
    ///The `tracing` filter directive for this level.
    pub fn directive(&self) -> &'static str {
        match self {
            Debug::INFO => "info",
            Debug::WARN => "warn",
            Debug::ERROR => "error",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tool {
    pub name: String,
    pub version: String,
    pub edition: String,
}

/// Where the startup resources are read from: `http(s)` URLs or local paths.
/// An empty `endorgans_order` or `order` means no ordering hints.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sources {
    pub query_results: String,
    #[serde(default)]
    pub order: String,
    #[serde(default)]
    pub endorgans_order: String,
    pub major_nerves: String,
    pub api_base: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub debug: Debug,
    pub tool: Tool,
    pub sources: Sources,
}

fn type_error(v1: &Value, v2: &Value) -> SckannerError {
    SckannerError::ConfigError(format!(
        "Cannot merge inconsistent types: {} and {}",
        v1.type_str(),
        v2.type_str()
    ))
}

/// Merge two toml::Values.
/// The second argument is given priority in case of conflicts.
/// So, given two toml::Values d and c,
/// where d is considered a default configuration,
/// and c is a custom configuration deviating from d.
/// Then, merge(d,c) keeps the custom values specified in c
/// and includes default values from d not specified in c.
///
/// #Examples
///
/// ```
/// use sckanner::config::merge;
/// use toml::Value;
///
/// let s1 = r#"
/// [tool]
/// name = "macroscope"
/// version = "0.1.0"
/// edition = "2021"
/// "#;
///
/// let s2 = r#"
/// [tool]
/// name = "sckanner"
/// version = "0.1.0"
/// "#;
///
/// let s3 = r#"
/// [tool]
/// name = "sckanner"
/// version = "0.1.0"
/// edition = "2021"
/// "#;
///
/// let v1 = s1.parse::<Value>().unwrap();
/// let v2 = s2.parse::<Value>().unwrap();
/// let expected = s3.parse::<Value>().unwrap();
///
/// let merged = merge(&v1, &v2).unwrap();
///
/// assert_eq!(expected, merged);
/// ```
pub fn merge(v1: &Value, v2: &Value) -> Result<Value, SckannerError> {
    match (v1, v2) {
        (Value::Table(x), Value::Table(y)) => {
            let mut merge_table = Map::new();
            for (k, v) in x {
                match y.get(k) {
                    Some(yv) => merge_table.insert(k.clone(), merge(v, yv)?),
                    None => merge_table.insert(k.clone(), v.clone()),
                };
            }
            for (k, v) in y {
                if !merge_table.contains_key(k) {
                    merge_table.insert(k.clone(), v.clone());
                }
            }
            Ok(Value::Table(merge_table))
        }
        (Value::Array(x), Value::Array(y)) => {
            let mut merged: Vec<Value> = Vec::new();
            for v in x.iter().chain(y.iter()) {
                if !merged.contains(v) {
                    merged.push(v.clone());
                }
            }
            Ok(Value::Array(merged))
        }
        (Value::String(_), Value::String(_))
        | (Value::Integer(_), Value::Integer(_))
        | (Value::Float(_), Value::Float(_))
        | (Value::Boolean(_), Value::Boolean(_))
        | (Value::Datetime(_), Value::Datetime(_)) => Ok(v2.clone()),
        _ => Err(type_error(v1, v2)),
    }
}

///Given the text of a user configuration, return it merged over the built-in defaults.
pub fn merge_with_defaults(user_config: &str) -> Result<Value, SckannerError> {
    let default_value = DEFAULT_CONFIG.parse::<Value>()?;
    let input_value = user_config.parse::<Value>()?;
    merge(&default_value, &input_value)
}

///Return the configuration at `file_path` merged over the defaults;
///the defaults alone when the file does not exist.
pub fn get_config(file_path: &str) -> Result<Config, SckannerError> {
    let merged = match fs::read_to_string(file_path) {
        Ok(x) => merge_with_defaults(&x)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("{} not found, using default configuration", file_path);
            DEFAULT_CONFIG.parse::<Value>()?
        }
        Err(e) => return Err(e.into()),
    };
    Ok(merged.try_into::<Config>()?)
}

///Return the merged configuration as TOML text.
pub fn config(file_path: &str) -> Result<String, SckannerError> {
    let input_config = fs::read_to_string(file_path)?;
    let merged = merge_with_defaults(&input_config)?;
    Ok(toml::to_string(&merged)?)
}

///Write a starter configuration to `file_path`, refusing to overwrite one.
pub fn init(file_path: &str) -> Result<String, SckannerError> {
    if Path::new(file_path).exists() {
        return Err(SckannerError::ConfigError(format!(
            "{} file already exists.",
            file_path
        )));
    }
    let toml = r#"[tool]
name = "sckanner"
version = "0.1.0"
edition = "2021"
"#;
    fs::write(file_path, toml)?;
    Ok(String::from("Initialized a SCKANNER project"))
}
