//! Value parsers applied to an option's raw value
//!
//! Overrides from the environment always arrive as strings, so every parser
//! accepts the string spelling of its type as well as the native JSON form.

use crate::utils::paths::expand_path;
use serde_json::{Number, Value};

/// Pure transformation from a raw value to the value published on the namespace.
pub type Parser = fn(&Value) -> Result<Value, String>;

const TRUTHY: &[&str] = &["true", "yes", "y", "on", "1"];
const FALSY: &[&str] = &["false", "no", "n", "off", "0", ""];

pub fn boolean(raw: &Value) -> Result<Value, String> {
    match raw {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Number(n) => match n.as_f64() {
            Some(f) => Ok(Value::Bool(f != 0.0)),
            None => Err(format!("'{n}' is not a boolean")),
        },
        Value::String(s) => {
            let lowered = s.trim().to_ascii_lowercase();
            if TRUTHY.contains(&lowered.as_str()) {
                Ok(Value::Bool(true))
            } else if FALSY.contains(&lowered.as_str()) {
                Ok(Value::Bool(false))
            } else {
                Err(format!("'{s}' is not a boolean"))
            }
        }
        Value::Null => Ok(Value::Bool(false)),
        other => Err(format!("{other} is not a boolean")),
    }
}

pub fn integer(raw: &Value) -> Result<Value, String> {
    match raw {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(raw.clone()),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("'{s}' is not an integer")),
        other => Err(format!("{other} is not an integer")),
    }
}

pub fn float(raw: &Value) -> Result<Value, String> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("{raw} is not a finite number"))
}

/// Comma-separated string, or a list of strings, into a list of trimmed non-empty strings.
pub fn string_list(raw: &Value) -> Result<Value, String> {
    let items: Vec<String> = match raw {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(values) => {
            let mut items = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::String(s) if !s.trim().is_empty() => items.push(s.trim().to_string()),
                    Value::String(_) => {}
                    other => return Err(format!("list item {other} is not a string")),
                }
            }
            items
        }
        Value::Null => Vec::new(),
        other => return Err(format!("{other} is not a list")),
    };
    Ok(Value::Array(items.into_iter().map(Value::String).collect()))
}

/// Expand `$VAR`, `${VAR}` and a leading `~` in a path string.
pub fn path(raw: &Value) -> Result<Value, String> {
    match raw {
        Value::String(s) => Ok(Value::String(expand_path(s).to_string_lossy().into_owned())),
        other => Err(format!("{other} is not a path")),
    }
}

/// Normalize a log level name to one `tracing` understands.
pub fn log_level(raw: &Value) -> Result<Value, String> {
    let Value::String(s) = raw else {
        return Err(format!("{raw} is not a log level"));
    };
    let level = match s.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" | "critical" => "error",
        _ => return Err(format!("'{s}' is not a log level")),
    };
    Ok(Value::String(level.to_string()))
}
