//! Environment override snapshot

use serde_json::Value;
use std::collections::BTreeMap;
use std::ffi::OsString;

/// Prefix applied to environment variables for an instance, e.g. `tendril` -> `TENDRIL_`.
pub fn env_prefix(instance_name: &str) -> String {
    format!("{}_", instance_name.to_uppercase())
}

/// Snapshot every process environment variable starting with `prefix`, keyed by the
/// remainder of the name.
///
/// Variables whose name or value is not valid Unicode are skipped.
pub fn environment_overrides(prefix: &str) -> BTreeMap<String, Value> {
    overrides_from_vars(prefix, std::env::vars_os())
}

pub(crate) fn overrides_from_vars<I>(prefix: &str, vars: I) -> BTreeMap<String, Value>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| {
            let name = name.into_string().ok()?;
            let key = name.strip_prefix(prefix)?;
            if key.is_empty() {
                return None;
            }
            match value.into_string() {
                Ok(value) => Some((key.to_string(), Value::String(value))),
                Err(_) => {
                    tracing::debug!("Ignoring non-Unicode value of environment variable {}", name);
                    None
                }
            }
        })
        .collect()
}
