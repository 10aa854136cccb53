//! Resolved configuration values, in publication order

use crate::error::{ConfigError, Result};
use crate::utils::paths;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// Ordered name -> value store that resolved elements are published into.
///
/// Re-publishing a name replaces its value in place (last write wins), so later
/// modules may override what earlier ones published.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `value` under `name`, returning the value it replaced.
    pub fn publish(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        if let Some(&slot) = self.index.get(&name) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        None
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names and values in the order they were first published.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn value(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| ConfigError::UnknownName { name: name.to_string() })
    }

    pub fn get_str(&self, name: &str) -> Result<&str> {
        as_str(name, self.value(name)?)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        self.value(name)?.as_bool().ok_or_else(|| invalid(name, "expected a boolean"))
    }

    pub fn get_i64(&self, name: &str) -> Result<i64> {
        self.value(name)?.as_i64().ok_or_else(|| invalid(name, "expected an integer"))
    }

    pub fn get_path(&self, name: &str) -> Result<PathBuf> {
        self.get_str(name).map(PathBuf::from)
    }

    /// Deserialize a value into any serde type.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        serde_json::from_value(self.value(name)?.clone()).map_err(|e| invalid(name, e))
    }
}

/// Read-only view of the namespace handed to a default initializer.
///
/// Lookups of names that have not been published yet fail with
/// [`ConfigError::UnresolvedName`], attributed to the element being evaluated.
pub struct Scope<'a> {
    namespace: &'a Namespace,
    element: &'a str,
}

impl<'a> Scope<'a> {
    pub fn new(namespace: &'a Namespace, element: &'a str) -> Self {
        Self { namespace, element }
    }

    /// Name of the element whose default is being evaluated.
    pub fn element(&self) -> &str {
        self.element
    }

    pub fn get(&self, name: &str) -> Result<&'a Value> {
        self.namespace.get(name).ok_or_else(|| ConfigError::UnresolvedName {
            name: name.to_string(),
            referenced_by: self.element.to_string(),
        })
    }

    pub fn str(&self, name: &str) -> Result<&'a str> {
        as_str(name, self.get(name)?)
    }

    pub fn path(&self, name: &str) -> Result<PathBuf> {
        self.str(name).map(PathBuf::from)
    }

    /// Join `parts` onto the path published as `base`, as a string value.
    pub fn join_path(&self, base: &str, parts: &[&str]) -> Result<Value> {
        let mut joined = self.path(base)?;
        joined.extend(parts);
        Ok(path_value(joined))
    }

    /// Process environment lookup.
    pub fn env(&self, var: &str) -> Option<String> {
        std::env::var(var).ok()
    }

    pub fn expand_user(&self, path: &str) -> PathBuf {
        paths::expand_user(std::path::Path::new(path))
    }

    pub fn expand_vars(&self, input: &str) -> String {
        paths::expand_vars(input)
    }
}

/// Paths are published as their (lossy) string form.
pub fn path_value(path: PathBuf) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

fn as_str<'v>(name: &str, value: &'v Value) -> Result<&'v str> {
    value.as_str().ok_or_else(|| invalid(name, "expected a string"))
}

fn invalid(name: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue { name: name.to_string(), reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn republishing_overwrites_in_place() {
        let mut ns = Namespace::new();
        assert!(ns.publish("A", json!(1)).is_none());
        ns.publish("B", json!(2));
        assert_eq!(ns.publish("A", json!(3)), Some(json!(1)));

        let order: Vec<_> = ns.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        assert_eq!(order, vec![("A".to_string(), json!(3)), ("B".to_string(), json!(2))]);
        assert_eq!(ns.len(), 2);
    }

    #[test]
    fn typed_accessors() {
        let mut ns = Namespace::new();
        ns.publish("ROOT", json!("/srv/app"));
        ns.publish("DEBUG", json!(true));
        ns.publish("WORKERS", json!(4));
        ns.publish("HOSTS", json!(["a", "b"]));

        assert_eq!(ns.get_str("ROOT").unwrap(), "/srv/app");
        assert_eq!(ns.get_path("ROOT").unwrap(), PathBuf::from("/srv/app"));
        assert!(ns.get_bool("DEBUG").unwrap());
        assert_eq!(ns.get_i64("WORKERS").unwrap(), 4);
        assert_eq!(ns.get_as::<Vec<String>>("HOSTS").unwrap(), vec!["a", "b"]);
        assert!(matches!(ns.get_i64("ROOT"), Err(ConfigError::InvalidValue { .. })));
        assert!(matches!(ns.get_str("NOPE"), Err(ConfigError::UnknownName { .. })));
    }

    #[test]
    fn scope_reports_unresolved_names_against_the_element() {
        let mut ns = Namespace::new();
        ns.publish("INSTANCE_ROOT", json!("/srv/app"));
        let scope = Scope::new(&ns, "LOG_PATH");

        assert_eq!(scope.join_path("INSTANCE_ROOT", &["log", "app.log"]).unwrap(), json!("/srv/app/log/app.log"));
        match scope.get("LATER") {
            Err(ConfigError::UnresolvedName { name, referenced_by }) => {
                assert_eq!(name, "LATER");
                assert_eq!(referenced_by, "LOG_PATH");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn scope_helpers() {
        let ns = Namespace::new();
        let scope = Scope::new(&ns, "X");
        assert_eq!(scope.element(), "X");
        assert!(scope.env("LAYERED_CONFIG_TEST_SURELY_UNSET").is_none());
        assert_eq!(scope.expand_vars("$LAYERED_CONFIG_TEST_SURELY_UNSET/a"), "$LAYERED_CONFIG_TEST_SURELY_UNSET/a");
        assert_eq!(scope.expand_user("/etc/app"), PathBuf::from("/etc/app"));
    }
}
