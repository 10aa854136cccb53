//! Dependency-ordered module loading

use super::{ConfigModule, ModuleRegistry};
use crate::config::ConfigManager;
use crate::error::{ConfigError, Result, StuckModule};
use std::collections::{BTreeSet, HashSet};

/// Loads the modules of one namespace, each only after all of its dependencies.
#[derive(Debug, Clone)]
pub struct ModuleLoader {
    namespace: String,
    excluded: BTreeSet<String>,
}

impl ModuleLoader {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), excluded: BTreeSet::new() }
    }

    /// Never load the named modules. Anything depending on them cannot load either.
    pub fn exclude<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(modules.into_iter().map(Into::into));
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Discover this loader's namespace in `registry` and load it into `manager`.
    pub fn load(&self, registry: &ModuleRegistry, manager: &mut ConfigManager) -> Result<Vec<String>> {
        tracing::debug!("Loading configuration from {}", self.namespace);
        self.load_modules(registry.discover(&self.namespace), manager)
    }

    /// Load `modules` in dependency order, returning the names loaded in load order.
    ///
    /// Passes are made over the not-yet-loaded modules; within a pass, modules are
    /// tried in discovery order and a module loads as soon as every dependency has.
    /// A pass that loads nothing means the remaining modules can never load, and
    /// loading stops with [`ConfigError::DependencyDeadlock`].
    pub fn load_modules(
        &self,
        modules: Vec<&dyn ConfigModule>,
        manager: &mut ConfigManager,
    ) -> Result<Vec<String>> {
        let mut satisfied: HashSet<String> = manager.modules_loaded().iter().cloned().collect();
        let mut loaded = Vec::new();
        let mut pending: Vec<&dyn ConfigModule> = modules
            .into_iter()
            .filter(|m| !self.excluded.contains(m.name()))
            .filter(|m| {
                let done = satisfied.contains(m.name());
                if done {
                    tracing::debug!("Skipping {}, already loaded", m.name());
                }
                !done
            })
            .collect();

        while !pending.is_empty() {
            let mut remaining = Vec::with_capacity(pending.len());
            let mut changed = false;

            for module in pending {
                if module.depends().iter().all(|d| satisfied.contains(d)) {
                    tracing::debug!("Loading {}", module.name());
                    module.load(manager)?;
                    manager.mark_loaded(module.name());
                    satisfied.insert(module.name().to_string());
                    loaded.push(module.name().to_string());
                    changed = true;
                } else {
                    remaining.push(module);
                }
            }

            if !changed {
                return Err(deadlock(&remaining, &satisfied));
            }
            pending = remaining;
        }

        Ok(loaded)
    }
}

fn deadlock(stuck: &[&dyn ConfigModule], satisfied: &HashSet<String>) -> ConfigError {
    let stuck = stuck
        .iter()
        .map(|module| {
            let missing: Vec<String> =
                module.depends().into_iter().filter(|d| !satisfied.contains(d)).collect();
            tracing::error!(
                "Failed loading {}. Missing dependency: {}",
                module.name(),
                missing.join(", ")
            );
            StuckModule { name: module.name().to_string(), missing }
        })
        .collect();
    ConfigError::DependencyDeadlock { stuck }
}
