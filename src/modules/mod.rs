//! Extension modules that contribute configuration elements
//!
//! Modules are discovered from a [`ModuleRegistry`] by namespace prefix and
//! loaded by [`ModuleLoader`] in an order that satisfies their declared
//! dependencies.

pub mod builtin;
pub mod loader;

pub use builtin::{CoreModule, LogModule};
pub use loader::ModuleLoader;

use crate::config::ConfigManager;
use crate::error::Result;
use std::fmt;

/// A self-contained group of configuration elements.
pub trait ConfigModule {
    /// Fully qualified module name, e.g. `app.core`.
    fn name(&self) -> &str;

    /// Names of modules that must be loaded first.
    fn depends(&self) -> Vec<String>;

    /// Register this module's elements with `manager`.
    fn load(&self, manager: &mut ConfigManager) -> Result<()>;
}

type LoadFn = Box<dyn Fn(&mut ConfigManager) -> Result<()>>;

/// Module defined by a name, a dependency list and a load closure.
pub struct FnModule {
    name: String,
    depends: Vec<String>,
    load: LoadFn,
}

impl FnModule {
    pub fn new<F>(name: impl Into<String>, depends: &[&str], load: F) -> Self
    where
        F: Fn(&mut ConfigManager) -> Result<()> + 'static,
    {
        Self {
            name: name.into(),
            depends: depends.iter().map(|d| d.to_string()).collect(),
            load: Box::new(load),
        }
    }
}

impl ConfigModule for FnModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn depends(&self) -> Vec<String> {
        self.depends.clone()
    }

    fn load(&self, manager: &mut ConfigManager) -> Result<()> {
        (self.load)(manager)
    }
}

impl fmt::Debug for FnModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModule").field("name", &self.name).field("depends", &self.depends).finish()
    }
}

/// Registered modules, in registration order.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Box<dyn ConfigModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `<namespace>.core` and `<namespace>.log`.
    pub fn with_builtins(namespace: &str, core: CoreModule) -> Self {
        let mut registry = Self::new();
        let core_name = core.name().to_string();
        registry.register(core);
        registry.register(LogModule::new(format!("{namespace}.log"), core_name));
        registry
    }

    pub fn register(&mut self, module: impl ConfigModule + 'static) -> &mut Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules named `namespace` or `namespace.*`, in registration order.
    pub fn discover(&self, namespace: &str) -> Vec<&dyn ConfigModule> {
        let prefix = format!("{namespace}.");
        self.modules
            .iter()
            .map(Box::as_ref)
            .filter(|m| m.name() == namespace || m.name().starts_with(&prefix))
            .collect()
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.modules.iter().map(|m| m.name())).finish()
    }
}
