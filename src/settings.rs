//! Engine settings: which instance to resolve and which modules to load
//!
//! Precedence: `LAYERED_CONFIG_*` env > settings file > defaults.

use crate::config::ConfigManager;
use crate::error::Result;
use crate::modules::{CoreModule, ModuleLoader, ModuleRegistry};
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_ENV_PREFIX: &str = "LAYERED_CONFIG_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Instance name; also the environment override prefix (`<NAME>_`).
    pub instance_name: String,
    /// Instance root; `~/.<instance_name>` when unset.
    pub instance_root: Option<PathBuf>,
    /// Module namespace to discover.
    pub namespace: String,
    /// Fully qualified module names never to load.
    pub excluded: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            instance_name: "layered".to_string(),
            instance_root: None,
            namespace: "layered".to_string(),
            excluded: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional TOML/YAML settings file and the environment.
    pub fn load(settings_file: Option<&Path>) -> Result<Self> {
        Self::figment(settings_file).extract().map_err(|e| Box::new(e).into())
    }

    pub fn figment(settings_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = settings_file {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
            figment = match ext.as_str() {
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }
        figment.merge(Env::prefixed(SETTINGS_ENV_PREFIX))
    }

    /// The built-in `core` and `log` modules for this instance.
    pub fn builtin_registry(&self) -> ModuleRegistry {
        let core = CoreModule::new(format!("{}.core", self.namespace), self.instance_name.clone())
            .instance_root(self.instance_root.clone());
        ModuleRegistry::with_builtins(&self.namespace, core)
    }

    pub fn loader(&self) -> ModuleLoader {
        ModuleLoader::new(self.namespace.clone()).exclude(self.excluded.iter().cloned())
    }

    /// Create a manager for this instance and load every module of the namespace from `registry`.
    pub fn bootstrap(&self, registry: &ModuleRegistry) -> Result<ConfigManager> {
        let mut manager = ConfigManager::new(self.instance_name.clone());
        let loaded = self.loader().load(registry, &mut manager)?;
        tracing::debug!("Loaded config modules: {}", loaded.join(", "));
        Ok(manager)
    }
}
