//! Built-in `core` and `log` modules

use super::ConfigModule;
use crate::config::names::{
    EXTERNAL_CONFIG_SOURCES, INSTANCE_CONFIG_FILE, INSTANCE_NAME, INSTANCE_ROOT, JSON_LOGS,
    LOCAL_CONFIG_FILE, LOG_LEVEL, LOG_PATH,
};
use crate::config::namespace::path_value;
use crate::config::{parsers, ConfigElement, ConfigManager};
use crate::error::{ConfigError, Result};
use crate::utils::paths::{expand_path, expand_user};
use std::fs;
use std::path::{Path, PathBuf};

/// File at the instance root whose first line relocates the instance root.
pub const REDIRECT_FILE: &str = "redirect";

/// Follow `<root>/redirect`, if present, to the real instance root.
pub fn follow_redirect(root: &Path) -> Result<PathBuf> {
    let redirect = root.join(REDIRECT_FILE);
    if !redirect.is_file() {
        return Ok(root.to_path_buf());
    }
    let content = fs::read_to_string(&redirect).map_err(|e| ConfigError::io(&redirect, e))?;
    match content.lines().next().map(str::trim).filter(|line| !line.is_empty()) {
        Some(target) => {
            tracing::debug!("Instance root {} redirected to {}", root.display(), target);
            Ok(expand_path(target))
        }
        None => Ok(root.to_path_buf()),
    }
}

/// Instance identity, instance root and the locations of the override documents.
///
/// Loads the override documents and external sources once the file locations
/// are published, so every module loaded after it sees them.
#[derive(Debug, Clone)]
pub struct CoreModule {
    name: String,
    instance_name: String,
    instance_root: Option<PathBuf>,
}

impl CoreModule {
    pub fn new(name: impl Into<String>, instance_name: impl Into<String>) -> Self {
        Self { name: name.into(), instance_name: instance_name.into(), instance_root: None }
    }

    /// Use `root` instead of `~/.<instance_name>`.
    pub fn instance_root(mut self, root: Option<PathBuf>) -> Self {
        self.instance_root = root;
        self
    }

    fn base_root(&self) -> PathBuf {
        match &self.instance_root {
            Some(root) => expand_user(root),
            None => expand_user(Path::new(&format!("~/.{}", self.instance_name))),
        }
    }

    fn elements(&self) -> Vec<ConfigElement> {
        let base = self.base_root();
        let root_expr = format!("{} (following {REDIRECT_FILE})", base.display());

        vec![
            ConfigElement::constant(INSTANCE_NAME, "Name of this instance")
                .default_value(self.instance_name.clone()),
            ConfigElement::constant(INSTANCE_ROOT, "Root directory of the instance")
                .default_with(root_expr, &[], move |_| Ok(path_value(follow_redirect(&base)?))),
            ConfigElement::constant(INSTANCE_CONFIG_FILE, "Instance configuration overrides")
                .default_with("INSTANCE_ROOT/instance_config.toml", &[INSTANCE_ROOT], |scope| {
                    scope.join_path(INSTANCE_ROOT, &["instance_config.toml"])
                }),
            ConfigElement::constant(LOCAL_CONFIG_FILE, "Local machine configuration overrides")
                .default_with("INSTANCE_ROOT/local_config_overrides.toml", &[INSTANCE_ROOT], |scope| {
                    scope.join_path(INSTANCE_ROOT, &["local_config_overrides.toml"])
                }),
            ConfigElement::constant(EXTERNAL_CONFIG_SOURCES, "External configuration sources descriptor")
                .default_with("INSTANCE_ROOT/external_config_sources.yaml", &[INSTANCE_ROOT], |scope| {
                    scope.join_path(INSTANCE_ROOT, &["external_config_sources.yaml"])
                }),
        ]
    }
}

impl ConfigModule for CoreModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn depends(&self) -> Vec<String> {
        Vec::new()
    }

    fn load(&self, manager: &mut ConfigManager) -> Result<()> {
        manager.load_elements(self.elements(), "Core Instance Configuration")?;
        manager.load_config_files()
    }
}

/// Log level, log file location and log format options.
#[derive(Debug, Clone)]
pub struct LogModule {
    name: String,
    core: String,
}

impl LogModule {
    pub fn new(name: impl Into<String>, core: impl Into<String>) -> Self {
        Self { name: name.into(), core: core.into() }
    }
}

impl ConfigModule for LogModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn depends(&self) -> Vec<String> {
        vec![self.core.clone()]
    }

    fn load(&self, manager: &mut ConfigManager) -> Result<()> {
        let elements = vec![
            ConfigElement::option(LOG_LEVEL, "Default log level").default_value("info").parser(parsers::log_level),
            ConfigElement::option(LOG_PATH, "Log file location")
                .default_with(
                    "INSTANCE_ROOT/log/<INSTANCE_NAME>.log",
                    &[INSTANCE_ROOT, INSTANCE_NAME],
                    |scope| {
                        let file = format!("{}.log", scope.str(INSTANCE_NAME)?);
                        scope.join_path(INSTANCE_ROOT, &["log", file.as_str()])
                    },
                )
                .parser(parsers::path),
            ConfigElement::option(JSON_LOGS, "Emit logs as JSON").default_value(false).parser(parsers::boolean),
        ];
        manager.load_elements(elements, "Logging Configuration")
    }
}
