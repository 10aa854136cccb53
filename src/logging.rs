//! Log level registry and subscriber installation

use crate::config::names::{JSON_LOGS, LOG_LEVEL};
use crate::config::ConfigManager;
use crate::error::{ConfigError, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Per-target log levels for the process.
///
/// Built once (usually from a resolved [`ConfigManager`]) and installed as the
/// global subscriber. `RUST_LOG`, when set, still takes precedence.
#[derive(Debug, Clone)]
pub struct LogRegistry {
    default_level: LevelFilter,
    levels: BTreeMap<String, LevelFilter>,
    silenced: BTreeSet<String>,
    json: bool,
}

impl LogRegistry {
    pub fn new(default_level: LevelFilter) -> Self {
        Self { default_level, levels: BTreeMap::new(), silenced: BTreeSet::new(), json: false }
    }

    /// Registry using the resolved `LOG_LEVEL` and `JSON_LOGS` options.
    pub fn from_manager(manager: &ConfigManager) -> Result<Self> {
        let level = manager.get_str(LOG_LEVEL)?;
        let default_level = level.parse::<LevelFilter>().map_err(|e| ConfigError::InvalidValue {
            name: LOG_LEVEL.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(default_level).json(manager.get_bool(JSON_LOGS)?))
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn set_level(&mut self, target: impl Into<String>, level: LevelFilter) -> &mut Self {
        self.levels.insert(target.into(), level);
        self
    }

    /// Pin a noisy dependency's target at WARN unless it has an explicit level.
    pub fn silence(&mut self, target: impl Into<String>) -> &mut Self {
        self.silenced.insert(target.into());
        self
    }

    /// Drop every per-target override. Silenced targets stay silenced.
    pub fn reset(&mut self) {
        self.levels.clear();
    }

    /// Effective level for `target`: the most specific override, a silenced target's
    /// WARN, or the default.
    pub fn level(&self, target: &str) -> LevelFilter {
        let explicit = self
            .levels
            .iter()
            .filter(|(prefix, _)| is_within(target, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, level)| *level);
        if let Some(level) = explicit {
            return level;
        }
        if self.silenced.iter().any(|prefix| is_within(target, prefix)) {
            return LevelFilter::WARN;
        }
        self.default_level
    }

    /// `EnvFilter` directives, default level first.
    pub fn directives(&self) -> Vec<String> {
        let mut directives = vec![level_name(self.default_level).to_string()];
        for target in &self.silenced {
            if !self.levels.contains_key(target) {
                directives.push(format!("{target}={}", level_name(LevelFilter::WARN)));
            }
        }
        for (target, level) in &self.levels {
            directives.push(format!("{target}={}", level_name(*level)));
        }
        directives
    }

    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives().join(",")))
    }

    /// Subscriber writing to stderr, JSON formatted when enabled.
    pub fn subscriber(&self) -> Box<dyn Subscriber + Send + Sync> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        if self.json {
            Box::new(registry.with(fmt::layer().json().with_writer(std::io::stderr)))
        } else {
            Box::new(registry.with(fmt::layer().with_writer(std::io::stderr)))
        }
    }

    /// Install as the global subscriber. Returns false if one was already installed.
    pub fn install(&self) -> bool {
        tracing::subscriber::set_global_default(self.subscriber()).is_ok()
    }

    /// Run `f` with this registry's subscriber as the thread's default, leaving the
    /// global subscriber free to be installed afterwards.
    pub fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::subscriber::with_default(self.subscriber(), f)
    }
}

impl Default for LogRegistry {
    fn default() -> Self {
        Self::new(LevelFilter::INFO)
    }
}

fn is_within(target: &str, prefix: &str) -> bool {
    target == prefix || target.strip_prefix(prefix).is_some_and(|rest| rest.starts_with("::"))
}

fn level_name(level: LevelFilter) -> &'static str {
    match level.into_level() {
        None => "off",
        Some(level) if level == Level::ERROR => "error",
        Some(level) if level == Level::WARN => "warn",
        Some(level) if level == Level::INFO => "info",
        Some(level) if level == Level::DEBUG => "debug",
        Some(_) => "trace",
    }
}
