//! layered-config: layered configuration resolution
//!
//! Builds a single namespace of named configuration values from ranked sources
//! (environment, local override document, instance document, external source
//! chain, compiled-in default). Extension modules contribute their own elements
//! and are loaded in dependency order.

pub mod config;
pub mod error;
pub mod logging;
pub mod modules;
pub mod redact;
pub mod render;
pub mod settings;
pub mod source;
pub mod utils;

pub use config::{ConfigElement, ConfigManager, ResolutionContext, ValueSource};
pub use error::{ConfigError, Result};
pub use logging::LogRegistry;
pub use modules::{ConfigModule, FnModule, ModuleLoader, ModuleRegistry};
pub use settings::Settings;
pub use source::{ExternalSource, ExternalSourceChain};
