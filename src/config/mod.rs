//! Configuration elements, resolution and the config manager
//!
//! Options resolve with precedence Env > Local override > Instance config >
//! External sources > Default; constants always use their compiled-in default.

pub mod context;
pub mod element;
pub mod loader;
pub mod manager;
pub mod namespace;
pub mod parsers;

pub use context::ResolutionContext;
pub use element::{ConfigElement, DefaultExpr, ElementKind, Resolved, ValueSource};
pub use loader::{load_override_document, OverrideDocument};
pub use manager::ConfigManager;
pub use namespace::{Namespace, Scope};
pub use parsers::Parser;

/// Names the manager itself reads from the namespace.
pub mod names {
    pub const INSTANCE_NAME: &str = "INSTANCE_NAME";
    pub const INSTANCE_ROOT: &str = "INSTANCE_ROOT";
    pub const INSTANCE_CONFIG_FILE: &str = "INSTANCE_CONFIG_FILE";
    pub const LOCAL_CONFIG_FILE: &str = "LOCAL_CONFIG_FILE";
    pub const EXTERNAL_CONFIG_SOURCES: &str = "EXTERNAL_CONFIG_SOURCES";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const LOG_PATH: &str = "LOG_PATH";
    pub const JSON_LOGS: &str = "JSON_LOGS";
}
