//! Places an option's value can come from besides its compiled-in default
//!
//! - `env`: the prefixed environment snapshot
//! - `external`: adapters exposing a flat key view over a nested backing document
//! - `chain`: an ordered list of external sources, built from a descriptor file

pub mod chain;
pub mod env;
pub mod external;

pub use chain::{ExternalSourceChain, SourceDescriptor};
pub use env::environment_overrides;
pub use external::{ExternalSource, JsonSource, KEY_PATH_DELIMITER};
