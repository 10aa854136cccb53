//! Shared helpers

pub mod paths;

pub use paths::{expand_path, expand_user, expand_vars};
