//! Views over the recorded element documentation
//!
//! Every view is a projection of the same [`DocSection`] records; nothing is
//! re-resolved while rendering.

pub mod introspect;
pub mod json;
pub mod log;
pub mod record;

pub use introspect::render_introspection;
pub use json::render_json;
pub use log::render_log_lines;
pub use record::{DocEntry, DocSection};
