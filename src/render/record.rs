//! Documentation records captured while elements are loaded

use crate::config::ValueSource;
use serde::Serialize;
use serde_json::Value;

/// One loaded element as it should be displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocEntry {
    pub name: String,
    pub doc: String,
    /// Text form of the compiled-in default.
    pub default: String,
    /// Display value: masked when the element is masked.
    pub value: Value,
    pub source: ValueSource,
}

/// The elements of one `load_elements` call, under its group description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocSection {
    pub doc: String,
    pub entries: Vec<DocEntry>,
}
