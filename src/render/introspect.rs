//! Structured introspection view

use super::record::DocSection;
use serde_json::{json, Map, Value};

/// `{section: {option: {doc, default, value, source}}}`
///
/// Sections sharing a description are merged; a later entry with the same name
/// replaces an earlier one, mirroring namespace publication.
pub fn render_introspection(sections: &[DocSection]) -> Value {
    let mut out = Map::new();
    for section in sections {
        let group = out
            .entry(section.doc.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(group) = group else { continue };
        for entry in &section.entries {
            group.insert(
                entry.name.clone(),
                json!({
                    "doc": entry.doc,
                    "default": entry.default,
                    "value": entry.value,
                    "source": entry.source,
                }),
            );
        }
    }
    Value::Object(out)
}
