//! JSON-shaped view

use super::record::DocSection;
use serde_json::{json, Map, Value};

/// `{section: {option: {value, source}}}`
pub fn render_json(sections: &[DocSection]) -> Value {
    let mut out = Map::new();
    for section in sections {
        let group = out
            .entry(section.doc.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(group) = group else { continue };
        for entry in &section.entries {
            group.insert(entry.name.clone(), json!({"value": entry.value, "source": entry.source}));
        }
    }
    Value::Object(out)
}
