//! Log-line view

use super::record::DocSection;

const BANNER: &str = "==========";

/// One line per option (`NAME = value [source]`), each section preceded by a banner.
pub fn render_log_lines(sections: &[DocSection]) -> Vec<String> {
    let mut lines = Vec::new();
    for section in sections {
        lines.push(format!("{BANNER} {} {BANNER}", section.doc));
        for entry in &section.entries {
            lines.push(format!("{} = {} [{}]", entry.name, entry.value, entry.source));
        }
    }
    lines
}
