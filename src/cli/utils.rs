//! Shared CLI utilities.

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

#[cfg(test)]
mod tests {
    use super::parse_csv;

    #[test]
    fn parse_csv_trims_and_skips_empty() {
        assert_eq!(
            parse_csv(&Some("app.log, app.mail,,".to_string())),
            Some(vec!["app.log".to_string(), "app.mail".to_string()])
        );
        assert_eq!(parse_csv(&None), None);
    }
}
