//! Drive reference extraction
//!
//! Scans scalar cell values for Google Drive sharing links and resolves the
//! stable file identifier embedded in them. Absence of a link is an expected
//! outcome, not an error; callers treat `None` as "this cell is not a link".

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::drive;

/// Compiled reference-shape patterns in priority order.
///
/// A well-formed sharing link can satisfy more than one shape (the canonical
/// download address itself matches the `uc?` form), so the order here is
/// load-bearing: the file-path form is probed first, then the two query forms.
fn patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(drive::FILE_PATH_PATTERN).expect("file path pattern is valid"),
            Regex::new(drive::UC_QUERY_PATTERN).expect("uc query pattern is valid"),
            Regex::new(drive::OPEN_QUERY_PATTERN).expect("open query pattern is valid"),
        ]
    })
}

/// Extract the Drive file identifier from a cell value, if any.
///
/// The value must contain the Drive host marker to be probed at all; the
/// first pattern with a capturing match wins.
pub fn extract_identifier(value: &str) -> Option<&str> {
    if !value.contains(drive::HOST_MARKER) {
        return None;
    }

    patterns()
        .iter()
        .find_map(|pattern| pattern.captures(value))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_path_form() {
        let id = extract_identifier("https://drive.google.com/file/d/1AbC_d-9/view?usp=sharing");
        assert_eq!(id, Some("1AbC_d-9"));
    }

    #[test]
    fn test_uc_query_form() {
        let id = extract_identifier("https://drive.google.com/uc?export=download&id=XYZ789");
        assert_eq!(id, Some("XYZ789"));
    }

    #[test]
    fn test_open_query_form() {
        let id = extract_identifier("https://drive.google.com/open?id=OPEN_42");
        assert_eq!(id, Some("OPEN_42"));
    }

    #[test]
    fn test_file_path_form_wins_over_query_forms() {
        // Some share links carry both shapes; priority order must hold
        let id = extract_identifier(
            "https://drive.google.com/file/d/PATHID/view?uc?id=QUERYID",
        );
        assert_eq!(id, Some("PATHID"));
    }

    #[test]
    fn test_non_drive_url_is_not_a_match() {
        assert_eq!(
            extract_identifier("https://example.com/file/d/NOTDRIVE/view"),
            None
        );
    }

    #[test]
    fn test_plain_text_is_not_a_match() {
        assert_eq!(extract_identifier("Alice"), None);
        assert_eq!(extract_identifier(""), None);
    }

    #[test]
    fn test_host_without_recognized_shape_is_not_a_match() {
        assert_eq!(
            extract_identifier("https://drive.google.com/drive/folders/SOMEFOLDER"),
            None
        );
    }

    #[test]
    fn test_identifier_alphabet_stops_at_delimiters() {
        let id = extract_identifier("https://drive.google.com/file/d/abc-DEF_123/view");
        assert_eq!(id, Some("abc-DEF_123"));

        let id = extract_identifier("https://drive.google.com/open?id=abc123&usp=drive");
        assert_eq!(id, Some("abc123"));
    }
}
