//! Filename correction and header encoding
//!
//! Shared by the retrieval service (disposition header contract) and the
//! retrieval strategy (local filename assignment): both sides apply the same
//! content-type driven extension correction independently.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::constants::naming;

/// Characters left unescaped in the disposition filename, matching
/// `encodeURIComponent`: alphanumerics plus `- _ . ! ~ * ' ( )`.
const DISPOSITION_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Normalize a content-type header value to its bare media type:
/// parameters stripped, trimmed, lowercased.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Check whether a content type marks an interstitial access page rather
/// than file bytes.
pub fn is_interstitial(content_type: &str) -> bool {
    media_type(content_type).contains(naming::INTERSTITIAL_MARKER)
}

/// Resolve a filename extension for an observed content type.
///
/// Known types map through a fixed table; otherwise a short alphanumeric
/// subtype is accepted as a generic extension, and anything else yields
/// nothing.
pub fn extension_for(content_type: &str) -> Option<String> {
    let media = media_type(content_type);

    if let Some((_, ext)) = naming::MIME_EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == media)
    {
        return Some((*ext).to_string());
    }

    let subtype = media.split('/').nth(1)?;
    if !subtype.is_empty()
        && subtype.len() <= naming::MAX_GENERIC_SUBTYPE_LEN
        && subtype.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Some(format!(".{}", subtype));
    }

    None
}

/// Append the extension implied by the content type unless the name already
/// ends with it (case-insensitive). A missing content type leaves the name
/// untouched.
pub fn apply_extension(name: &str, content_type: Option<&str>) -> String {
    let Some(extension) = content_type.and_then(extension_for) else {
        return name.to_string();
    };

    if name.to_lowercase().ends_with(&extension) {
        name.to_string()
    } else {
        format!("{}{}", name, extension)
    }
}

/// Strip control characters before the name reaches a header or the
/// file system.
pub fn strip_control(name: &str) -> String {
    name.chars().filter(|c| !c.is_control()).collect()
}

/// Build the `Content-Disposition` value proposing the corrected filename,
/// percent-encoded per RFC 5987.
pub fn content_disposition(name: &str) -> String {
    let encoded = utf8_percent_encode(name, DISPOSITION_SET);
    format!("attachment; filename*=UTF-8''{}", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_type_appends_extension() {
        assert_eq!(apply_extension("Report", Some("application/pdf")), "Report.pdf");
    }

    #[test]
    fn test_existing_extension_left_unmodified() {
        assert_eq!(
            apply_extension("Report.pdf", Some("application/pdf")),
            "Report.pdf"
        );
        assert_eq!(
            apply_extension("REPORT.PDF", Some("application/pdf")),
            "REPORT.PDF"
        );
    }

    #[test]
    fn test_missing_content_type_skips_correction() {
        assert_eq!(apply_extension("Report", None), "Report");
    }

    #[test]
    fn test_content_type_parameters_ignored() {
        assert_eq!(
            apply_extension("Report", Some("application/pdf; charset=binary")),
            "Report.pdf"
        );
    }

    #[test]
    fn test_generic_short_subtype() {
        assert_eq!(extension_for("application/zip"), Some(".zip".to_string()));
        assert_eq!(extension_for("audio/mp4"), Some(".mp4".to_string()));
    }

    #[test]
    fn test_long_or_unsafe_subtype_yields_nothing() {
        assert_eq!(extension_for("application/octet-stream"), None);
        assert_eq!(extension_for("application/x-tar"), None);
        assert_eq!(extension_for("weird"), None);
    }

    #[test]
    fn test_interstitial_detection() {
        assert!(is_interstitial("text/html"));
        assert!(is_interstitial("text/html; charset=utf-8"));
        assert!(!is_interstitial("application/pdf"));
    }

    #[test]
    fn test_control_characters_stripped() {
        assert_eq!(strip_control("Re\r\npo\trt"), "Report");
        assert_eq!(strip_control("clean name"), "clean name");
    }

    #[test]
    fn test_disposition_encoding() {
        assert_eq!(
            content_disposition("Alice - HQ - 01022020.pdf"),
            "attachment; filename*=UTF-8''Alice%20-%20HQ%20-%2001022020.pdf"
        );
    }
}
