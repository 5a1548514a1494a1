//! Application constants for Drive Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Google Drive reference shapes and addresses
pub mod drive {
    /// Host marker that gates link extraction; cells without it are never probed
    pub const HOST_MARKER: &str = "drive.google.com";

    /// File-path sharing form: `/file/d/{id}/view`
    pub const FILE_PATH_PATTERN: &str = r"/file/d/([A-Za-z0-9_-]+)";

    /// Direct-download query form: `/uc?export=download&id={id}`
    pub const UC_QUERY_PATTERN: &str = r"uc\?.*id=([A-Za-z0-9_-]+)";

    /// Legacy open query form: `/open?id={id}`
    pub const OPEN_QUERY_PATTERN: &str = r"open\?.*id=([A-Za-z0-9_-]+)";

    /// Canonical retrieval address prefix; the identifier is appended verbatim
    pub const DOWNLOAD_URL_PREFIX: &str = "https://drive.google.com/uc?export=download&id=";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "Drive-Fetcher/0.1.0 (Batch Export Tool)";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Maximum number of redirects to follow; Drive bounces through
    /// usercontent hosts before serving bytes
    pub const MAX_REDIRECTS: usize = 10;
}

/// Rate limiting, retry and pacing configuration
pub mod limits {
    use super::Duration;

    /// Default rate limit for Drive requests (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 2;

    /// Maximum retry attempts for failed requests
    pub const MAX_RETRIES: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 1000;

    /// Pause between consecutive task attempts. Respects client-side burst
    /// limits on triggered transfers, not the per-request rate limit above.
    pub const PACING_DELAY: Duration = Duration::from_millis(1500);
}

/// Filename synthesis and content-type correction
pub mod naming {
    /// Target-name prefix used when a row carries no usable metadata
    pub const FALLBACK_PREFIX: &str = "File_";

    /// Separator between name, place and date segments
    pub const SEGMENT_SEPARATOR: &str = " - ";

    /// Digit rendering for normalized dates (DDMMYYYY)
    pub const DATE_DIGITS_FORMAT: &str = "%d%m%Y";

    /// Calendar formats accepted when parsing a date cell, tried in order
    pub const DATE_INPUT_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

    /// Column-label substrings per naming concept, matched case-insensitively.
    /// Primary-language label first, English aliases after.
    pub const NAME_LABELS: &[&str] = &["nama", "name"];
    pub const PLACE_LABELS: &[&str] = &["tempat", "place", "location"];
    pub const DATE_LABELS: &[&str] = &["tanggal", "date"];

    /// Known content types and their filename extensions
    pub const MIME_EXTENSIONS: &[(&str, &str)] = &[
        ("image/jpeg", ".jpg"),
        ("image/jpg", ".jpg"),
        ("image/png", ".png"),
        ("application/pdf", ".pdf"),
        (
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ".xlsx",
        ),
        ("text/csv", ".csv"),
        ("text/plain", ".txt"),
        ("application/msword", ".doc"),
        (
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ".docx",
        ),
    ];

    /// Longest subtype accepted as a generic extension when the content type
    /// is not in the known map
    pub const MAX_GENERIC_SUBTYPE_LEN: usize = 4;

    /// Content type marking a Drive interstitial page instead of file bytes
    pub const INTERSTITIAL_MARKER: &str = "text/html";
}

/// File handling constants
pub mod files {
    /// Suffix for in-flight download files before the atomic rename
    pub const TEMP_FILE_SUFFIX: &str = ".part";

    /// Input extensions accepted by the tabular adapter
    pub const DELIMITED_EXTENSIONS: &[&str] = &["csv"];
    pub const WORKBOOK_EXTENSIONS: &[&str] = &["xls", "xlsx"];
}
