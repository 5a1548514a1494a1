//! Task list construction
//!
//! Turns decoded rows into a canonical task list: one task per distinct Drive
//! identifier, named from row metadata where the columns allow it, ordered by
//! the build-time sort key. An input with no references yields an empty list,
//! which callers surface as an advisory rather than a failure.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::app::extract::extract_identifier;
use crate::app::models::{DownloadTask, SortKey};
use crate::app::queue::TaskList;
use crate::app::sheet::Row;
use crate::constants::naming;

/// Offset from data-row index to user-facing row number: rows are 1-based
/// and the adapter consumed a header row.
const HEADER_ROW_OFFSET: usize = 2;

/// Metadata pulled from a row by the column-label heuristics
struct RowMetadata<'a> {
    name: Option<&'a str>,
    place: Option<&'a str>,
    date: Option<&'a str>,
}

impl<'a> RowMetadata<'a> {
    fn resolve(row: &'a Row) -> Self {
        Self {
            name: row.find_labelled(naming::NAME_LABELS),
            place: row.find_labelled(naming::PLACE_LABELS),
            date: row.find_labelled(naming::DATE_LABELS),
        }
    }
}

/// Build the deduplicated, sorted task list from decoded rows.
///
/// Per row, the first cell in column order with a recognizable reference is
/// the row's reference; later duplicates of an identifier are dropped
/// silently, so the first occurrence fixes both the reported source row and
/// the pre-sort position.
pub fn build_tasks(rows: &[Row]) -> TaskList {
    let mut seen: HashSet<String> = HashSet::new();
    let mut tasks = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let Some((identifier, reference)) = first_reference(row) else {
            continue;
        };

        if !seen.insert(identifier.to_string()) {
            debug!("Skipping duplicate identifier {} at row {}", identifier, index + HEADER_ROW_OFFSET);
            continue;
        }

        let metadata = RowMetadata::resolve(row);
        let target_name = resolve_target_name(&metadata, identifier);
        let sort_key = SortKey {
            primary: metadata.name.unwrap_or(&target_name).to_string(),
            secondary: metadata
                .date
                .and_then(parse_date)
                .unwrap_or_else(SortKey::epoch),
        };

        tasks.push(DownloadTask::new(
            identifier,
            reference,
            target_name,
            index + HEADER_ROW_OFFSET,
            sort_key,
        ));
    }

    tasks.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    debug!("Built {} tasks from {} rows", tasks.len(), rows.len());
    TaskList::from_tasks(tasks)
}

/// First cell in column order containing a recognizable reference.
/// A row is assumed to carry at most one link of interest.
fn first_reference(row: &Row) -> Option<(&str, &str)> {
    row.values()
        .find_map(|value| extract_identifier(value).map(|id| (id, value)))
}

/// Synthesize the proposed output filename from row metadata.
///
/// Name and place segments join with `" - "`, the normalized date comes
/// last; rows with neither a name-like nor a place-like column fall back to
/// an identifier-based name.
fn resolve_target_name(metadata: &RowMetadata<'_>, identifier: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    if let Some(name) = metadata.name {
        segments.push(name.to_string());
    }
    if let Some(place) = metadata.place {
        segments.push(place.to_string());
    }

    if segments.is_empty() {
        return format!("{}{}", naming::FALLBACK_PREFIX, identifier);
    }

    if let Some(date) = metadata.date {
        segments.push(normalize_date(date));
    }
    segments.join(naming::SEGMENT_SEPARATOR)
}

/// Parse a date cell against the accepted calendar formats
fn parse_date(raw: &str) -> Option<NaiveDate> {
    naming::DATE_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw.trim(), format).ok())
}

/// Render a date cell as a DDMMYYYY digit string; unparseable cells strip
/// only the `/` and `-` separators instead of failing.
fn normalize_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format(naming::DATE_DIGITS_FORMAT).to_string(),
        None => raw
            .trim()
            .chars()
            .filter(|c| *c != '/' && *c != '-')
            .collect(),
    }
}
