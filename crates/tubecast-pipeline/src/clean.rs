//! The data-quality gate between the raw collector dump and everything
//! downstream.
//!
//! Rules, applied per row in input order:
//! 1. `PublishedAt` becomes `UploadDate` and is parsed; failures become null.
//! 2. Views, Likes, and Comments are coerced to non-negative integers (0 on failure).
//! 3. A row whose `VideoID` already appeared is dropped. The check runs before
//!    the null filter, so an invalid first occurrence still shadows later ones.
//! 4. Rows with a null `UploadDate` or an empty `Title` are dropped.
//!
//! Output is an order-preserving subset of the input.

use std::collections::HashSet;
use std::path::Path;

use tubecast_core::{coerce_count, parse_timestamp, CleanedVideoRecord, VideoRecord};

use crate::error::PipelineError;
use crate::storage::{read_raw_records, write_cleaned_records};

/// Result of a cleaning pass: surviving rows plus counts of what was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub records: Vec<CleanedVideoRecord>,
    pub input_rows: usize,
    /// Rows dropped because their `VideoID` appeared earlier.
    pub duplicate_rows: usize,
    /// Rows dropped for a null `UploadDate` or empty `Title`.
    pub invalid_rows: usize,
}

/// Cleans raw collector rows.
#[must_use]
pub fn clean(raw: Vec<VideoRecord>) -> CleanReport {
    apply_rules(
        raw,
        |row| row.video_id.as_str(),
        |row| {
            let upload_date = parse_timestamp(&row.published_at)?;
            if is_blank(&row.title) {
                return None;
            }
            Some(CleanedVideoRecord {
                views: coerce_count(&row.views),
                likes: coerce_count(&row.likes),
                comments: coerce_count(&row.comments),
                video_id: row.video_id,
                title: row.title,
                upload_date,
                category: row.category,
                duration: row.duration,
            })
        },
    )
}

/// Re-applies the dedup and title rules to rows that are already typed.
///
/// On output of [`clean`] this is the identity.
#[must_use]
pub fn clean_cleaned(records: Vec<CleanedVideoRecord>) -> CleanReport {
    apply_rules(
        records,
        |row| row.video_id.as_str(),
        |row| (!is_blank(&row.title)).then_some(row),
    )
}

/// Reads the raw CSV at `input`, cleans it, and writes the cleaned CSV to
/// `output`, creating `output`'s parent directories if needed.
///
/// # Errors
///
/// Returns [`PipelineError::InputMissing`] if `input` does not exist, or an
/// I/O or CSV error if reading or writing fails. Malformed cells never error.
pub fn clean_file(input: &Path, output: &Path) -> Result<CleanReport, PipelineError> {
    tracing::info!(input = %input.display(), "cleaning raw video data");
    let raw = read_raw_records(input)?;
    let report = clean(raw);
    write_cleaned_records(output, &report.records)?;

    tracing::info!(
        output = %output.display(),
        input_rows = report.input_rows,
        kept = report.records.len(),
        duplicates = report.duplicate_rows,
        invalid = report.invalid_rows,
        "cleaned data saved"
    );
    Ok(report)
}

fn apply_rules<T, K, V>(rows: Vec<T>, key: K, validate: V) -> CleanReport
where
    K: Fn(&T) -> &str,
    V: Fn(T) -> Option<CleanedVideoRecord>,
{
    let input_rows = rows.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(input_rows);
    let mut records = Vec::with_capacity(input_rows);
    let mut duplicate_rows = 0;
    let mut invalid_rows = 0;

    for row in rows {
        if !seen.insert(key(&row).to_owned()) {
            duplicate_rows += 1;
            continue;
        }
        match validate(row) {
            Some(record) => records.push(record),
            None => invalid_rows += 1,
        }
    }

    CleanReport {
        records,
        input_rows,
        duplicate_rows,
        invalid_rows,
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
#[path = "clean_test.rs"]
mod tests;
