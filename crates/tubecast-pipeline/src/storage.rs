//! Flat-file persistence: raw and cleaned CSVs plus whole-file atomic writes.
//!
//! Every writer stages its output in a temp file beside the destination and
//! renames it into place, so an interrupted run leaves either the previous
//! file or the complete new one, never a partial write.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tubecast_core::{parse_timestamp, CleanedVideoRecord, VideoRecord};

use crate::error::PipelineError;

/// Column order of the raw collector CSV.
pub const RAW_HEADERS: [&str; 8] = [
    "VideoID",
    "Title",
    "PublishedAt",
    "Category",
    "Duration",
    "Views",
    "Likes",
    "Comments",
];

/// Column order of the cleaned CSV.
pub const CLEANED_HEADERS: [&str; 8] = [
    "VideoID",
    "Title",
    "UploadDate",
    "Views",
    "Likes",
    "Comments",
    "Category",
    "Duration",
];

#[derive(Serialize)]
struct CleanedCsvRow<'a> {
    video_id: &'a str,
    title: &'a str,
    upload_date: String,
    views: u64,
    likes: u64,
    comments: u64,
    category: &'a str,
    duration: &'a str,
}

/// Cleaned CSV row as text, before the counts and date are re-parsed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CleanedCsvInput {
    #[serde(rename = "VideoID")]
    video_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "UploadDate")]
    upload_date: String,
    #[serde(rename = "Views")]
    views: String,
    #[serde(rename = "Likes")]
    likes: String,
    #[serde(rename = "Comments")]
    comments: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Duration")]
    duration: String,
}

impl CleanedCsvInput {
    /// Converts a cleaned row back into a typed record.
    ///
    /// Rows with an unparseable date or a missing or non-integer count are
    /// skipped with a warning rather than failing the whole load.
    fn into_record(self, line: u64) -> Option<CleanedVideoRecord> {
        let Some(upload_date) = parse_timestamp(&self.upload_date) else {
            tracing::warn!(line, video_id = %self.video_id, "skipping row with unparseable UploadDate");
            return None;
        };

        let count = |column: &str, raw: &str| -> Option<u64> {
            let parsed = raw.trim().parse::<u64>().ok();
            if parsed.is_none() {
                tracing::warn!(line, video_id = %self.video_id, column, "skipping row with missing count");
            }
            parsed
        };
        let views = count("Views", &self.views)?;
        let likes = count("Likes", &self.likes)?;
        let comments = count("Comments", &self.comments)?;

        Some(CleanedVideoRecord {
            video_id: self.video_id,
            title: self.title,
            upload_date,
            views,
            likes,
            comments,
            category: self.category,
            duration: self.duration,
        })
    }
}

/// Renders an upload date the way the cleaned CSV stores it: RFC 3339 in
/// UTC with a `Z` suffix, fractional seconds only when present.
#[must_use]
pub fn format_upload_date(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Reads the raw collector CSV.
///
/// # Errors
///
/// Returns [`PipelineError::InputMissing`] if `path` does not exist and
/// [`PipelineError::Csv`] if the file is not readable CSV.
pub fn read_raw_records(path: &Path) -> Result<Vec<VideoRecord>, PipelineError> {
    let mut reader = open_reader(path)?;
    reader
        .deserialize::<VideoRecord>()
        .map(|row| row.map_err(|source| csv_error(path, source)))
        .collect()
}

/// Writes raw records wholesale, header first; an empty slice produces a
/// header-only file.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] or [`PipelineError::Csv`] on write failure.
pub fn write_raw_records(path: &Path, records: &[VideoRecord]) -> Result<(), PipelineError> {
    write_csv_atomically(path, &RAW_HEADERS, |writer| {
        for record in records {
            writer.serialize(record)?;
        }
        Ok(())
    })
}

/// Reads a cleaned CSV back into typed records.
///
/// # Errors
///
/// Returns [`PipelineError::InputMissing`] if `path` does not exist and
/// [`PipelineError::Csv`] if the file is not readable CSV.
pub fn read_cleaned_records(path: &Path) -> Result<Vec<CleanedVideoRecord>, PipelineError> {
    let mut reader = open_reader(path)?;
    let mut records = Vec::new();

    for (idx, row) in reader.deserialize::<CleanedCsvInput>().enumerate() {
        let row = row.map_err(|source| csv_error(path, source))?;
        // Header is line 1; data rows follow.
        let line = idx as u64 + 2;
        if let Some(record) = row.into_record(line) {
            records.push(record);
        }
    }

    Ok(records)
}

/// Writes cleaned records wholesale in [`CLEANED_HEADERS`] order.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] or [`PipelineError::Csv`] on write failure.
pub fn write_cleaned_records(
    path: &Path,
    records: &[CleanedVideoRecord],
) -> Result<(), PipelineError> {
    write_csv_atomically(path, &CLEANED_HEADERS, |writer| {
        for r in records {
            writer.serialize(CleanedCsvRow {
                video_id: &r.video_id,
                title: &r.title,
                upload_date: format_upload_date(&r.upload_date),
                views: r.views,
                likes: r.likes,
                comments: r.comments,
                category: &r.category,
                duration: &r.duration,
            })?;
        }
        Ok(())
    })
}

/// Replaces `path` with `bytes` via a sibling temp file and rename,
/// creating missing parent directories first.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] if any filesystem step fails.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    use std::io::Write;

    let mut tmp = staging_file(path)?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.flush())
        .map_err(|source| io_error(path, source))?;
    commit(tmp, path)
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::InputMissing {
            path: path.to_path_buf(),
        });
    }
    // Short rows read as if the trailing cells were empty, leaving the
    // cleaner to drop or coerce them.
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|source| csv_error(path, source))
}

fn write_csv_atomically<F>(path: &Path, headers: &[&str], write_rows: F) -> Result<(), PipelineError>
where
    F: FnOnce(&mut csv::Writer<&mut File>) -> Result<(), csv::Error>,
{
    let mut tmp = staging_file(path)?;
    {
        // Headers are written explicitly so an empty record set still
        // yields a well-formed file.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        writer
            .write_record(headers)
            .map_err(|source| csv_error(path, source))?;
        write_rows(&mut writer).map_err(|source| csv_error(path, source))?;
        writer.flush().map_err(|source| io_error(path, source))?;
    }
    commit(tmp, path)
}

fn staging_file(path: &Path) -> Result<NamedTempFile, PipelineError> {
    let dir = ensure_parent_dir(path)?;
    NamedTempFile::new_in(&dir).map_err(|source| io_error(&dir, source))
}

fn commit(tmp: NamedTempFile, path: &Path) -> Result<(), PipelineError> {
    tmp.persist(path)
        .map(|_| ())
        .map_err(|e| io_error(path, e.error))
}

/// Creates the parent directory of `path` if needed and returns it.
fn ensure_parent_dir(path: &Path) -> Result<PathBuf, PipelineError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    std::fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;
    Ok(dir)
}

fn io_error(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path, source: csv::Error) -> PipelineError {
    PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;

    fn cleaned(video_id: &str, views: u64) -> CleanedVideoRecord {
        CleanedVideoRecord {
            video_id: video_id.to_string(),
            title: format!("Video {video_id}"),
            upload_date: Utc.with_ymd_and_hms(2024, 8, 15, 16, 0, 0).unwrap(),
            views,
            likes: 10,
            comments: 2,
            category: "27".to_string(),
            duration: "PT5M".to_string(),
        }
    }

    #[test]
    fn read_raw_records_missing_file_is_input_missing() {
        let dir = TempDir::new().unwrap();
        let err = read_raw_records(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::InputMissing { .. }), "got {err:?}");
    }

    #[test]
    fn raw_records_round_trip_through_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.csv");
        let records = vec![VideoRecord {
            video_id: "v1".to_string(),
            title: "Hello, \"world\"".to_string(),
            published_at: "2024-01-01T00:00:00Z".to_string(),
            category: "22".to_string(),
            duration: "PT1M".to_string(),
            views: "100".to_string(),
            likes: "bad".to_string(),
            comments: String::new(),
        }];

        write_raw_records(&path, &records).unwrap();
        assert_eq!(read_raw_records(&path).unwrap(), records);
    }

    #[test]
    fn empty_raw_write_produces_header_only_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.csv");
        write_raw_records(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), RAW_HEADERS.join(","));
        assert!(read_raw_records(&path).unwrap().is_empty());
    }

    #[test]
    fn raw_reader_tolerates_missing_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(
            &path,
            "VideoID,Title,PublishedAt,Views,Likes,Comments\nv1,A,2024-01-01T00:00:00Z,1,2,3\n",
        )
        .unwrap();

        let rows = read_raw_records(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "");
        assert_eq!(rows[0].duration, "");
        assert_eq!(rows[0].views, "1");
    }

    #[test]
    fn short_raw_row_reads_as_empty_trailing_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(
            &path,
            format!(
                "{}\nv1,A,2024-01-01T00:00:00Z,22,PT1M,10,1,0\nv2,B,2024-01-02T00:00:00Z\n",
                RAW_HEADERS.join(",")
            ),
        )
        .unwrap();

        let rows = read_raw_records(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].published_at, "2024-01-02T00:00:00Z");
        assert_eq!(rows[1].views, "");
        assert_eq!(rows[1].comments, "");
    }

    #[test]
    fn cleaned_write_creates_parent_dirs_and_uses_fixed_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed").join("nested").join("clean.csv");
        write_cleaned_records(&path, &[cleaned("v1", 100)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("VideoID,Title,UploadDate,Views,Likes,Comments,Category,Duration")
        );
        assert_eq!(
            lines.next(),
            Some("v1,Video v1,2024-08-15T16:00:00Z,100,10,2,27,PT5M")
        );
    }

    #[test]
    fn cleaned_records_round_trip_through_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clean.csv");
        let records = vec![cleaned("v1", 100), cleaned("v2", 0)];

        write_cleaned_records(&path, &records).unwrap();
        assert_eq!(read_cleaned_records(&path).unwrap(), records);
    }

    #[test]
    fn cleaned_reader_skips_rows_with_missing_counts_or_bad_dates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clean.csv");
        std::fs::write(
            &path,
            "VideoID,Title,UploadDate,Views,Likes,Comments,Category\n\
             ok,A,2024-01-01 00:00:00+00:00,10,1,0,22\n\
             no-views,B,2024-01-01T00:00:00Z,,1,0,22\n\
             bad-likes,C,2024-01-01T00:00:00Z,5,x,0,22\n\
             bad-date,D,someday,5,1,0,22\n",
        )
        .unwrap();

        let rows = read_cleaned_records(&path).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
        assert_eq!(rows[0].duration, "");
    }

    #[test]
    fn write_atomically_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        write_atomically(&path, b"first").unwrap();
        write_atomically(&path, b"second").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temp files should not be left behind");
    }

    #[test]
    fn format_upload_date_keeps_fractional_seconds_only_when_present() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_upload_date(&whole), "2024-01-01T00:00:00Z");

        let fractional = whole + chrono::Duration::milliseconds(250);
        assert_eq!(format_upload_date(&fractional), "2024-01-01T00:00:00.250Z");
    }
}
