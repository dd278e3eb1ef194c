//! # Capture Date Module
//!
//! Works out when a photo was taken.
//!
//! ## Sources, in order
//! 1. EXIF `DateTimeOriginal`
//! 2. EXIF `DateTime`
//! 3. The file's last-modified time, in local time
//!
//! EXIF values are read with `kamadak-exif`, which understands JPEG, TIFF,
//! PNG and WebP containers. A missing tag, a malformed value or a file that
//! cannot be parsed at all is treated the same way: the next source is tried.

use crate::error::ProcessError;
use chrono::{DateTime, Local, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// EXIF date layout: "YYYY:MM:DD HH:MM:SS"
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Layout used for date-based file names
pub const FILE_NAME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Where a capture timestamp came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    DateTimeOriginal,
    DateTime,
    Modified,
}

/// A point in time associated with an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTimestamp {
    /// Local wall-clock time
    pub datetime: NaiveDateTime,
    pub source: TimestampSource,
}

impl CaptureTimestamp {
    /// Fixed-width `YYYYMMDD_HHMMSS`
    pub fn format(&self) -> String {
        self.datetime.format(FILE_NAME_FORMAT).to_string()
    }
}

/// Resolve the capture timestamp of a file, EXIF first, then modified time
pub fn capture_timestamp(path: &Path) -> Result<CaptureTimestamp, ProcessError> {
    match read_exif_timestamp(path) {
        Ok(timestamp) => Ok(timestamp),
        Err(e) => {
            debug!("{}: {}, using modified time", path.display(), e);
            modified_timestamp(path)
        }
    }
}

/// Read the EXIF capture date
pub fn read_exif_timestamp(path: &Path) -> Result<CaptureTimestamp, ProcessError> {
    let file = File::open(path).map_err(|e| ProcessError::MetadataUnavailable(e.to_string()))?;
    let mut bufreader = BufReader::new(&file);
    let exif = Reader::new()
        .read_from_container(&mut bufreader)
        .map_err(|e| ProcessError::MetadataUnavailable(e.to_string()))?;

    let candidates = [
        (Tag::DateTimeOriginal, TimestampSource::DateTimeOriginal),
        (Tag::DateTime, TimestampSource::DateTime),
    ];

    for (tag, source) in candidates {
        let Some(field) = exif.get_field(tag, In::PRIMARY) else {
            continue;
        };
        match parse_exif_datetime(&field.value) {
            Some(datetime) => return Ok(CaptureTimestamp { datetime, source }),
            None => debug!("{}: unparsable {} value", path.display(), tag),
        }
    }

    Err(ProcessError::MetadataUnavailable("no usable date tag".to_string()))
}

fn parse_exif_datetime(value: &Value) -> Option<NaiveDateTime> {
    let Value::Ascii(vec) = value else {
        return None;
    };
    let bytes = vec.first()?;
    let text = std::str::from_utf8(bytes).ok()?;
    NaiveDateTime::parse_from_str(text.trim_end_matches('\0').trim(), EXIF_DATE_FORMAT).ok()
}

/// Modified time of the file, converted to local time
pub fn modified_timestamp(path: &Path) -> Result<CaptureTimestamp, ProcessError> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|_| ProcessError::UnresolvableDate(path.to_path_buf()))?;

    Ok(CaptureTimestamp {
        datetime: DateTime::<Local>::from(modified).naive_local(),
        source: TimestampSource::Modified,
    })
}
