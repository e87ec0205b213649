//! Time-tag records and the on-disk tag-file format.
//!
//! A tag is a `(channel, time bin)` pair, time measured in integer units
//! of [`BIN_RESOLUTION_NS`](crate::BIN_RESOLUTION_NS). The raw-tag
//! generator writes streams of tags sorted ascending by time bin; the
//! cross-correlation analyzer consumes them in the same order. The file
//! format is a `Channel<TAB>Time` header followed by one tab-separated
//! integer pair per event.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Header line of a tag file.
pub const TAG_FILE_HEADER: &str = "Channel\tTime";

/// One detection event: channel id and discretized arrival time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRecord {
    /// Detector channel (1–16).
    pub channel: u8,
    /// Arrival time in integer bins of the tagger resolution.
    pub time_bin: i64,
}

/// Errors at the tag-file boundary.
///
/// Malformed files are fatal here: a wrong column count or an unparsable
/// field means the data cannot be analyzed, so no recovery is attempted.
#[derive(Debug, Error)]
pub enum TagFileError {
    #[error("failed to read tag file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected 2 tab-separated columns, found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("line {line}: invalid integer field '{field}'")]
    InvalidField { line: usize, field: String },
}

/// Writes a tag stream in the two-column text format.
///
/// The stream is written as given; callers are responsible for sorting
/// (the generator always emits sorted streams).
pub fn write_tag_file(path: impl AsRef<Path>, tags: &[TagRecord]) -> Result<(), TagFileError> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    writeln!(out, "{}", TAG_FILE_HEADER)?;
    for tag in tags {
        writeln!(out, "{}\t{}", tag.channel, tag.time_bin)?;
    }
    out.flush()?;
    tracing::info!(count = tags.len(), path = %path.as_ref().display(), "tag file written");
    Ok(())
}

/// Reads a tag file, skipping the header line.
pub fn read_tag_file(path: impl AsRef<Path>) -> Result<Vec<TagRecord>, TagFileError> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut tags = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if idx == 0 && line.starts_with("Channel") {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        tags.push(parse_line(&line, idx + 1)?);
    }
    Ok(tags)
}

fn parse_line(line: &str, line_no: usize) -> Result<TagRecord, TagFileError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 2 {
        return Err(TagFileError::ColumnCount {
            line: line_no,
            found: fields.len(),
        });
    }
    let channel = fields[0]
        .trim()
        .parse::<u8>()
        .map_err(|_| TagFileError::InvalidField {
            line: line_no,
            field: fields[0].to_string(),
        })?;
    let time_bin = fields[1]
        .trim()
        .parse::<i64>()
        .map_err(|_| TagFileError::InvalidField {
            line: line_no,
            field: fields[1].to_string(),
        })?;
    Ok(TagRecord { channel, time_bin })
}

/// Returns true if the stream is sorted ascending by time bin.
pub fn is_time_sorted(tags: &[TagRecord]) -> bool {
    tags.windows(2).all(|w| w[0].time_bin <= w[1].time_bin)
}
