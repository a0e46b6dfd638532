use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::fields::extract_fields;
use crate::progress::Progress;

/// Errors surfaced by the conversion passes.
///
/// Decode errors and grammar non-matches are deliberately absent: invalid
/// UTF-8 is replaced locally and a line that matches nothing simply yields
/// no fields. Only real I/O failures are fatal.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("cannot stat {}: {source}", path.display())]
    Metadata { path: PathBuf, source: io::Error },
    #[error("read error in {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot create {}: {source}", path.display())]
    Create { path: PathBuf, source: csv::Error },
    #[error("write error in {}: {source}", path.display())]
    Write { path: PathBuf, source: csv::Error },
    #[error("flush error in {}: {source}", path.display())]
    Flush { path: PathBuf, source: io::Error },
}

/// Streams `path` line by line, feeding every non-blank line to `on_line`
/// and cumulative byte counts to `progress`.
///
/// Lines are read as raw bytes and decoded lossily, so malformed UTF-8
/// never fails a pass. Byte accounting uses the raw line length including
/// the terminator, which makes the final count land on the file size from
/// metadata.
fn stream_lines<F>(
    path: &Path,
    progress: &mut dyn Progress,
    mut on_line: F,
) -> Result<(), ConvertError>
where
    F: FnMut(&str) -> Result<(), ConvertError>,
{
    let file = File::open(path).map_err(|source| ConvertError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let total_bytes = file
        .metadata()
        .map_err(|source| ConvertError::Metadata {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    let mut reader = BufReader::new(file);

    let mut raw = Vec::new();
    let mut bytes_read: u64 = 0;
    loop {
        raw.clear();
        let n = reader
            .read_until(b'\n', &mut raw)
            .map_err(|source| ConvertError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if n == 0 {
            break;
        }
        bytes_read += n as u64;

        let decoded = String::from_utf8_lossy(&raw);
        let line = decoded.trim_end_matches(|c| c == '\n' || c == '\r');
        // Blank lines contribute nothing beyond byte accounting.
        if !line.trim().is_empty() {
            on_line(line)?;
        }
        progress.update(bytes_read, total_bytes);
    }
    // The file may have grown or shrunk since the size was taken.
    progress.update(bytes_read.max(total_bytes), total_bytes);
    progress.finish();
    Ok(())
}

/// First pass: collects the union of every field name in the file.
///
/// Returns the names sorted lexicographically, each exactly once. The
/// returned sequence fixes the CSV column order for [`write_csv`].
pub fn discover_fields(
    path: &Path,
    progress: &mut dyn Progress,
) -> Result<Vec<String>, ConvertError> {
    let mut names = BTreeSet::new();
    stream_lines(path, progress, |line| {
        for key in extract_fields(line).into_keys() {
            names.insert(key);
        }
        Ok(())
    })?;
    debug!("discovered {} field names in {}", names.len(), path.display());
    Ok(names.into_iter().collect())
}

/// Second pass: writes the header plus one CSV record per non-blank line.
///
/// Every record has exactly `fields.len()` cells in `fields` order; a line
/// that lacks a field gets an empty cell, and a line matching nothing
/// still produces an all-empty row. Quoting and escaping follow standard
/// CSV rules. Returns the number of data rows written; the writer is
/// flushed before returning, and both file handles are released on every
/// exit path.
pub fn write_csv(
    path: &Path,
    fields: &[String],
    output: &Path,
    progress: &mut dyn Progress,
) -> Result<u64, ConvertError> {
    let mut writer = csv::Writer::from_path(output).map_err(|source| ConvertError::Create {
        path: output.to_path_buf(),
        source,
    })?;
    writer
        .write_record(fields)
        .map_err(|source| ConvertError::Write {
            path: output.to_path_buf(),
            source,
        })?;

    let mut rows: u64 = 0;
    stream_lines(path, progress, |line| {
        let record = extract_fields(line);
        let cells = fields
            .iter()
            .map(|name| record.get(name).map(String::as_str).unwrap_or(""));
        writer
            .write_record(cells)
            .map_err(|source| ConvertError::Write {
                path: output.to_path_buf(),
                source,
            })?;
        rows += 1;
        Ok(())
    })?;

    writer.flush().map_err(|source| ConvertError::Flush {
        path: output.to_path_buf(),
        source,
    })?;
    debug!("wrote {rows} data rows to {}", output.display());
    Ok(rows)
}
