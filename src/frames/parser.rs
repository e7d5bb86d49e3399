//! Per-frame text file parsing
//!
//! Each analysis frame is stored as `<frame>.txt`. The first line holds the
//! column names (optionally quoted, optionally behind a `#` comment marker);
//! the first later line that starts with a digit holds one integer per column.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ChillError, Result};

/// Extension of frame files, without the dot
pub const FRAME_EXTENSION: &str = "txt";

/// One frame file reduced to its header and single data record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRecord {
    pub frame_number: u64,
    pub header: Vec<String>,
    pub values: Vec<i64>,
    /// File the record came from
    pub source: PathBuf,
    /// 1-based line of the data record
    pub line: usize,
}

/// A frame file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFile {
    pub frame_number: u64,
    pub path: PathBuf,
}

/// List the frame files of `dir` in ascending numeric frame order.
///
/// Entries that are not `<non-negative integer>.txt` are ignored, so `10.txt`
/// sorts after `2.txt` whatever order the filesystem reports.
pub fn list_frame_files(dir: &Path) -> Result<Vec<FrameFile>> {
    if !dir.is_dir() {
        return Err(ChillError::DirectoryNotFound(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|source| ChillError::FileRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ChillError::FileRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        match frame_number_from_path(&path) {
            Some(frame_number) if path.is_file() => files.push(FrameFile { frame_number, path }),
            _ => debug!("Ignoring {}", path.display()),
        }
    }

    files.sort_by_key(|f| f.frame_number);
    Ok(files)
}

/// Frame number encoded in a file name such as `42.txt`.
///
/// Numbers beyond `i64::MAX` are rejected so every frame fits the table's
/// integer column.
pub fn frame_number_from_path(path: &Path) -> Option<u64> {
    let ext = path.extension()?.to_str()?;
    if ext != FRAME_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    // u64::from_str accepts a leading '+', frame names never carry one
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let frame: i64 = stem.parse().ok()?;
    u64::try_from(frame).ok()
}

/// Read and parse one frame file.
///
/// Returns `Ok(None)` when the file has no digit-leading data line.
pub fn parse_frame_file(file: &FrameFile) -> Result<Option<FrameRecord>> {
    let text = fs::read_to_string(&file.path).map_err(|source| ChillError::FileRead {
        path: file.path.clone(),
        source,
    })?;
    parse_frame_text(&text, file.frame_number, &file.path)
}

/// Parse the contents of a frame file read from `source`
pub fn parse_frame_text(
    text: &str,
    frame_number: u64,
    source: &Path,
) -> Result<Option<FrameRecord>> {
    let mut lines = text.lines();
    let header = lines.next().map(parse_header).unwrap_or_default();

    // Line numbers are 1-based and the header is line 1
    let data = lines
        .enumerate()
        .map(|(idx, line)| (idx + 2, line.trim()))
        .find(|(_, line)| line.starts_with(|c: char| c.is_ascii_digit()));

    let Some((line_no, line)) = data else {
        debug!("Frame {} has no data line", frame_number);
        return Ok(None);
    };

    let values = parse_values(line).map_err(|reason| ChillError::MalformedRecord {
        path: source.to_path_buf(),
        line: line_no,
        reason,
    })?;

    if values.len() != header.len() {
        return Err(ChillError::MalformedRecord {
            path: source.to_path_buf(),
            line: line_no,
            reason: format!(
                "expected {} values to match the header, found {}",
                header.len(),
                values.len()
            ),
        });
    }

    Ok(Some(FrameRecord {
        frame_number,
        header,
        values,
        source: source.to_path_buf(),
        line: line_no,
    }))
}

/// Split a header line into column names, removing quotes and a `#` marker
pub fn parse_header(line: &str) -> Vec<String> {
    line.split_whitespace()
        .map(|token| token.replace(['"', '\''], ""))
        .enumerate()
        .filter_map(|(idx, token)| {
            let token = if idx == 0 {
                token.trim_start_matches('#').to_string()
            } else {
                token
            };
            (!token.is_empty()).then_some(token)
        })
        .collect()
}

fn parse_values(line: &str) -> std::result::Result<Vec<i64>, String> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| format!("'{}' is not an integer", token))
        })
        .collect()
}
