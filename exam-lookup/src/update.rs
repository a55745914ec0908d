//! Dataset update pipeline: merge an uploaded table into a cohort source
//!
//! The merged table is fully computed and serialized before the backing file
//! is touched, and the file is replaced by renaming a finished sibling, so a
//! failed update leaves the previous source byte-identical.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use exam_common::digits::translate_digits;
use exam_common::normalize_digits;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::store::{ColumnInferencer, RawTable, SourceFormat};

/// Outcome of a successful update
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpdateReport {
    pub cohort: String,
    /// Rows in the uploaded table, before deduplication
    pub rows_received: usize,
    /// Rows in the cohort after merge and reload
    pub total_rows: usize,
    /// Rows replaced by a differently written identifier
    pub collapsed: Vec<CollapsedIdentifier>,
    pub message: String,
}

/// A dropped row whose identifier only matched after normalization
/// (e.g. `5100` replaced by `51`)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CollapsedIdentifier {
    pub kept: String,
    pub replaced: String,
}

/// Result of [`merge_tables`]
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    pub table: RawTable,
    pub collapsed: Vec<CollapsedIdentifier>,
}

/// Prior rows followed by incoming rows, deduplicated by identifier
///
/// Columns are the union of both headers (prior order first). The identifier
/// column is inferred on the merged header; for each normalized identifier
/// only the last occurrence survives, in its own position. Rows without an
/// identifier are kept as-is. Dropped rows whose raw identifier digits differ
/// from the surviving row are reported as collapsed.
pub fn merge_tables(
    prior: Option<RawTable>,
    incoming: RawTable,
    inferencer: &ColumnInferencer,
) -> MergedTable {
    let mut headers = prior
        .as_ref()
        .map(|p| p.headers.clone())
        .unwrap_or_default();
    for header in &incoming.headers {
        if !headers.contains(header) {
            headers.push(header.clone());
        }
    }

    let mut rows = Vec::new();
    for table in prior.iter().chain(std::iter::once(&incoming)) {
        let positions: Vec<Option<usize>> = headers.iter().map(|h| table.column(h)).collect();
        for row in &table.rows {
            rows.push(
                positions
                    .iter()
                    .map(|p| p.and_then(|i| row.get(i)).cloned().unwrap_or_default())
                    .collect::<Vec<String>>(),
            );
        }
    }

    let id_column = inferencer.infer(&headers, |_| false).identifier;
    let keys: Vec<String> = rows.iter().map(|r| normalize_digits(&r[id_column])).collect();

    let mut last_seen: HashMap<&str, usize> = HashMap::new();
    for (index, key) in keys.iter().enumerate() {
        if !key.is_empty() {
            last_seen.insert(key.as_str(), index);
        }
    }

    let mut collapsed = Vec::new();
    for (index, key) in keys.iter().enumerate() {
        let Some(&kept) = last_seen.get(key.as_str()) else {
            continue;
        };
        if kept == index {
            continue;
        }
        let (kept_raw, replaced_raw) = (&rows[kept][id_column], &rows[index][id_column]);
        if raw_digits(kept_raw) != raw_digits(replaced_raw) {
            warn!(
                "Identifier '{}' replaces '{}' (same seat number after normalization)",
                kept_raw.trim(),
                replaced_raw.trim()
            );
            collapsed.push(CollapsedIdentifier {
                kept: kept_raw.trim().to_string(),
                replaced: replaced_raw.trim().to_string(),
            });
        }
    }

    let before = rows.len();
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .zip(&keys)
        .enumerate()
        .filter(|(index, (_, key))| key.is_empty() || last_seen.get(key.as_str()) == Some(index))
        .map(|(_, (row, _))| row)
        .collect();
    debug!(
        "Merged {} rows into {} ({} duplicates dropped)",
        before,
        rows.len(),
        before - rows.len()
    );

    MergedTable {
        table: RawTable { headers, rows },
        collapsed,
    }
}

/// ASCII digits of a raw cell, in any script, trailing zeros kept
fn raw_digits(cell: &str) -> String {
    translate_digits(cell)
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}

/// Replace `path` with the table, serialized in the format its extension names
pub fn write_table_atomic(path: &Path, table: &RawTable) -> Result<()> {
    let bytes = table.to_bytes(SourceFormat::from_path(path))?;
    write_atomic(path, &bytes)?;
    Ok(())
}

/// Replace `path` with `bytes` via a synced temporary sibling and a rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("data");
    let tmp = parent.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    let written = (|| -> std::io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        std::fs::rename(&tmp, path)
    })();

    if written.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    written
}
