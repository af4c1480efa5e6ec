pub mod table;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::IntakeError;
use crate::record::ExtractedRecord;
use crate::schema::SchemaRegistry;

pub const DEFAULT_STORE_DIR: &str = "data";

/// A loaded period table: header plus rows, rows not yet projected.
pub struct PersistedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Result of a successful append. `recovered` flags that an existing
/// table could not be read and the record went into a fresh one; the
/// caller must surface that, never swallow it.
pub struct AppendOutcome {
    pub path: PathBuf,
    pub rows: usize,
    pub recovered: bool,
}

/// Per-period CSV tables under one directory, one file per period key.
/// Appends are load-merge-rewrite: the whole file is rewritten through a
/// same-directory tempfile so a crash never leaves a half-written table.
pub struct TableStore {
    dir: PathBuf,
}

impl TableStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, period: &str) -> PathBuf {
        self.dir.join(format!("intake-{period}.csv"))
    }

    /// Load a period table. Missing file is `None`; an unreadable or
    /// undecodable file is an error here (only `append` recovers).
    pub fn load(&self, period: &str) -> Result<Option<PersistedTable>, IntakeError> {
        let path = self.path_for(period);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IntakeError::PersistenceIo { path, source: e }),
        };
        let (header, rows) = table::decode(&raw).map_err(|e| IntakeError::PersistenceIo {
            path,
            source: io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
        })?;
        Ok(Some(PersistedTable { header, rows }))
    }

    /// Append one record to the period table.
    ///
    /// Column reconciliation: the effective column list is the loaded
    /// header in its existing order, with any new schema columns
    /// appended at the end. Existing columns are never dropped or
    /// reordered, so old and new records coexist across a day's session.
    pub fn append(
        &self,
        record: &ExtractedRecord,
        schema: &SchemaRegistry,
        period: &str,
    ) -> Result<AppendOutcome, IntakeError> {
        let path = self.path_for(period);

        let (existing, recovered) = match fs::read_to_string(&path) {
            Ok(raw) => match table::decode(&raw) {
                Ok((header, rows)) => (Some((header, rows)), false),
                Err(e) => {
                    warn!(
                        "existing table {} unreadable ({}), starting a fresh table",
                        path.display(),
                        e
                    );
                    (None, true)
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => (None, false),
            Err(e) => return Err(IntakeError::PersistenceIo { path, source: e }),
        };

        let (mut header, mut rows) = existing.unwrap_or_default();
        for col in schema.columns() {
            if !header.iter().any(|c| c == col) {
                header.push(col.clone());
            }
        }
        // project prior rows onto the (possibly widened) column list
        for row in &mut rows {
            row.resize(header.len(), String::new());
        }
        rows.push(
            header
                .iter()
                .map(|col| record.get(col).unwrap_or("").to_string())
                .collect(),
        );

        self.write_atomic(&path, &table::encode(&header, &rows))?;
        Ok(AppendOutcome {
            path,
            rows: rows.len(),
            recovered,
        })
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), IntakeError> {
        let io_err = |source| IntakeError::PersistenceIo {
            path: path.to_path_buf(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(contents.as_bytes()).map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}
