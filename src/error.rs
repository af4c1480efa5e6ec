use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error taxonomy for extraction and persistence.
///
/// `EmptyInput` and `UnsupportedSource` are user-correctable.
/// `EnrichmentUnavailable` is soft: the pipeline logs it and proceeds
/// with pattern + key:value results only. `PersistenceIo` is hard: the
/// record is not saved and the caller may retry with another location.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("no text supplied")]
    EmptyInput,

    #[error("enrichment unavailable: {0}")]
    EnrichmentUnavailable(String),

    #[error("persistence failure at {path}: {source}")]
    PersistenceIo { path: PathBuf, source: io::Error },

    #[error("unsupported input file type '{0}' (plain text only)")]
    UnsupportedSource(String),
}
