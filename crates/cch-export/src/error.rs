use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::exporter::Format;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0} format not yet implemented")]
    Unsupported(Format),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
