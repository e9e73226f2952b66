use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the filter/export pipeline.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Invalid thresholds or conflicting inputs; raised before any file is opened.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Malformed BLAST XML. `record` is the 1-based index of the record being read.
    #[error("malformed BLAST XML in record {record}: {message}")]
    InputParse { record: usize, message: String },

    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FilterError {
    pub fn config(message: impl Into<String>) -> Self {
        FilterError::Configuration(message.into())
    }

    pub fn parse(record: usize, message: impl Into<String>) -> Self {
        FilterError::InputParse {
            record,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
