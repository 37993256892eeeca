use crate::{descriptor, io};
use ndarray_npy::{ReadNpzError, WriteNpzError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from sample processing and normalization.
///
/// Every variant is fatal to the run: the pipeline has no per-sample
/// isolation, retries or partial results.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "no supported raw format found in sample '{0}' \
         (expected geometry.in.next_step or lmp.data.relax)"
    )]
    NoRawFormat(PathBuf),

    #[error("sample '{0}' carries more than one raw format marker; remove all but one")]
    AmbiguousRawFormat(PathBuf),

    #[error("failed to convert '{path}': {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: io::error::Error,
    },

    #[error("descriptor computation failed: {0}")]
    Descriptor(#[from] descriptor::Error),

    #[error("missing descriptor file for sample '{0}'; run descriptor generation first")]
    MissingDescriptor(PathBuf),

    #[error("failed to read descriptor archive '{path}': {source}")]
    NpzRead {
        path: PathBuf,
        #[source]
        source: ReadNpzError,
    },

    #[error("failed to write array archive '{path}': {source}")]
    NpzWrite {
        path: PathBuf,
        #[source]
        source: WriteNpzError,
    },

    #[error("sample set is empty; nothing to aggregate")]
    EmptySampleSet,
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(path: impl Into<PathBuf>, source: io::error::Error) -> Self {
        Self::Format {
            path: path.into(),
            source,
        }
    }
}
