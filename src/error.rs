use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Everything that can abort a conversion run.
///
/// Soft conditions (entries without a headword, unmapped word classes, a
/// single term bank failing to write) are reported through stats and logs
/// instead and never surface here.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed XML near byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("failed to parse POS schema: {0}")]
    Schema(#[from] serde_yaml::Error),

    #[error("failed to serialize {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ConvertError {
    /// Adapter for `map_err` on I/O results that records what was being done to which file.
    pub(crate) fn io<'a>(
        action: &'static str,
        path: &'a Path,
    ) -> impl FnOnce(io::Error) -> Self + 'a {
        move |source| ConvertError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
