use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run. Malformed markup never ends up here; it is skipped
/// where it is found.
#[derive(Debug, Error)]
pub enum EtymologyError {
    /// Reading the dump, a relations file or writing output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The language table file exists but is not valid YAML for the schema.
    #[error("failed to parse language table {path:?}: {source}")]
    LanguageTable {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No language table file was found at any of the candidate locations.
    #[error("could not find {0}. Use --languages to specify path.")]
    LanguageTableNotFound(String),

    /// A record could not be encoded as JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EtymologyError>;
