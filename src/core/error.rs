//! Error types for table updates and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while applying server messages or loading configuration.
///
/// A board update that fails validation is aborted as a whole; the table keeps
/// its previous state until the next valid update arrives.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("board update is missing `{field}`")]
    MissingField { field: &'static str },

    #[error("`{field}` has {got} entries but player_order has {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("no room is set up")]
    NoRoom,

    #[error("unknown player `{name}`")]
    UnknownPlayer { name: String },

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
