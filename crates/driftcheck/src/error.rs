use driftcheck_schema::ModelError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the collaborators that build the two schema models.
///
/// The diff engine itself cannot fail; every variant here means the
/// comparison could not run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("failed to read expected schema {}: {source}", path.display())]
    ReadExpected {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse expected schema {origin}: {message}")]
    ParseExpected { origin: String, message: String },

    #[error("invalid schema model: {0}")]
    Model(#[from] ModelError),

    #[error("failed to serialize report: {0}")]
    Serialize(String),
}
