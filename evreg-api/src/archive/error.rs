use thiserror::Error;

/// Failures that abort a bulk archive, restore or purge call.
///
/// Per-row restore conflicts are not errors; they come back as skip entries.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("no ids supplied")]
    EmptyIdSet,
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("schema guard failed on {table}.{column}: {source}")]
    SchemaGuard {
        table: &'static str,
        column: &'static str,
        #[source]
        source: diesel::result::Error,
    },
    #[error("could not synthesize credential: {0}")]
    Credential(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

impl ArchiveError {
    /// True for errors caused by the caller's input rather than the system.
    pub fn is_input_error(&self) -> bool {
        matches!(self, ArchiveError::EmptyIdSet | ArchiveError::InvalidId(_))
    }
}
