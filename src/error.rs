use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Returned by accessors that need at least one retained snapshot.
    #[error("no reports available")]
    ErrNoReportsAvailable,
    /// Returned by `Exporter::add_report` when an incoming snapshot breaks a
    /// sequence invariant. The snapshot is rejected and the sequence is left
    /// unchanged.
    #[error("schema violation: {0}")]
    ErrSchemaViolation(String),
}
