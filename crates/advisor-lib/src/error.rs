//! Error taxonomy for the advisor core
//!
//! Failure policy: no single record's failure may abort a batch. Every
//! error here is converted into a status-flagged output record at the
//! orchestrator boundary instead of propagating further.

use thiserror::Error;

/// Errors from a VM configuration supplier
#[derive(Debug, Error)]
pub enum SupplierError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised while processing a single resize job
#[derive(Debug, Error)]
pub enum JobError {
    /// Malformed input record, rejected before processing
    #[error("invalid record: {0}")]
    Validation(String),

    /// The VM configuration could not be supplied
    #[error("snapshot unavailable: {0}")]
    Snapshot(#[from] SupplierError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplier_error_wraps_into_job_error() {
        let err: JobError = SupplierError::NotFound("vm-42".to_string()).into();
        assert!(matches!(err, JobError::Snapshot(SupplierError::NotFound(_))));
        assert!(err.to_string().contains("vm-42"));
    }

    #[test]
    fn test_validation_message() {
        let err = JobError::Validation("empty region".to_string());
        assert_eq!(err.to_string(), "invalid record: empty region");
    }
}
