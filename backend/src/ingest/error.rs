//! Failure taxonomy for ingestion requests.

use thiserror::Error;

use super::sheet::SheetError;
use super::validator::{FieldError, RowValidationError};
use crate::api::RevisionId;
use crate::db::repository::RepositoryError;

pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The revision does not exist or has already left onboarding.
    #[error("revision {revision_id} is not available for ingestion: {reason}")]
    InputAbsent {
        revision_id: RevisionId,
        reason: String,
    },

    #[error("spreadsheet has no sheets")]
    SheetEmpty,

    #[error("spreadsheet could not be read: {0}")]
    SheetUnreadable(#[from] SheetError),

    #[error(transparent)]
    RowValidation(#[from] RowValidationError),

    /// The commit transaction failed and was rolled back.
    #[error("commit failed: {0}")]
    Transaction(#[source] RepositoryError),

    /// A read against the store failed before the commit.
    #[error("repository error: {0}")]
    Repository(#[source] RepositoryError),
}

impl IngestError {
    pub fn input_absent(revision_id: RevisionId, reason: impl Into<String>) -> Self {
        Self::InputAbsent {
            revision_id,
            reason: reason.into(),
        }
    }

    /// Field-level detail for a rejected row; empty for every other failure.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::RowValidation(err) => &err.errors,
            _ => &[],
        }
    }

    pub fn is_input_absent(&self) -> bool {
        matches!(self, Self::InputAbsent { .. })
    }
}

impl From<RepositoryError> for IngestError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}
