//! Ingestion pipeline orchestration.
//!
//! A revision moves through the stages in a fixed order:
//!
//! 1. load the stored spreadsheet bytes of an onboarding revision
//! 2. decode the first sheet
//! 3. project rows through the column mapping
//! 4. resolve building and faculty references, rows concurrently
//! 5. validate rows top to bottom, stopping at the first rejected row
//! 6. in commit mode, write schedule, revision update and courses in one
//!    transaction
//!
//! Verification runs stages 1-5 only and never writes.

use std::sync::Arc;

use super::columns::{project_rows, ColumnMapping};
use super::error::{IngestError, IngestResult};
use super::resolver::resolve_rows;
use super::sheet::{CalamineDecoder, SheetError, WorkbookDecoder};
use super::validator::{validate_batch, ValidationRules};
use crate::api::{CanonicalCourseRow, CommitReceipt, IngestionBatch, RevisionId};
use crate::db::repository::FullRepository;

/// What to do once every row has validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestMode {
    VerifyOnly,
    Commit { name: String },
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Verified(Vec<CanonicalCourseRow>),
    Committed(CommitReceipt),
}

#[derive(Clone)]
pub struct IngestionPipeline {
    repository: Arc<dyn FullRepository>,
    decoder: Arc<dyn WorkbookDecoder>,
    rules: ValidationRules,
}

impl IngestionPipeline {
    /// Pipeline over `repository` using the calamine decoder and default rules.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            decoder: Arc::new(CalamineDecoder),
            rules: ValidationRules::default(),
        }
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn WorkbookDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Run the pipeline through validation without writing anything.
    ///
    /// Repeated calls with the same revision and mapping return the same rows.
    pub async fn verify_organized_columns(
        &self,
        revision_id: RevisionId,
        mapping: &ColumnMapping,
    ) -> IngestResult<Vec<CanonicalCourseRow>> {
        self.prepare(revision_id, mapping).await
    }

    /// Run the full pipeline and commit the batch under `name`.
    pub async fn create_schedule_revision(
        &self,
        revision_id: RevisionId,
        mapping: &ColumnMapping,
        name: &str,
    ) -> IngestResult<CommitReceipt> {
        let courses = self.prepare(revision_id, mapping).await?;
        let batch = IngestionBatch {
            revision_id,
            schedule_name: name.to_string(),
            courses,
        };

        let receipt = self.repository.commit_batch(&batch).await.map_err(|err| {
            if err.is_conflict() {
                IngestError::input_absent(revision_id, err.to_string())
            } else {
                IngestError::Transaction(err)
            }
        })?;

        log::info!(
            "Committed revision {} as schedule {} ('{}') with {} courses",
            revision_id,
            receipt.schedule_id,
            name,
            receipt.course_count()
        );
        Ok(receipt)
    }

    /// Dispatch on `mode`.
    pub async fn run(
        &self,
        revision_id: RevisionId,
        mapping: &ColumnMapping,
        mode: IngestMode,
    ) -> IngestResult<IngestOutcome> {
        match mode {
            IngestMode::VerifyOnly => self
                .verify_organized_columns(revision_id, mapping)
                .await
                .map(IngestOutcome::Verified),
            IngestMode::Commit { name } => self
                .create_schedule_revision(revision_id, mapping, &name)
                .await
                .map(IngestOutcome::Committed),
        }
    }

    async fn prepare(
        &self,
        revision_id: RevisionId,
        mapping: &ColumnMapping,
    ) -> IngestResult<Vec<CanonicalCourseRow>> {
        let revision = self
            .repository
            .get_revision(revision_id)
            .await?
            .ok_or_else(|| IngestError::input_absent(revision_id, "revision not found"))?;
        if !revision.onboarding {
            return Err(IngestError::input_absent(
                revision_id,
                "revision is no longer onboarding",
            ));
        }

        let bytes = self
            .repository
            .load_revision_sheet(revision_id)
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    IngestError::input_absent(revision_id, "no spreadsheet stored")
                } else {
                    IngestError::Repository(err)
                }
            })?;
        log::debug!("Loaded {} spreadsheet bytes for revision {}", bytes.len(), revision_id);

        let decoder = Arc::clone(&self.decoder);
        let sheet = tokio::task::spawn_blocking(move || decoder.first_sheet(&bytes))
            .await
            .map_err(|e| SheetError::Read(format!("decoder task failed: {}", e)))??
            .ok_or(IngestError::SheetEmpty)?;
        log::debug!("Decoded sheet with {} rows", sheet.row_count());

        let rows = project_rows(&sheet, mapping);
        log::debug!("Projected {} non-blank rows", rows.len());

        let drafts = resolve_rows(self.repository.as_ref(), &rows).await?;
        log::debug!("Resolved references for {} rows", drafts.len());

        let courses = validate_batch(&drafts, &self.rules)?;
        log::debug!("Validated {} rows for revision {}", courses.len(), revision_id);

        Ok(courses)
    }
}
