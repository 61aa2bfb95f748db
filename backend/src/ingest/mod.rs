//! Spreadsheet ingestion: sheet → mapped rows → resolved drafts →
//! validated rows → transactional commit.
//!
//! - `sheet`: workbook decoding to [`RawSheet`]
//! - `columns`: column mapping and row projection
//! - `resolver`: building and faculty resolution with raw-text fallback
//! - `validator`: structural row validation
//! - `pipeline`: stage orchestration for verify and commit

pub mod columns;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod sheet;
pub mod validator;

pub use columns::{project_rows, ColumnMapping, ColumnTarget, CourseField, MappedRow};
pub use error::{IngestError, IngestResult};
pub use pipeline::{IngestMode, IngestOutcome, IngestionPipeline};
pub use resolver::{resolve_row, resolve_rows, split_cell};
pub use sheet::{CalamineDecoder, RawSheet, SheetError, WorkbookDecoder};
pub use validator::{
    validate_batch, validate_row, Bounds, FieldError, RowValidationError, ValidationRules,
};
