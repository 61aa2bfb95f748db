//! Repository trait definitions for database operations.
//!
//! This module provides a collection of focused repository traits that abstract
//! database operations. By splitting responsibilities across multiple traits,
//! implementations can be more focused and testable.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`reference`]: Campuses, buildings, departments and faculty
//! - [`schedule`]: Revisions, the atomic commit, schedules and courses
//! - [`guideline`]: Scheduling guideline records
//!
//! # Convenience Trait Bound
//!
//! For code that needs every capability, use the [`FullRepository`] bound:
//!
//! ```ignore
//! async fn ingest<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let revision = repo.upload_revision("Fall", bytes).await?;
//!     let buildings = repo.list_buildings().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod guideline;
pub mod reference;
pub mod schedule;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use guideline::GuidelineRepository;
pub use reference::ReferenceRepository;
pub use schedule::ScheduleRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements all three
/// repository traits.
pub trait FullRepository: ScheduleRepository + ReferenceRepository + GuidelineRepository {}

impl<T> FullRepository for T where T: ScheduleRepository + ReferenceRepository + GuidelineRepository {}
