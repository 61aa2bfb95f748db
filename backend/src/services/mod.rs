//! Service layer for read-side business logic.
//!
//! Services sit between the repository layer and the HTTP handlers. They load
//! persisted courses and guidelines through the repository traits and derive
//! query-time results such as conformance and paged guideline searches.

pub mod conformance;
pub mod guidelines;

pub use conformance::{
    AnyLocationTimeMatch, ConformanceMatcher, ConformancePolicy, ConformanceResult,
    CourseConformance, ExhaustiveTimeMatch,
};
pub use guidelines::{
    paginate_guidelines, search_guidelines, GuidelinePage, GuidelineQuery, GuidelineView,
    TimeWindowView,
};
