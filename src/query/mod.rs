//! Search query compilation.
//!
//! Turns validated [`SearchCriteria`](crate::criteria::SearchCriteria) into a
//! [`QueryDocument`]: a boolean query over the service index, a chain of
//! multiplicative scoring functions, and the sort/pagination window.

// Module declarations
pub mod compiler;
pub mod document;
pub mod dsl;
pub mod ordering;
pub mod scoring;

// Public re-exports
pub use compiler::{QueryCompiler, compile};
pub use document::{
    BoolQuery, Clause, MatchKind, QueryDocument, ScoringFunction, SortSpec, TermValue, fields,
};
pub use ordering::{PaginationDefaults, ResolvedOrdering, ResultOrdering};
pub use scoring::popularity_factor;
