pub mod cli;
pub mod config;
pub mod criteria;
pub mod error;
pub mod query;
pub mod reference;
pub mod tracing;
pub mod types;

pub use config::SearchConfig;
pub use criteria::{SearchCriteria, SearchRequest};
pub use error::{ConfigError, SearchError, SnapshotError};
pub use query::{QueryDocument, ResultOrdering, compile};
pub use reference::{CollectionTree, TaxonomyTree};
pub use types::{GeoPoint, SortOrder, WaitTime};
