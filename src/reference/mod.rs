//! Read-only reference data: the eligibility taxonomy and the category/persona collections.
//!
//! Both trees are loaded once from snapshots exported by the relational store and then
//! shared immutably by every compilation.

pub mod collection;
pub mod snapshot;
pub mod taxonomy;

pub use collection::{
    CollectionKind, CollectionNode, CollectionProvider, CollectionRecord, CollectionTree,
};
pub use snapshot::{load_collections, load_taxonomy};
pub use taxonomy::{
    SERVICE_ELIGIBILITY_ROOT, TaxonomyNode, TaxonomyProvider, TaxonomyRecord, TaxonomyTree,
};
