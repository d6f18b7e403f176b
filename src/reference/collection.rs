//! Category and persona collections used for discovery facets.

use super::snapshot::link;
use crate::error::SnapshotError;
use ahash::AHashMap;
use rapidfuzz::distance::jaro_winkler;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Minimum Jaro-Winkler similarity for a slug to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Category,
    Persona,
}

/// A collection row as exported by the relational store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CollectionKind,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub order: i64,
}

/// A node of the collection arena.
#[derive(Debug, Clone)]
pub struct CollectionNode {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub kind: CollectionKind,
    pub parent_id: Option<String>,
    pub order: i64,
    children: Vec<usize>,
}

/// Read-only lookups over collections used during compilation.
pub trait CollectionProvider {
    fn resolve_by_slug(&self, slug: &str) -> Option<&CollectionNode>;

    /// Slugs of the direct children of `id`. Grandchildren are never included.
    fn child_slugs(&self, id: &str) -> BTreeSet<&str>;

    /// Names of the collections of `kind` whose slug is in `slugs`; unknown slugs are skipped.
    fn names_by_slug(&self, slugs: &BTreeSet<String>, kind: CollectionKind) -> Vec<&str>;

    /// The closest known slug of `kind`, if one is similar enough to be a likely typo.
    fn suggest(&self, slug: &str, kind: CollectionKind) -> Option<&str>;
}

/// Immutable collection forest stored as an arena indexed by id and slug.
#[derive(Debug, Clone, Default)]
pub struct CollectionTree {
    nodes: Vec<CollectionNode>,
    index: AHashMap<String, usize>,
    slugs: AHashMap<String, usize>,
}

impl CollectionTree {
    /// Link records into a tree, validating ids, parents and slug uniqueness.
    pub fn from_records(records: Vec<CollectionRecord>) -> Result<Self, SnapshotError> {
        let links = link(
            records
                .iter()
                .map(|record| (record.id.as_str(), record.parent_id.as_deref())),
        )?;

        let mut slugs = AHashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if slugs.insert(record.slug.clone(), position).is_some() {
                return Err(SnapshotError::DuplicateSlug(record.slug.clone()));
            }
        }

        let mut nodes: Vec<CollectionNode> = records
            .into_iter()
            .zip(links.children)
            .map(|(record, children)| CollectionNode {
                id: record.id,
                slug: record.slug,
                name: record.name,
                kind: record.kind,
                parent_id: record.parent_id,
                order: record.order,
                children,
            })
            .collect();

        let sort_keys: Vec<(i64, String)> = nodes
            .iter()
            .map(|node| (node.order, node.slug.clone()))
            .collect();
        for node in &mut nodes {
            node.children.sort_by(|a, b| sort_keys[*a].cmp(&sort_keys[*b]));
        }

        Ok(Self {
            nodes,
            index: links.index,
            slugs,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CollectionNode> {
        self.index.get(id).map(|position| &self.nodes[*position])
    }

    /// Number of collections of the given kind.
    pub fn count_of(&self, kind: CollectionKind) -> usize {
        self.nodes.iter().filter(|node| node.kind == kind).count()
    }
}

impl CollectionProvider for CollectionTree {
    fn resolve_by_slug(&self, slug: &str) -> Option<&CollectionNode> {
        self.slugs.get(slug).map(|position| &self.nodes[*position])
    }

    fn child_slugs(&self, id: &str) -> BTreeSet<&str> {
        self.get(id)
            .map(|node| {
                node.children
                    .iter()
                    .map(|child| self.nodes[*child].slug.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn names_by_slug(&self, slugs: &BTreeSet<String>, kind: CollectionKind) -> Vec<&str> {
        slugs
            .iter()
            .filter_map(|slug| self.resolve_by_slug(slug))
            .filter(|node| node.kind == kind)
            .map(|node| node.name.as_str())
            .collect()
    }

    fn suggest(&self, slug: &str, kind: CollectionKind) -> Option<&str> {
        self.nodes
            .iter()
            .filter(|node| node.kind == kind)
            .map(|node| {
                let score = jaro_winkler::similarity(slug.chars(), node.slug.chars());
                (node.slug.as_str(), score)
            })
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|(a_slug, a), (b_slug, b)| a.total_cmp(b).then_with(|| b_slug.cmp(a_slug)))
            .map(|(slug, _)| slug)
    }
}
