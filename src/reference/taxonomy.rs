//! Taxonomy tree snapshot and the lookups the compiler needs from it.

use super::snapshot::link;
use crate::error::SnapshotError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name of the root whose children are the eligibility types.
pub const SERVICE_ELIGIBILITY_ROOT: &str = "Service Eligibility";

/// A taxonomy row as exported by the relational store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyRecord {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub name: String,
    /// Sibling order
    #[serde(default)]
    pub order: i64,
}

/// A node of the taxonomy arena.
#[derive(Debug, Clone)]
pub struct TaxonomyNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub order: i64,
    children: Vec<usize>,
}

impl TaxonomyNode {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Read-only lookups over the taxonomy used during compilation.
pub trait TaxonomyProvider {
    /// The root named "Service Eligibility", if the snapshot has one.
    fn service_eligibility_root(&self) -> Option<&TaxonomyNode>;

    /// Direct children of a node, in sibling order.
    fn children(&self, id: &str) -> Vec<&TaxonomyNode>;

    /// Ids of every node below `id`, excluding `id` itself.
    fn descendants(&self, id: &str) -> BTreeSet<&str>;

    /// Nodes for the given ids; unknown ids are skipped.
    fn nodes_by_ids<'a>(&'a self, ids: &BTreeSet<&str>) -> Vec<&'a TaxonomyNode>;

    /// Ids of every node whose name is in `names`.
    fn ids_by_names(&self, names: &BTreeSet<String>) -> BTreeSet<&str>;
}

/// Immutable taxonomy forest stored as an arena indexed by id.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyTree {
    nodes: Vec<TaxonomyNode>,
    index: AHashMap<String, usize>,
    roots: Vec<usize>,
}

impl TaxonomyTree {
    /// Link records into a tree, validating that they form a forest.
    pub fn from_records(records: Vec<TaxonomyRecord>) -> Result<Self, SnapshotError> {
        let links = link(
            records
                .iter()
                .map(|record| (record.id.as_str(), record.parent_id.as_deref())),
        )?;

        let mut nodes: Vec<TaxonomyNode> = records
            .into_iter()
            .zip(links.children)
            .map(|(record, children)| TaxonomyNode {
                id: record.id,
                parent_id: record.parent_id,
                name: record.name,
                order: record.order,
                children,
            })
            .collect();

        let sort_keys: Vec<(i64, String)> = nodes
            .iter()
            .map(|node| (node.order, node.name.clone()))
            .collect();
        for node in &mut nodes {
            node.children.sort_by(|a, b| sort_keys[*a].cmp(&sort_keys[*b]));
        }

        let mut roots = links.roots;
        roots.sort_by(|a, b| sort_keys[*a].cmp(&sort_keys[*b]));

        Ok(Self {
            nodes,
            index: links.index,
            roots,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TaxonomyNode> {
        self.index.get(id).map(|position| &self.nodes[*position])
    }

    /// Top-level nodes, in sibling order.
    pub fn roots(&self) -> impl Iterator<Item = &TaxonomyNode> {
        self.roots.iter().map(|position| &self.nodes[*position])
    }
}

impl TaxonomyProvider for TaxonomyTree {
    fn service_eligibility_root(&self) -> Option<&TaxonomyNode> {
        self.roots().find(|node| node.name == SERVICE_ELIGIBILITY_ROOT)
    }

    fn children(&self, id: &str) -> Vec<&TaxonomyNode> {
        self.index
            .get(id)
            .map(|position| {
                self.nodes[*position]
                    .children
                    .iter()
                    .map(|child| &self.nodes[*child])
                    .collect()
            })
            .unwrap_or_default()
    }

    fn descendants(&self, id: &str) -> BTreeSet<&str> {
        let mut found = BTreeSet::new();
        let Some(start) = self.index.get(id) else {
            return found;
        };

        let mut stack: Vec<usize> = self.nodes[*start].children.clone();
        while let Some(position) = stack.pop() {
            let node = &self.nodes[position];
            found.insert(node.id.as_str());
            stack.extend(&node.children);
        }
        found
    }

    fn nodes_by_ids<'a>(&'a self, ids: &BTreeSet<&str>) -> Vec<&'a TaxonomyNode> {
        ids.iter().filter_map(|id| self.get(id)).collect()
    }

    fn ids_by_names(&self, names: &BTreeSet<String>) -> BTreeSet<&str> {
        self.nodes
            .iter()
            .filter(|node| names.contains(&node.name))
            .map(|node| node.id.as_str())
            .collect()
    }
}
