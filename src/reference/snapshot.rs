//! Loading reference data snapshots from disk and linking them into arenas.

use super::collection::{CollectionRecord, CollectionTree};
use super::taxonomy::{TaxonomyRecord, TaxonomyTree};
use crate::error::SnapshotError;
use ahash::AHashMap;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Parent/child links for an arena of nodes, addressed by position.
#[derive(Debug, Default)]
pub(crate) struct Links {
    /// Node id to arena position
    pub(crate) index: AHashMap<String, usize>,
    /// Arena position to child positions
    pub(crate) children: Vec<Vec<usize>>,
    /// Positions of nodes without a parent
    pub(crate) roots: Vec<usize>,
}

/// Link `(id, parent_id)` pairs into a forest.
///
/// Rejects duplicate ids, parents that do not exist, and cycles. Any node that
/// cannot be reached from a root after linking must sit on a cycle, since every
/// parent reference is known to resolve.
pub(crate) fn link<'a, I>(nodes: I) -> Result<Links, SnapshotError>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let pairs: Vec<(&str, Option<&str>)> = nodes.into_iter().collect();

    let mut index = AHashMap::with_capacity(pairs.len());
    for (position, (id, _)) in pairs.iter().enumerate() {
        if index.insert((*id).to_string(), position).is_some() {
            return Err(SnapshotError::DuplicateId((*id).to_string()));
        }
    }

    let mut children = vec![Vec::new(); pairs.len()];
    let mut roots = Vec::new();
    for (position, (id, parent)) in pairs.iter().enumerate() {
        match parent {
            Some(parent_id) => {
                let parent_position =
                    *index
                        .get(*parent_id)
                        .ok_or_else(|| SnapshotError::DanglingParent {
                            node: (*id).to_string(),
                            parent: (*parent_id).to_string(),
                        })?;
                children[parent_position].push(position);
            }
            None => roots.push(position),
        }
    }

    let mut reached = vec![false; pairs.len()];
    let mut stack = roots.clone();
    while let Some(position) = stack.pop() {
        if !reached[position] {
            reached[position] = true;
            stack.extend(&children[position]);
        }
    }

    if let Some(position) = reached.iter().position(|seen| !seen) {
        return Err(SnapshotError::Cycle(pairs[position].0.to_string()));
    }

    Ok(Links {
        index,
        children,
        roots,
    })
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a taxonomy snapshot: a JSON array of `{id, parent_id, name, order}`.
pub fn load_taxonomy(path: &Path) -> Result<TaxonomyTree, SnapshotError> {
    let records: Vec<TaxonomyRecord> = read_records(path)?;
    let tree = TaxonomyTree::from_records(records)?;
    tracing::debug!(
        "Loaded {} taxonomy nodes from {}",
        tree.len(),
        path.display()
    );
    Ok(tree)
}

/// Load a collection snapshot: a JSON array of `{id, slug, name, type, parent_id, order}`.
pub fn load_collections(path: &Path) -> Result<CollectionTree, SnapshotError> {
    let records: Vec<CollectionRecord> = read_records(path)?;
    let tree = CollectionTree::from_records(records)?;
    tracing::debug!(
        "Loaded {} collections from {}",
        tree.len(),
        path.display()
    );
    Ok(tree)
}
