//! Shared test fixtures and utilities for integration tests.
//!
//! # Reference data
//!
//! The fixtures model a small directory:
//!
//! - Taxonomy: a "Service Eligibility" root with the types `Age Group`
//!   (`Adults` → `18-25`, `Children`), `Disability` (`Autism`, `Learning Difficulties`)
//!   and `Gender` (`Female`, `Male`), plus an unrelated `Category` root.
//! - Collections: `leisure` with children `sports` and `arts`, `sports` with the
//!   grandchild `football`, a standalone `health` category, and the personas `carers`
//!   and `older-people`.
//!
//! # Available Fixtures
//!
//! - `taxonomy` / `collections`: in-memory snapshots
//! - `config`: default search config
//! - `snapshot_files`: the same snapshots written to a temp directory

use rstest::fixture;
use serde_json::json;
use service_search::SearchConfig;
use service_search::reference::{
    CollectionKind, CollectionRecord, CollectionTree, SERVICE_ELIGIBILITY_ROOT, TaxonomyRecord,
    TaxonomyTree,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn taxonomy_record(id: &str, parent: Option<&str>, name: &str, order: i64) -> TaxonomyRecord {
    TaxonomyRecord {
        id: id.to_string(),
        parent_id: parent.map(String::from),
        name: name.to_string(),
        order,
    }
}

fn collection_record(
    id: &str,
    slug: &str,
    name: &str,
    kind: CollectionKind,
    parent: Option<&str>,
) -> CollectionRecord {
    CollectionRecord {
        id: id.to_string(),
        slug: slug.to_string(),
        name: name.to_string(),
        kind,
        parent_id: parent.map(String::from),
        order: 0,
    }
}

#[allow(dead_code)] // Used across different integration test crates
pub fn taxonomy_records() -> Vec<TaxonomyRecord> {
    vec![
        taxonomy_record("elig", None, SERVICE_ELIGIBILITY_ROOT, 0),
        taxonomy_record("age", Some("elig"), "Age Group", 0),
        taxonomy_record("adults", Some("age"), "Adults", 0),
        taxonomy_record("young-adults", Some("adults"), "18-25", 0),
        taxonomy_record("children", Some("age"), "Children", 1),
        taxonomy_record("disability", Some("elig"), "Disability", 1),
        taxonomy_record("autism", Some("disability"), "Autism", 0),
        taxonomy_record("learning", Some("disability"), "Learning Difficulties", 1),
        taxonomy_record("gender", Some("elig"), "Gender", 2),
        taxonomy_record("female", Some("gender"), "Female", 0),
        taxonomy_record("male", Some("gender"), "Male", 1),
        taxonomy_record("category", None, "Category", 1),
        taxonomy_record("health-tax", Some("category"), "Health", 0),
    ]
}

#[allow(dead_code)] // Used across different integration test crates
pub fn collection_records() -> Vec<CollectionRecord> {
    use CollectionKind::{Category, Persona};
    vec![
        collection_record("c-leisure", "leisure", "Leisure", Category, None),
        collection_record("c-sports", "sports", "Sports", Category, Some("c-leisure")),
        collection_record("c-arts", "arts", "Arts", Category, Some("c-leisure")),
        collection_record("c-football", "football", "Football", Category, Some("c-sports")),
        collection_record("c-health", "health", "Health", Category, None),
        collection_record("p-carers", "carers", "Carers", Persona, None),
        collection_record("p-older", "older-people", "Older People", Persona, None),
    ]
}

#[fixture]
pub fn taxonomy() -> TaxonomyTree {
    TaxonomyTree::from_records(taxonomy_records()).expect("fixture taxonomy is a valid forest")
}

#[fixture]
pub fn collections() -> CollectionTree {
    CollectionTree::from_records(collection_records()).expect("fixture collections are valid")
}

#[fixture]
pub fn config() -> SearchConfig {
    SearchConfig::default()
}

/// Snapshot and config files in a temp directory, removed on drop.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct SnapshotFiles {
    temp: TempDir,
    pub taxonomy: PathBuf,
    pub collections: PathBuf,
    pub config: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl SnapshotFiles {
    /// Write `content` to `name` inside the temp directory.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root().join(name);
        std::fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Failed to write '{}': {}", name, e));
        path
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }
}

#[fixture]
pub fn snapshot_files() -> SnapshotFiles {
    let temp = TempDir::new().expect("Failed to create temp directory");

    let taxonomy = temp.path().join("taxonomy.json");
    let taxonomy_json: Vec<_> = taxonomy_records()
        .into_iter()
        .map(|record| {
            json!({
                "id": record.id,
                "parent_id": record.parent_id,
                "name": record.name,
                "order": record.order
            })
        })
        .collect();
    std::fs::write(&taxonomy, serde_json::to_string(&taxonomy_json).unwrap())
        .expect("Failed to write taxonomy snapshot");

    let collections = temp.path().join("collections.json");
    std::fs::write(
        &collections,
        serde_json::to_string(&collection_records()).unwrap(),
    )
    .expect("Failed to write collection snapshot");

    let config = temp.path().join("config.toml");
    std::fs::write(&config, "default_search_distance_miles = 5\nmax_pagination_results = 50\n")
        .expect("Failed to write config");

    SnapshotFiles {
        temp,
        taxonomy,
        collections,
        config,
    }
}
