//! Typed query tree produced by the compiler.
//!
//! Every clause maps 1:1 onto a primitive of the index query DSL (see [`super::dsl`]),
//! so the compiler never builds queries by string path.

use crate::types::GeoPoint;

/// Field names of the denormalised service documents in the index.
pub mod fields {
    pub const STATUS: &str = "status";
    pub const NAME: &str = "name";
    pub const ORGANISATION_NAME: &str = "organisation_name";
    pub const INTRO: &str = "intro";
    pub const DESCRIPTION: &str = "description";
    pub const TAXONOMY_CATEGORIES: &str = "taxonomy_categories";
    pub const COLLECTION_CATEGORIES: &str = "collection_categories";
    pub const COLLECTION_PERSONAS: &str = "collection_personas";
    pub const WAIT_TIME: &str = "wait_time";
    pub const IS_FREE: &str = "is_free";
    pub const SCORE: &str = "score";
    pub const SERVICE_ELIGIBILITIES: &str = "service_eligibilities";
    pub const SERVICE_LOCATIONS: &str = "service_locations";
    pub const SERVICE_LOCATION_POINT: &str = "service_locations.location";
}

/// Value of the only status that is ever searchable.
pub const STATUS_ACTIVE: &str = "active";

/// Scalar compared by a `term` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum TermValue {
    Text(String),
    Bool(bool),
}

/// How a full-text `match` clause treats the query terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Any term, tolerant to edit-distance typos
    Fuzzy,
    /// Every term must be present
    AllTerms,
    /// Terms must appear as an exact phrase
    Phrase,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Term {
        field: &'static str,
        value: TermValue,
        boost: Option<f64>,
    },
    Terms {
        field: &'static str,
        values: Vec<String>,
    },
    Match {
        field: &'static str,
        query: String,
        kind: MatchKind,
        boost: f64,
    },
    /// Runs `query` against each object of a nested array field. A parent scores as
    /// its best-matching object.
    Nested {
        path: &'static str,
        query: Box<Clause>,
    },
    /// Replaces the score of `query` with the product of `functions`.
    ///
    /// Used inside [`Clause::Nested`] so functions over nested fields see the nested
    /// objects' values.
    FunctionScore {
        query: Box<Clause>,
        functions: Vec<ScoringFunction>,
    },
    GeoPolygon {
        field: &'static str,
        points: Vec<GeoPoint>,
    },
    GeoDistance {
        field: &'static str,
        origin: GeoPoint,
        miles: u32,
    },
    Bool(BoolQuery),
}

/// One boolean scope: hard `must`/`filter` constraints and score-contributing `should`s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Clause>,
    pub filter: Vec<Clause>,
    pub should: Vec<Clause>,
    pub minimum_should_match: Option<u32>,
}

/// A multiplicative post-processing step applied to the boolean relevance score.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringFunction {
    /// `(value_or_zero + 1) * 0.1 + 1` over the stored popularity `field`.
    Popularity { field: &'static str },
    /// Gaussian decay by distance from `origin` over a geo field.
    GaussDecay {
        field: &'static str,
        origin: GeoPoint,
        scale_miles: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortSpec {
    /// Computed relevance, descending
    Relevance,
    /// Closest service location first
    Distance {
        path: &'static str,
        field: &'static str,
        origin: GeoPoint,
    },
}

/// The compiled search: boolean query, scoring functions, sort and window.
///
/// Each compilation produces a fresh value; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDocument {
    query: BoolQuery,
    functions: Vec<ScoringFunction>,
    sort: SortSpec,
    from: u64,
    size: u64,
}

impl QueryDocument {
    pub(crate) const fn new(
        query: BoolQuery,
        functions: Vec<ScoringFunction>,
        sort: SortSpec,
        from: u64,
        size: u64,
    ) -> Self {
        Self {
            query,
            functions,
            sort,
            from,
            size,
        }
    }

    /// The root boolean scope.
    pub const fn query(&self) -> &BoolQuery {
        &self.query
    }

    pub fn functions(&self) -> &[ScoringFunction] {
        &self.functions
    }

    pub const fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub const fn from(&self) -> u64 {
        self.from
    }

    pub const fn size(&self) -> u64 {
        self.size
    }
}
