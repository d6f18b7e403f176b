//! Compiles validated search criteria into a weighted boolean query with scoring functions.

use super::document::{
    BoolQuery, Clause, QueryDocument, STATUS_ACTIVE, ScoringFunction, TermValue, fields,
};
use super::ordering::{PaginationDefaults, ResultOrdering};
use super::scoring::{
    DISTANCE_DECAY_SCALE_MILES, ELIGIBILITY_MATCH_BOOST, ELIGIBILITY_SENTINEL_BOOST, MATCH_KINDS,
    TEXT_FIELDS, eligibility_sentinel, match_boost,
};
use crate::config::SearchConfig;
use crate::criteria::SearchCriteria;
use crate::error::SearchError;
use crate::reference::{CollectionKind, CollectionProvider, TaxonomyProvider};
use crate::types::GeoPoint;
use std::collections::BTreeSet;

/// Compile `criteria` against reference snapshots into a ready-to-submit query.
///
/// Pure and deterministic: the same criteria and snapshots always produce the same
/// document, and neither snapshot is modified.
pub fn compile<T, C>(
    criteria: &SearchCriteria,
    taxonomy: &T,
    collections: &C,
    config: &SearchConfig,
) -> Result<QueryDocument, SearchError>
where
    T: TaxonomyProvider + ?Sized,
    C: CollectionProvider + ?Sized,
{
    QueryCompiler::new(taxonomy, collections, config).compile(criteria)
}

/// Borrows the reference snapshots and config for the duration of one or more compilations.
pub struct QueryCompiler<'a, T: ?Sized, C: ?Sized> {
    taxonomy: &'a T,
    collections: &'a C,
    config: &'a SearchConfig,
}

impl<'a, T, C> QueryCompiler<'a, T, C>
where
    T: TaxonomyProvider + ?Sized,
    C: CollectionProvider + ?Sized,
{
    pub const fn new(taxonomy: &'a T, collections: &'a C, config: &'a SearchConfig) -> Self {
        Self {
            taxonomy,
            collections,
            config,
        }
    }

    pub fn compile(&self, criteria: &SearchCriteria) -> Result<QueryDocument, SearchError> {
        let mut query = BoolQuery::default();

        query.filter.push(Clause::Term {
            field: fields::STATUS,
            value: TermValue::Text(STATUS_ACTIVE.to_string()),
            boost: None,
        });

        if let Some(text) = criteria.query() {
            Self::apply_text(&mut query, text);
        }
        if !criteria.category_slugs().is_empty() {
            self.apply_categories(&mut query, criteria.category_slugs());
        }
        if !criteria.persona_slugs().is_empty() {
            self.apply_personas(&mut query, criteria.persona_slugs());
        }
        if let Some(wait_time) = criteria.wait_time() {
            query.filter.push(Clause::Terms {
                field: fields::WAIT_TIME,
                values: wait_time
                    .cumulative()
                    .iter()
                    .map(|bucket| bucket.as_str().to_string())
                    .collect(),
            });
        }
        if let Some(is_free) = criteria.is_free() {
            query.filter.push(Clause::Term {
                field: fields::IS_FREE,
                value: TermValue::Bool(is_free),
                boost: None,
            });
        }
        if !criteria.eligibility_names().is_empty() {
            self.apply_eligibilities(&mut query, criteria.eligibility_names());
        }
        if let Some(polygon) = criteria.polygon() {
            query.must.push(Clause::Nested {
                path: fields::SERVICE_LOCATIONS,
                query: Box::new(Clause::GeoPolygon {
                    field: fields::SERVICE_LOCATION_POINT,
                    points: polygon.to_vec(),
                }),
            });
        }
        if let Some(origin) = criteria.location() {
            let miles = criteria
                .distance()
                .unwrap_or(self.config.default_search_distance_miles);
            Self::apply_radius(&mut query, origin, miles);
        }

        let functions = vec![ScoringFunction::Popularity {
            field: fields::SCORE,
        }];

        let ordering = ResultOrdering::resolve(criteria, PaginationDefaults::from(self.config))?;

        tracing::debug!(
            "Compiled query: {} filter, {} must, {} should clauses, {} scoring functions",
            query.filter.len(),
            query.must.len(),
            query.should.len(),
            functions.len()
        );

        Ok(QueryDocument::new(
            query,
            functions,
            ordering.sort,
            ordering.from,
            ordering.size,
        ))
    }

    /// Three clauses per text field of increasing specificity; at least one must match.
    fn apply_text(query: &mut BoolQuery, text: &str) {
        for (field, base) in TEXT_FIELDS {
            for kind in MATCH_KINDS {
                query.should.push(Clause::Match {
                    field,
                    query: text.to_string(),
                    kind,
                    boost: match_boost(base, kind),
                });
            }
        }
        query.minimum_should_match = Some(1);
    }

    /// Each category matches itself and its direct children.
    fn apply_categories(&self, query: &mut BoolQuery, slugs: &BTreeSet<String>) {
        let mut candidates: BTreeSet<String> = BTreeSet::new();

        for slug in slugs {
            match self
                .collections
                .resolve_by_slug(slug)
                .filter(|node| node.kind == CollectionKind::Category)
            {
                Some(node) => {
                    candidates.insert(node.slug.clone());
                    candidates.extend(
                        self.collections
                            .child_slugs(&node.id)
                            .into_iter()
                            .map(String::from),
                    );
                }
                None => self.report_unknown_slug(slug, CollectionKind::Category),
            }
        }

        tracing::debug!("Category filter expanded to {} slugs", candidates.len());

        // An empty set matches nothing.
        query.filter.push(Clause::Terms {
            field: fields::COLLECTION_CATEGORIES,
            values: candidates.into_iter().collect(),
        });
    }

    fn apply_personas(&self, query: &mut BoolQuery, slugs: &BTreeSet<String>) {
        for slug in slugs {
            let known = self
                .collections
                .resolve_by_slug(slug)
                .is_some_and(|node| node.kind == CollectionKind::Persona);
            if !known {
                self.report_unknown_slug(slug, CollectionKind::Persona);
            }
        }

        let names = self
            .collections
            .names_by_slug(slugs, CollectionKind::Persona);

        query.filter.push(Clause::Terms {
            field: fields::COLLECTION_PERSONAS,
            values: names.into_iter().map(String::from).collect(),
        });
    }

    /// Filter per eligibility type, plus score terms for specific values.
    ///
    /// A type none of whose descendants were selected contributes nothing. For the rest,
    /// a service qualifies through a selected value or the type's "<type> All" catch-all;
    /// only the specific values add to the score.
    fn apply_eligibilities(&self, query: &mut BoolQuery, names: &BTreeSet<String>) {
        let Some(root) = self.taxonomy.service_eligibility_root() else {
            tracing::warn!(
                "Ignoring {} eligibility filters: taxonomy has no eligibility root",
                names.len()
            );
            return;
        };

        let selected = self.taxonomy.ids_by_names(names);
        let mut scoring = BoolQuery::default();
        let mut matched_names: BTreeSet<&str> = BTreeSet::new();

        for kind in self.taxonomy.children(&root.id) {
            let descendants = self.taxonomy.descendants(&kind.id);
            let matched: BTreeSet<&str> = selected.intersection(&descendants).copied().collect();
            if matched.is_empty() {
                continue;
            }

            let values: BTreeSet<&str> = self
                .taxonomy
                .nodes_by_ids(&matched)
                .into_iter()
                .map(|node| node.name.as_str())
                .collect();
            let sentinel = eligibility_sentinel(&kind.name);

            query.filter.push(Clause::Bool(BoolQuery {
                should: vec![
                    Clause::Terms {
                        field: fields::SERVICE_ELIGIBILITIES,
                        values: values.iter().map(|value| (*value).to_string()).collect(),
                    },
                    Clause::Term {
                        field: fields::SERVICE_ELIGIBILITIES,
                        value: TermValue::Text(sentinel.clone()),
                        boost: None,
                    },
                ],
                minimum_should_match: Some(1),
                ..BoolQuery::default()
            }));

            scoring.should.push(Clause::Term {
                field: fields::SERVICE_ELIGIBILITIES,
                value: TermValue::Text(sentinel),
                boost: Some(ELIGIBILITY_SENTINEL_BOOST),
            });
            for value in &values {
                scoring.should.push(Clause::Term {
                    field: fields::SERVICE_ELIGIBILITIES,
                    value: TermValue::Text((*value).to_string()),
                    boost: Some(ELIGIBILITY_MATCH_BOOST),
                });
            }

            tracing::debug!(
                "Eligibility type '{}' matched {} values",
                kind.name,
                values.len()
            );
            matched_names.extend(values);
        }

        let unknown: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|name| !matched_names.contains(name))
            .collect();
        if !unknown.is_empty() {
            tracing::warn!("Unknown eligibility values ignored: {}", unknown.join(", "));
        }

        // Every type filtered in above guarantees one of these terms matches, so the
        // scope only adds score. Keeping it under `must` stops it from satisfying the
        // free-text minimum_should_match.
        if !scoring.should.is_empty() {
            query.must.push(Clause::Bool(scoring));
        }
    }

    /// Locations within the radius, each scored by its distance decay from `origin`.
    ///
    /// The decay runs inside the nested scope, where location values exist, and the
    /// service keeps the score of its closest location.
    fn apply_radius(query: &mut BoolQuery, origin: GeoPoint, miles: u32) {
        query.must.push(Clause::Nested {
            path: fields::SERVICE_LOCATIONS,
            query: Box::new(Clause::FunctionScore {
                query: Box::new(Clause::GeoDistance {
                    field: fields::SERVICE_LOCATION_POINT,
                    origin,
                    miles,
                }),
                functions: vec![ScoringFunction::GaussDecay {
                    field: fields::SERVICE_LOCATION_POINT,
                    origin,
                    scale_miles: DISTANCE_DECAY_SCALE_MILES,
                }],
            }),
        });
    }

    /// Unknown slugs are a "nothing matches" facet, not a malformed request.
    fn report_unknown_slug(&self, slug: &str, kind: CollectionKind) {
        match self.collections.suggest(slug, kind) {
            Some(suggestion) => tracing::warn!(
                "Unknown {:?} slug '{}' (did you mean '{}'?)",
                kind,
                slug,
                suggestion
            ),
            None => tracing::warn!("Unknown {:?} slug '{}'", kind, slug),
        }
    }
}
