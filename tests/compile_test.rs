mod common;

use assert2::{check, let_assert};
use common::{collections, config, taxonomy};
use rstest::rstest;
use service_search::query::{
    BoolQuery, Clause, MatchKind, QueryDocument, ScoringFunction, SortSpec, TermValue, compile,
    fields,
};
use service_search::reference::{CollectionTree, TaxonomyTree};
use service_search::{GeoPoint, SearchConfig, SearchCriteria, SortOrder, WaitTime};

fn compile_with(
    criteria: &SearchCriteria,
    taxonomy: &TaxonomyTree,
    collections: &CollectionTree,
    config: &SearchConfig,
) -> QueryDocument {
    compile(criteria, taxonomy, collections, config).expect("criteria should compile")
}

fn terms(field: &'static str, values: &[&str]) -> Clause {
    Clause::Terms {
        field,
        values: values.iter().map(|value| (*value).to_string()).collect(),
    }
}

fn text_term(field: &'static str, value: &str, boost: Option<f64>) -> Clause {
    Clause::Term {
        field,
        value: TermValue::Text(value.to_string()),
        boost,
    }
}

fn status_filter() -> Clause {
    text_term(fields::STATUS, "active", None)
}

/// Every clause in a scope tree that mentions `needle` as a term value.
fn mentions(query: &BoolQuery, needle: &str) -> usize {
    fn walk(clause: &Clause, needle: &str) -> usize {
        match clause {
            Clause::Term {
                value: TermValue::Text(text),
                ..
            } => usize::from(text == needle),
            Clause::Terms { values, .. } => values.iter().filter(|value| *value == needle).count(),
            Clause::Bool(query) => mentions(query, needle),
            Clause::Nested { query, .. } | Clause::FunctionScore { query, .. } => {
                walk(query, needle)
            }
            _ => 0,
        }
    }
    query
        .must
        .iter()
        .chain(&query.filter)
        .chain(&query.should)
        .map(|clause| walk(clause, needle))
        .sum()
}

fn point(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon).unwrap()
}

// --- Always-applied clauses ---

#[rstest]
#[case(SearchCriteria::builder().build().unwrap())]
#[case(SearchCriteria::builder().query("counselling").build().unwrap())]
#[case(SearchCriteria::builder().category("leisure").is_free(false).build().unwrap())]
#[case(SearchCriteria::builder().location(point(51.5, -0.1)).order(SortOrder::Distance).build().unwrap())]
#[case(SearchCriteria::builder().eligibility("Autism").wait_time(WaitTime::Longer).build().unwrap())]
fn status_filter_always_present(
    #[case] criteria: SearchCriteria,
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    check!(document.query().filter.first() == Some(&status_filter()));
    check!(
        document.functions().last()
            == Some(&ScoringFunction::Popularity {
                field: fields::SCORE
            })
    );
}

#[rstest]
fn compilation_is_deterministic(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder()
        .query("youth club")
        .category("leisure")
        .persona("carers")
        .eligibility("18-25")
        .eligibility("Female")
        .location(point(51.5, -0.1))
        .distance(3)
        .build()
        .unwrap();

    let first = compile_with(&criteria, &taxonomy, &collections, &config);
    let second = compile_with(&criteria, &taxonomy, &collections, &config);

    check!(first == second);
    check!(first.to_dsl() == second.to_dsl());
    check!(first.fingerprint() == second.fingerprint());
}

// --- Free text ---

/// Scenario: text, wait time and cost together.
#[rstest]
fn text_wait_time_and_cost(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder()
        .query("health")
        .wait_time(WaitTime::TwoWeeks)
        .is_free(true)
        .build()
        .unwrap();

    let document = compile_with(&criteria, &taxonomy, &collections, &config);
    let query = document.query();

    check!(
        query
            .filter
            .contains(&terms(fields::WAIT_TIME, &["one_week", "two_weeks"]))
    );
    check!(query.filter.contains(&Clause::Term {
        field: fields::IS_FREE,
        value: TermValue::Bool(true),
        boost: None,
    }));
    check!(query.should.len() >= 12);
    check!(query.should.len() == 15);
    check!(query.minimum_should_match == Some(1));
}

#[rstest]
fn text_boosts_respect_tiers_and_specificity(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder().query("food bank").build().unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    let boost_of = |wanted_field: &str, wanted_kind: MatchKind| {
        document
            .query()
            .should
            .iter()
            .find_map(|clause| match clause {
                Clause::Match {
                    field, kind, boost, ..
                } if *field == wanted_field && *kind == wanted_kind => Some(*boost),
                _ => None,
            })
            .unwrap_or_else(|| panic!("missing {:?} clause on {}", wanted_kind, wanted_field))
    };

    for field in [
        fields::NAME,
        fields::ORGANISATION_NAME,
        fields::INTRO,
        fields::DESCRIPTION,
        fields::TAXONOMY_CATEGORIES,
    ] {
        check!(boost_of(field, MatchKind::Fuzzy) < boost_of(field, MatchKind::AllTerms));
        check!(boost_of(field, MatchKind::AllTerms) < boost_of(field, MatchKind::Phrase));
    }

    let phrase = |field| boost_of(field, MatchKind::Phrase);
    check!(phrase(fields::NAME) == phrase(fields::ORGANISATION_NAME));
    check!(phrase(fields::ORGANISATION_NAME) > phrase(fields::INTRO));
    check!(phrase(fields::INTRO) > phrase(fields::DESCRIPTION));
    check!(phrase(fields::DESCRIPTION) > phrase(fields::TAXONOMY_CATEGORIES));
}

// --- Collections ---

/// Scenario: a category expands to itself and its direct children only.
#[rstest]
fn category_expands_one_level(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder().category("leisure").build().unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    check!(document.query().filter.contains(&terms(
        fields::COLLECTION_CATEGORIES,
        &["arts", "leisure", "sports"]
    )));
    check!(mentions(document.query(), "football") == 0);
    check!(document.query().should.is_empty());
}

#[rstest]
fn categories_union_into_one_filter(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder()
        .category("sports")
        .category("health")
        .build()
        .unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    check!(document.query().filter.contains(&terms(
        fields::COLLECTION_CATEGORIES,
        &["football", "health", "sports"]
    )));
}

#[rstest]
fn persona_filters_by_name(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder()
        .persona("carers")
        .persona("older-people")
        .build()
        .unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    check!(document.query().filter.contains(&terms(
        fields::COLLECTION_PERSONAS,
        &["Carers", "Older People"]
    )));
}

#[rstest]
#[case::unknown_slug("knitting")]
#[case::category_used_as_persona("leisure")]
fn unknown_persona_matches_nothing(
    #[case] slug: &str,
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder().persona(slug).build().unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    check!(
        document
            .query()
            .filter
            .contains(&terms(fields::COLLECTION_PERSONAS, &[]))
    );
}

// --- Eligibility ---

#[rstest]
fn eligibility_filters_per_type(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder()
        .eligibility("18-25")
        .eligibility("Autism")
        .build()
        .unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);
    let query = document.query();

    let type_filter = |name: &str, sentinel: &str| {
        Clause::Bool(BoolQuery {
            should: vec![
                terms(fields::SERVICE_ELIGIBILITIES, &[name]),
                text_term(fields::SERVICE_ELIGIBILITIES, sentinel, None),
            ],
            minimum_should_match: Some(1),
            ..BoolQuery::default()
        })
    };

    check!(
        query.filter
            == vec![
                status_filter(),
                type_filter("18-25", "Age Group All"),
                type_filter("Autism", "Disability All"),
            ]
    );

    let scoring = Clause::Bool(BoolQuery {
        should: vec![
            text_term(fields::SERVICE_ELIGIBILITIES, "Age Group All", Some(0.0)),
            text_term(fields::SERVICE_ELIGIBILITIES, "18-25", Some(1.0)),
            text_term(fields::SERVICE_ELIGIBILITIES, "Disability All", Some(0.0)),
            text_term(fields::SERVICE_ELIGIBILITIES, "Autism", Some(1.0)),
        ],
        ..BoolQuery::default()
    });
    check!(query.must == vec![scoring]);
}

#[rstest]
fn eligibility_skips_unselected_types(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder()
        .eligibility("Autism")
        .build()
        .unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    check!(mentions(document.query(), "Gender All") == 0);
    check!(mentions(document.query(), "Age Group All") == 0);
    check!(mentions(document.query(), "Disability All") == 2);
}

#[rstest]
fn eligibility_values_accumulate_within_a_type(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder()
        .eligibility("Autism")
        .eligibility("Learning Difficulties")
        .build()
        .unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);
    let query = document.query();

    check!(query.filter.contains(&Clause::Bool(BoolQuery {
        should: vec![
            terms(
                fields::SERVICE_ELIGIBILITIES,
                &["Autism", "Learning Difficulties"]
            ),
            text_term(fields::SERVICE_ELIGIBILITIES, "Disability All", None),
        ],
        minimum_should_match: Some(1),
        ..BoolQuery::default()
    })));

    let Some(Clause::Bool(scoring)) = query.must.first() else {
        panic!("expected eligibility scoring scope, got {:?}", query.must);
    };
    let positive = scoring
        .should
        .iter()
        .filter(|clause| matches!(clause, Clause::Term { boost: Some(boost), .. } if *boost > 0.0))
        .count();
    check!(positive == 2);
}

#[rstest]
#[case::outside_eligibility_tree("Health")]
#[case::eligibility_type_itself("Gender")]
#[case::unknown("Retired")]
fn eligibility_outside_types_is_ignored(
    #[case] name: &str,
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder().eligibility(name).build().unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    check!(document.query().filter == vec![status_filter()]);
    check!(document.query().must.is_empty());
}

#[rstest]
fn eligibility_and_text_keep_separate_should_scopes(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder()
        .query("advice")
        .eligibility("Female")
        .build()
        .unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    check!(document.query().should.len() == 15);
    check!(
        document
            .query()
            .should
            .iter()
            .all(|clause| matches!(clause, Clause::Match { .. }))
    );
    check!(document.query().must.len() == 1);
}

// --- Geography ---

/// Scenario: a location without a distance uses the configured default radius.
#[rstest]
fn location_uses_default_radius_and_decay(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let origin = point(51.5, -0.1);
    let criteria = SearchCriteria::builder().location(origin).build().unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    check!(
        document.query().must
            == vec![Clause::Nested {
                path: fields::SERVICE_LOCATIONS,
                query: Box::new(Clause::FunctionScore {
                    query: Box::new(Clause::GeoDistance {
                        field: fields::SERVICE_LOCATION_POINT,
                        origin,
                        miles: config.default_search_distance_miles,
                    }),
                    functions: vec![ScoringFunction::GaussDecay {
                        field: fields::SERVICE_LOCATION_POINT,
                        origin,
                        scale_miles: 1,
                    }],
                }),
            }]
    );
    check!(
        document.functions()
            == [ScoringFunction::Popularity {
                field: fields::SCORE
            }]
    );
    check!(document.sort() == &SortSpec::Relevance);
}

#[rstest]
fn explicit_distance_overrides_default(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder()
        .location(point(51.5, -0.1))
        .distance(2)
        .build()
        .unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    let_assert!([Clause::Nested { query, .. }] = document.query().must.as_slice());
    let_assert!(Clause::FunctionScore { query, .. } = query.as_ref());
    check!(matches!(**query, Clause::GeoDistance { miles: 2, .. }));
}

#[rstest]
fn polygon_is_nested_must(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let points = vec![
        point(51.40, -0.50),
        point(51.50, -0.30),
        point(51.45, -0.20),
    ];
    let criteria = SearchCriteria::builder()
        .polygon(points.clone())
        .build()
        .unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    check!(
        document.query().must
            == vec![Clause::Nested {
                path: fields::SERVICE_LOCATIONS,
                query: Box::new(Clause::GeoPolygon {
                    field: fields::SERVICE_LOCATION_POINT,
                    points,
                }),
            }]
    );
    check!(document.functions().len() == 1);
}

/// Scenario: distance ordering sorts by closest location.
#[rstest]
fn distance_order_sorts_by_geo_distance(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let origin = point(51.5, -0.1);
    let criteria = SearchCriteria::builder()
        .location(origin)
        .order(SortOrder::Distance)
        .build()
        .unwrap();
    let document = compile_with(&criteria, &taxonomy, &collections, &config);

    check!(
        document.sort()
            == &SortSpec::Distance {
                path: fields::SERVICE_LOCATIONS,
                field: fields::SERVICE_LOCATION_POINT,
                origin,
            }
    );

    let dsl = document.to_dsl();
    check!(dsl["sort"][0]["_geo_distance"]["order"] == "asc");
    check!(dsl["sort"][0].get("_score").is_none());
}

// --- Rendering ---

#[rstest]
fn rendered_body_wraps_function_score(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let criteria = SearchCriteria::builder()
        .query("health")
        .location(point(51.5, -0.1))
        .page(2)
        .per_page(10)
        .build()
        .unwrap();
    let dsl = compile_with(&criteria, &taxonomy, &collections, &config).to_dsl();

    check!(dsl["from"] == 10);
    check!(dsl["size"] == 10);
    check!(dsl["sort"][0]["_score"]["order"] == "desc");

    let function_score = &dsl["query"]["function_score"];
    check!(function_score["score_mode"] == "multiply");
    check!(function_score["boost_mode"] == "multiply");
    check!(function_score["functions"].as_array().map(Vec::len) == Some(1));
    check!(function_score["functions"][0].get("script_score").is_some());

    // The decay only sees location values inside the nested scope.
    let nested = &function_score["query"]["bool"]["must"][0]["nested"];
    check!(nested["path"] == "service_locations");
    check!(nested["score_mode"] == "max");
    let decay = &nested["query"]["function_score"]["functions"][0]["gauss"];
    check!(decay["service_locations.location"]["scale"] == "1mi");
    check!(decay["multi_value_mode"] == "min");
    check!(function_score["query"]["bool"]["minimum_should_match"] == 1);
    check!(
        function_score["query"]["bool"]["filter"][0]
            == serde_json::json!({ "term": { "status": "active" } })
    );
}

#[rstest]
fn fingerprint_changes_with_criteria(
    taxonomy: TaxonomyTree,
    collections: CollectionTree,
    config: SearchConfig,
) {
    let free = SearchCriteria::builder().is_free(true).build().unwrap();
    let paid = SearchCriteria::builder().is_free(false).build().unwrap();

    check!(
        compile_with(&free, &taxonomy, &collections, &config).fingerprint()
            != compile_with(&paid, &taxonomy, &collections, &config).fingerprint()
    );
}
