//! Rendering of compiled queries into the index's JSON query DSL.

use super::document::{
    BoolQuery, Clause, MatchKind, QueryDocument, ScoringFunction, SortSpec, TermValue,
};
use super::scoring::popularity_script;
use crate::types::GeoPoint;
use serde_json::{Map, Value, json};
use xxhash_rust::xxh3::xxh3_64;

/// `{key: value}` with a runtime key.
fn keyed(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

fn point(point: GeoPoint) -> Value {
    json!({ "lat": point.lat, "lon": point.lon })
}

fn miles(miles: u32) -> String {
    format!("{miles}mi")
}

impl TermValue {
    fn to_dsl(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Bool(flag) => Value::Bool(*flag),
        }
    }
}

impl Clause {
    pub fn to_dsl(&self) -> Value {
        match self {
            Self::Term {
                field,
                value,
                boost: None,
            } => keyed("term", keyed(field, value.to_dsl())),
            Self::Term {
                field,
                value,
                boost: Some(boost),
            } => keyed(
                "term",
                keyed(field, json!({ "value": value.to_dsl(), "boost": boost })),
            ),
            Self::Terms { field, values } => keyed("terms", keyed(field, json!(values))),
            Self::Match {
                field,
                query,
                kind,
                boost,
            } => match kind {
                MatchKind::Fuzzy => keyed(
                    "match",
                    keyed(
                        field,
                        json!({ "query": query, "boost": boost, "fuzziness": "AUTO" }),
                    ),
                ),
                MatchKind::AllTerms => keyed(
                    "match",
                    keyed(
                        field,
                        json!({ "query": query, "boost": boost, "operator": "AND" }),
                    ),
                ),
                MatchKind::Phrase => keyed(
                    "match_phrase",
                    keyed(field, json!({ "query": query, "boost": boost })),
                ),
            },
            Self::Nested { path, query } => json!({
                "nested": { "path": path, "score_mode": "max", "query": query.to_dsl() }
            }),
            Self::FunctionScore { query, functions } => {
                let functions: Vec<Value> = functions.iter().map(ScoringFunction::to_dsl).collect();
                json!({
                    "function_score": {
                        "query": query.to_dsl(),
                        "functions": functions,
                        "score_mode": "multiply",
                        "boost_mode": "replace"
                    }
                })
            }
            Self::GeoPolygon { field, points } => {
                let points: Vec<Value> = points.iter().copied().map(point).collect();
                keyed("geo_polygon", keyed(field, json!({ "points": points })))
            }
            Self::GeoDistance {
                field,
                origin,
                miles: radius,
            } => {
                let mut body = Map::new();
                body.insert("distance".to_string(), Value::String(miles(*radius)));
                body.insert((*field).to_string(), point(*origin));
                keyed("geo_distance", Value::Object(body))
            }
            Self::Bool(query) => query.to_dsl(),
        }
    }
}

impl BoolQuery {
    pub fn to_dsl(&self) -> Value {
        let mut body = Map::new();
        for (key, clauses) in [
            ("must", &self.must),
            ("filter", &self.filter),
            ("should", &self.should),
        ] {
            if !clauses.is_empty() {
                body.insert(
                    key.to_string(),
                    Value::Array(clauses.iter().map(Clause::to_dsl).collect()),
                );
            }
        }
        if let Some(minimum) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), json!(minimum));
        }
        keyed("bool", Value::Object(body))
    }
}

impl ScoringFunction {
    pub fn to_dsl(&self) -> Value {
        match self {
            Self::Popularity { field } => {
                json!({ "script_score": { "script": { "source": popularity_script(field) } } })
            }
            Self::GaussDecay {
                field,
                origin,
                scale_miles,
            } => {
                let mut body = Map::new();
                body.insert(
                    (*field).to_string(),
                    json!({ "origin": point(*origin), "scale": miles(*scale_miles) }),
                );
                // Multi-valued nested locations decay from the closest one.
                body.insert("multi_value_mode".to_string(), json!("min"));
                keyed("gauss", Value::Object(body))
            }
        }
    }
}

impl SortSpec {
    pub fn to_dsl(&self) -> Value {
        match self {
            Self::Relevance => json!([{ "_score": { "order": "desc" } }]),
            Self::Distance {
                path,
                field,
                origin,
            } => {
                let mut body = Map::new();
                body.insert((*field).to_string(), point(*origin));
                body.insert("nested".to_string(), json!({ "path": path }));
                body.insert("order".to_string(), json!("asc"));
                body.insert("unit".to_string(), json!("mi"));
                body.insert("mode".to_string(), json!("min"));
                json!([keyed("_geo_distance", Value::Object(body))])
            }
        }
    }
}

impl QueryDocument {
    /// Render the full search body: window, sort, and the function-scored query.
    pub fn to_dsl(&self) -> Value {
        let functions: Vec<Value> = self.functions().iter().map(ScoringFunction::to_dsl).collect();
        json!({
            "from": self.from(),
            "size": self.size(),
            "sort": self.sort().to_dsl(),
            "query": {
                "function_score": {
                    "query": self.query().to_dsl(),
                    "functions": functions,
                    "score_mode": "multiply",
                    "boost_mode": "multiply"
                }
            }
        })
    }

    /// Stable hash of the rendered body, usable as a result-cache key.
    pub fn fingerprint(&self) -> u64 {
        xxh3_64(self.to_dsl().to_string().as_bytes())
    }
}
