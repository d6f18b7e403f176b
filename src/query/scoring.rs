//! Relevance weights and scoring function parameters.
//!
//! Text fields are grouped into boost tiers: name and organisation name weigh the
//! most, the taxonomy category labels the least. Within a field, a fuzzy match is
//! worth less than an all-terms match, which is worth less than an exact phrase.

use super::document::{MatchKind, fields};

/// Base weight per searchable text field, strongest tier first.
pub const TEXT_FIELDS: [(&str, f64); 5] = [
    (fields::NAME, 3.0),
    (fields::ORGANISATION_NAME, 3.0),
    (fields::INTRO, 2.0),
    (fields::DESCRIPTION, 1.5),
    (fields::TAXONOMY_CATEGORIES, 1.0),
];

/// Match kinds emitted per text field, in ascending specificity.
pub const MATCH_KINDS: [MatchKind; 3] = [MatchKind::Fuzzy, MatchKind::AllTerms, MatchKind::Phrase];

/// Boost contributed by a specific eligibility value.
pub const ELIGIBILITY_MATCH_BOOST: f64 = 1.0;

/// The "<type> All" catch-all admits a service but adds nothing to its score.
pub const ELIGIBILITY_SENTINEL_BOOST: f64 = 0.0;

/// Falloff scale of the distance decay.
pub const DISTANCE_DECAY_SCALE_MILES: u32 = 1;

/// Painless source of the popularity function over `field`. Documents without a
/// value count as 0.
pub fn popularity_script(field: &str) -> String {
    format!("((doc['{field}'].size() == 0 ? 0 : doc['{field}'].value) + 1) * 0.1 + 1")
}

/// Boost for a text clause of `kind` on a field with the given base weight.
pub fn match_boost(base: f64, kind: MatchKind) -> f64 {
    let multiplier = match kind {
        MatchKind::Fuzzy => 1.0,
        MatchKind::AllTerms => 2.0,
        MatchKind::Phrase => 3.0,
    };
    base * multiplier
}

/// Local evaluation of [`popularity_script`].
///
/// A missing score yields the neutral factor 1.1, so an unscored service is never
/// zeroed out of the results.
pub fn popularity_factor(score: Option<i64>) -> f64 {
    (score.unwrap_or(0) as f64 + 1.0) * 0.1 + 1.0
}

/// Appended to an eligibility type name to form its catch-all value.
const SENTINEL_SUFFIX: &str = " All";

/// Name of the catch-all eligibility value for a type, e.g. `Age Group All`.
pub fn eligibility_sentinel(type_name: &str) -> String {
    format!("{type_name}{SENTINEL_SUFFIX}")
}
