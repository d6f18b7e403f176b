use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Create a point, rejecting coordinates outside the valid lat/lon ranges.
    pub fn new(lat: f64, lon: f64) -> Result<Self, SearchError> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if valid {
            Ok(Self { lat, lon })
        } else {
            Err(SearchError::InvalidCoordinate { lat, lon })
        }
    }
}

/// How long a service typically makes people wait, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitTime {
    OneWeek,
    TwoWeeks,
    ThreeWeeks,
    Month,
    Longer,
}

impl WaitTime {
    /// All buckets in ascending severity.
    pub const ALL: [Self; 5] = [
        Self::OneWeek,
        Self::TwoWeeks,
        Self::ThreeWeeks,
        Self::Month,
        Self::Longer,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneWeek => "one_week",
            Self::TwoWeeks => "two_weeks",
            Self::ThreeWeeks => "three_weeks",
            Self::Month => "month",
            Self::Longer => "longer",
        }
    }

    /// Every bucket at or below this one.
    ///
    /// A service that answers within one week also satisfies someone willing to
    /// wait three weeks, so the filter set is cumulative.
    pub fn cumulative(self) -> &'static [Self] {
        let all: &'static [Self] = &Self::ALL;
        let end = all
            .iter()
            .position(|bucket| *bucket == self)
            .map_or(all.len(), |idx| idx + 1);
        &all[..end]
    }
}

impl fmt::Display for WaitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaitTime {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == s)
            .ok_or_else(|| SearchError::InvalidWaitTime(s.to_string()))
    }
}

/// Result ordering requested by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Relevance,
    Distance,
}

impl SortOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Distance => "distance",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Relevance, Self::Distance]
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| SearchError::InvalidOrder(s.to_string()))
    }
}
