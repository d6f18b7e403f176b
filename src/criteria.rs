//! The validated search request handed to the compiler, and the wire form it is decoded from.

use crate::error::SearchError;
use crate::types::{GeoPoint, SortOrder, WaitTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A user's search request after validation.
///
/// Only obtainable through [`SearchCriteria::builder`] or `TryFrom<SearchRequest>`,
/// so every instance satisfies the cross-field rules (e.g. distance ordering has a
/// location). Sets are sorted so compiled queries are deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    query: Option<String>,
    category_slugs: BTreeSet<String>,
    persona_slugs: BTreeSet<String>,
    wait_time: Option<WaitTime>,
    is_free: Option<bool>,
    eligibility_names: BTreeSet<String>,
    polygon: Option<Vec<GeoPoint>>,
    location: Option<GeoPoint>,
    distance: Option<u32>,
    order: SortOrder,
    page: Option<i64>,
    per_page: Option<i64>,
}

impl SearchCriteria {
    pub fn builder() -> SearchCriteriaBuilder {
        SearchCriteriaBuilder::default()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub const fn category_slugs(&self) -> &BTreeSet<String> {
        &self.category_slugs
    }

    pub const fn persona_slugs(&self) -> &BTreeSet<String> {
        &self.persona_slugs
    }

    pub const fn wait_time(&self) -> Option<WaitTime> {
        self.wait_time
    }

    pub const fn is_free(&self) -> Option<bool> {
        self.is_free
    }

    pub const fn eligibility_names(&self) -> &BTreeSet<String> {
        &self.eligibility_names
    }

    pub fn polygon(&self) -> Option<&[GeoPoint]> {
        self.polygon.as_deref()
    }

    pub const fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    /// Explicit search radius in miles.
    pub const fn distance(&self) -> Option<u32> {
        self.distance
    }

    pub const fn order(&self) -> SortOrder {
        self.order
    }

    pub const fn page(&self) -> Option<i64> {
        self.page
    }

    pub const fn per_page(&self) -> Option<i64> {
        self.per_page
    }
}

/// Accumulates raw request values; [`build`](Self::build) validates them.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteriaBuilder {
    query: Option<String>,
    category_slugs: BTreeSet<String>,
    persona_slugs: BTreeSet<String>,
    wait_time: Option<WaitTime>,
    is_free: Option<bool>,
    eligibility_names: BTreeSet<String>,
    polygon: Option<Vec<GeoPoint>>,
    location: Option<GeoPoint>,
    distance: Option<i64>,
    order: SortOrder,
    page: Option<i64>,
    per_page: Option<i64>,
}

impl SearchCriteriaBuilder {
    pub fn query(mut self, text: impl Into<String>) -> Self {
        self.query = Some(text.into());
        self
    }

    pub fn category(mut self, slug: impl Into<String>) -> Self {
        self.category_slugs.insert(slug.into());
        self
    }

    pub fn persona(mut self, slug: impl Into<String>) -> Self {
        self.persona_slugs.insert(slug.into());
        self
    }

    pub fn wait_time(mut self, wait_time: WaitTime) -> Self {
        self.wait_time = Some(wait_time);
        self
    }

    pub fn is_free(mut self, is_free: bool) -> Self {
        self.is_free = Some(is_free);
        self
    }

    pub fn eligibility(mut self, name: impl Into<String>) -> Self {
        self.eligibility_names.insert(name.into());
        self
    }

    pub fn polygon(mut self, points: Vec<GeoPoint>) -> Self {
        self.polygon = Some(points);
        self
    }

    pub fn location(mut self, point: GeoPoint) -> Self {
        self.location = Some(point);
        self
    }

    /// Search radius in miles.
    pub fn distance(mut self, miles: i64) -> Self {
        self.distance = Some(miles);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: i64) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn build(self) -> Result<SearchCriteria, SearchError> {
        let location = self
            .location
            .map(|point| GeoPoint::new(point.lat, point.lon))
            .transpose()?;

        if self.order == SortOrder::Distance && location.is_none() {
            return Err(SearchError::MissingLocationForDistanceOrder);
        }

        let distance = self
            .distance
            .map(|miles| {
                u32::try_from(miles)
                    .ok()
                    .filter(|miles| *miles >= 1)
                    .ok_or(SearchError::InvalidDistance(miles))
            })
            .transpose()?;

        let polygon = match self.polygon {
            Some(points) if points.len() < 3 => {
                return Err(SearchError::PolygonTooSmall(points.len()));
            }
            Some(points) => Some(
                points
                    .into_iter()
                    .map(|point| GeoPoint::new(point.lat, point.lon))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        let query = self
            .query
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(SearchCriteria {
            query,
            category_slugs: clean_set(self.category_slugs),
            persona_slugs: clean_set(self.persona_slugs),
            wait_time: self.wait_time,
            is_free: self.is_free,
            eligibility_names: clean_set(self.eligibility_names),
            polygon,
            location,
            distance,
            order: self.order,
            page: self.page,
            per_page: self.per_page,
        })
    }
}

/// Trim entries and drop blanks.
fn clean_set(values: BTreeSet<String>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// A search request as it arrives over the wire.
///
/// `category` and `persona` are comma-separated slug lists; `wait_time` and `order`
/// are free strings validated during conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub category: Option<String>,
    pub persona: Option<String>,
    pub wait_time: Option<String>,
    pub is_free: Option<bool>,
    pub eligibilities: Vec<String>,
    pub location: Option<GeoPoint>,
    pub distance: Option<i64>,
    pub polygon: Option<Vec<GeoPoint>>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

fn split_slugs(list: Option<&str>) -> impl Iterator<Item = &str> {
    list.into_iter().flat_map(|list| list.split(','))
}

impl TryFrom<SearchRequest> for SearchCriteria {
    type Error = SearchError;

    fn try_from(request: SearchRequest) -> Result<Self, Self::Error> {
        let mut builder = Self::builder();

        if let Some(wait_time) = &request.wait_time {
            builder = builder.wait_time(wait_time.parse()?);
        }
        if let Some(order) = &request.order {
            builder = builder.order(order.parse()?);
        }
        if let Some(query) = request.query {
            builder = builder.query(query);
        }
        for slug in split_slugs(request.category.as_deref()) {
            builder = builder.category(slug);
        }
        for slug in split_slugs(request.persona.as_deref()) {
            builder = builder.persona(slug);
        }
        if let Some(is_free) = request.is_free {
            builder = builder.is_free(is_free);
        }
        for name in request.eligibilities {
            builder = builder.eligibility(name);
        }
        if let Some(polygon) = request.polygon {
            builder = builder.polygon(polygon);
        }
        if let Some(location) = request.location {
            builder = builder.location(location);
        }
        if let Some(distance) = request.distance {
            builder = builder.distance(distance);
        }
        if let Some(page) = request.page {
            builder = builder.page(page);
        }
        if let Some(per_page) = request.per_page {
            builder = builder.per_page(per_page);
        }

        builder.build()
    }
}
