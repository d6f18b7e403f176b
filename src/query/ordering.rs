//! Sort order and pagination window for a compiled search.

use super::document::{SortSpec, fields};
use crate::config::SearchConfig;
use crate::criteria::SearchCriteria;
use crate::error::SearchError;
use crate::types::SortOrder;

/// Pagination defaults applied when a request leaves page or page size unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationDefaults {
    pub default_page: i64,
    pub default_per_page: i64,
    pub max_per_page: i64,
}

impl From<&SearchConfig> for PaginationDefaults {
    fn from(config: &SearchConfig) -> Self {
        Self {
            default_page: 1,
            default_per_page: i64::from(config.default_pagination_results),
            max_per_page: i64::from(config.max_pagination_results),
        }
    }
}

/// Sort key and result window resolved for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOrdering {
    pub sort: SortSpec,
    pub from: u64,
    pub size: u64,
}

pub struct ResultOrdering;

impl ResultOrdering {
    /// Derive the sort key and `from`/`size` window.
    ///
    /// `size` is the requested page size clamped to `1..=max_per_page`; pages below 1
    /// are treated as the first page. Ties in either sort order fall back to the
    /// index's natural document order.
    pub fn resolve(
        criteria: &SearchCriteria,
        defaults: PaginationDefaults,
    ) -> Result<ResolvedOrdering, SearchError> {
        let sort = match criteria.order() {
            SortOrder::Relevance => SortSpec::Relevance,
            SortOrder::Distance => {
                let Some(origin) = criteria.location() else {
                    return Err(SearchError::MissingLocationForDistanceOrder);
                };
                SortSpec::Distance {
                    path: fields::SERVICE_LOCATIONS,
                    field: fields::SERVICE_LOCATION_POINT,
                    origin,
                }
            }
        };

        let max_per_page = defaults.max_per_page.max(1);
        let size = criteria
            .per_page()
            .unwrap_or(defaults.default_per_page)
            .clamp(1, max_per_page);
        let page = criteria.page().unwrap_or(defaults.default_page).max(1);

        // Both operands are at least 1 after clamping.
        let size = size.unsigned_abs();
        let from = (page.unsigned_abs() - 1).saturating_mul(size);

        Ok(ResolvedOrdering { sort, from, size })
    }
}
