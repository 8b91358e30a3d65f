//! Request types for the shared crate
//!
//! Filter set for the service-order list.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::order::{FinancialStatus, TechnicalStatus};
use crate::util::calendar_date_opt;

/// Service-order list filters
///
/// Also the shape persisted to local storage by the list view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilters {
    /// Free-text search (order number, customer, equipment)
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<TechnicalStatus>,
    #[serde(default)]
    pub financial: Option<FinancialStatus>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default, with = "calendar_date_opt")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "calendar_date_opt")]
    pub end_date: Option<NaiveDate>,

    /// Page number (1-based, default: 1)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page (default: 20, max: 100)
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl Default for OrderFilters {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            financial: None,
            customer_id: None,
            start_date: None,
            end_date: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl OrderFilters {
    /// True when no filter criterion is set (pagination is not a criterion)
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().is_none_or(|s| s.trim().is_empty())
            && self.status.is_none()
            && self.financial.is_none()
            && self.customer_id.as_deref().is_none_or(|s| s.is_empty())
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Get the limit (clamped to 1..=100)
    pub fn clamped_limit(&self) -> u32 {
        self.limit.clamp(1, 100)
    }

    /// Query-string pairs for `GET /api/service-orders`
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.clamped_limit().to_string()),
        ];
        if let Some(search) = self.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            pairs.push(("search", search.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.code().to_string()));
        }
        if let Some(financial) = self.financial {
            pairs.push(("financial", financial.code().to_string()));
        }
        if let Some(customer_id) = self.customer_id.as_deref()
            && !customer_id.is_empty()
        {
            pairs.push(("customerId", customer_id.to_string()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("startDate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        pairs
    }

    /// Stable key identifying this filter set (cache key)
    pub fn cache_key(&self) -> String {
        self.to_query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}
