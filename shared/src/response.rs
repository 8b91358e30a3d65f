//! API Response types
//!
//! Paginated list envelope, next-number reply and the error body the
//! API returns on non-2xx responses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Paginated list response: `{data, total, page, limit, totalPages}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items of the current page
    pub data: Vec<T>,
    /// Total number of items
    pub total: u64,
    /// Current page number (1-based)
    pub page: u32,
    /// Items per page
    pub limit: u32,
    /// Total number of pages
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit > 0 {
            total.div_ceil(limit as u64) as u32
        } else {
            1
        };
        Self {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// Empty first page
    pub fn empty(limit: u32) -> Self {
        Self::new(vec![], 0, 1, limit)
    }
}

/// Response of `GET /api/service-orders/next-number`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SequenceNumber {
    /// Last number assigned by the server
    pub current_number: i64,
    /// Whether any order has been created yet
    pub exists: bool,
}

impl SequenceNumber {
    /// Number the next created order is expected to receive.
    ///
    /// Only a prediction for display; the server assigns the real value.
    pub fn predicted_next(&self) -> i64 {
        if self.exists {
            self.current_number + 1
        } else {
            self.current_number.max(1)
        }
    }
}

/// Error body returned by the API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    /// Field-level messages from server-side validation
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        let page: Paginated<u8> = Paginated::new(vec![], 41, 1, 20);
        assert_eq!(page.total_pages, 3);
        let page: Paginated<u8> = Paginated::new(vec![], 40, 1, 20);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_predicted_next() {
        let seq = SequenceNumber { current_number: 41, exists: true };
        assert_eq!(seq.predicted_next(), 42);
        let seq = SequenceNumber { current_number: 0, exists: false };
        assert_eq!(seq.predicted_next(), 1);
    }

    #[test]
    fn test_paginated_wire_shape() {
        let json = r#"{"data":[1,2],"total":2,"page":1,"limit":20,"totalPages":1}"#;
        let page: Paginated<u8> = serde_json::from_str(json).unwrap();
        assert_eq!(page.data, vec![1, 2]);
        assert_eq!(page.total_pages, 1);
    }
}
