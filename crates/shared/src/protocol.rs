//! Catalog response bodies as they arrive over the wire.

use serde::{Deserialize, Serialize};

use crate::domain::{FetchPage, Movie};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub results: Vec<Movie>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<ResponseDates>,
}

/// Release window reported by the now-playing listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDates {
    pub maximum: String,
    pub minimum: String,
}

impl From<MovieResponse> for FetchPage<Movie> {
    fn from(value: MovieResponse) -> Self {
        // The catalog reports zero pages for empty result sets.
        let total_pages = value.total_pages.filter(|pages| *pages > 0);
        FetchPage::new(value.results, total_pages)
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
