use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const POSTER_SIZE: &str = "w500";
pub const BACKDROP_SIZE: &str = "original";

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(MovieId);

/// The two independently paginated catalog lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSegment {
    NowPlaying,
    Popular,
}

impl CatalogSegment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NowPlaying => "now_playing",
            Self::Popular => "popular",
        }
    }
}

impl fmt::Display for CatalogSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
}

impl Movie {
    pub fn poster_url(&self) -> Option<String> {
        self.poster_url_at(IMAGE_BASE_URL)
    }

    /// Poster URL under a configured image host instead of the public one.
    pub fn poster_url_at(&self, image_base_url: &str) -> Option<String> {
        image_url(image_base_url, POSTER_SIZE, self.poster_path.as_deref())
    }

    pub fn backdrop_url(&self) -> Option<String> {
        self.backdrop_url_at(IMAGE_BASE_URL)
    }

    pub fn backdrop_url_at(&self, image_base_url: &str) -> Option<String> {
        image_url(image_base_url, BACKDROP_SIZE, self.backdrop_path.as_deref())
    }

    pub fn formatted_rating(&self) -> String {
        format_rating(self.vote_average)
    }

    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: MovieId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u32>,
}

impl MovieDetail {
    pub fn poster_url(&self) -> Option<String> {
        self.poster_url_at(IMAGE_BASE_URL)
    }

    pub fn poster_url_at(&self, image_base_url: &str) -> Option<String> {
        image_url(image_base_url, POSTER_SIZE, self.poster_path.as_deref())
    }

    pub fn formatted_rating(&self) -> String {
        format_rating(self.vote_average)
    }

    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }
}

/// One page of results as handed to a list controller.
///
/// `total_pages: None` means the catalog did not say how many pages exist; the
/// controller then keeps paging until an empty page comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPage<T> {
    pub results: Vec<T>,
    pub total_pages: Option<u32>,
}

impl<T> FetchPage<T> {
    pub fn new(results: Vec<T>, total_pages: Option<u32>) -> Self {
        Self {
            results,
            total_pages,
        }
    }

    pub fn unbounded(results: Vec<T>) -> Self {
        Self::new(results, None)
    }
}

fn image_url(base: &str, size: &str, path: Option<&str>) -> Option<String> {
    let path = path?.trim().trim_start_matches('/');
    if path.is_empty() {
        return None;
    }
    let base = base.trim().trim_end_matches('/');
    Some(format!("{base}/{size}/{path}"))
}

fn format_rating(vote_average: Option<f64>) -> String {
    match vote_average {
        Some(rating) => format!("{rating:.1}"),
        None => "N/A".to_string(),
    }
}

fn release_year(release_date: Option<&str>) -> Option<i32> {
    NaiveDate::parse_from_str(release_date?.trim(), "%Y-%m-%d")
        .ok()
        .map(|date| date.year())
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
