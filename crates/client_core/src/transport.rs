//! HTTP adapter that backs the fetch capabilities with the TMDB v3 API.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{CatalogSegment, FetchPage, Movie, MovieDetail, MovieId},
    error::CatalogError,
    protocol::MovieResponse,
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::{DetailFetcher, FetchResult, PageFetcher, SearchFetcher};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    pub api_token: String,
    pub timeout: Duration,
}

impl TransportConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_token: api_token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportSetupError {
    #[error("invalid catalog base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("catalog api token is empty")]
    MissingToken,
    #[error("catalog api token is not a valid header value")]
    InvalidToken,
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    NowPlaying { page: u32 },
    Popular { page: u32 },
    Search { query: String, page: u32 },
    MovieDetails { id: MovieId },
}

impl Endpoint {
    pub fn segment(segment: CatalogSegment, page: u32) -> Self {
        match segment {
            CatalogSegment::NowPlaying => Self::NowPlaying { page },
            CatalogSegment::Popular => Self::Popular { page },
        }
    }

    fn path(&self) -> String {
        match self {
            Self::NowPlaying { .. } => "movie/now_playing".into(),
            Self::Popular { .. } => "movie/popular".into(),
            Self::Search { .. } => "search/movie".into(),
            Self::MovieDetails { id } => format!("movie/{id}"),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::NowPlaying { page } | Self::Popular { page } => {
                vec![("page", page.to_string())]
            }
            Self::Search { query, page } => {
                vec![("query", query.clone()), ("page", page.to_string())]
            }
            Self::MovieDetails { .. } => Vec::new(),
        }
    }
}

pub struct TmdbClient {
    http: Client,
    base_url: Url,
}

impl TmdbClient {
    pub fn new(config: TransportConfig) -> Result<Self, TransportSetupError> {
        let token = config.api_token.trim();
        if token.is_empty() {
            return Err(TransportSetupError::MissingToken);
        }

        let mut raw_base = config.base_url.trim().to_string();
        // `Url::join` replaces the last segment unless the base ends with '/'.
        if !raw_base.ends_with('/') {
            raw_base.push('/');
        }
        let base_url = Url::parse(&raw_base).map_err(|source| TransportSetupError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| TransportSetupError::InvalidToken)?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn endpoint_url(&self, endpoint: &Endpoint) -> FetchResult<Url> {
        let mut url = self
            .base_url
            .join(&endpoint.path())
            .map_err(|err| CatalogError::unknown(format!("invalid endpoint path: {err}")))?;
        let query = endpoint.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get<R: DeserializeOwned>(&self, endpoint: &Endpoint) -> FetchResult<R> {
        let url = self.endpoint_url(endpoint)?;
        debug!(endpoint = ?endpoint, "catalog request");

        let response = self.http.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = ?endpoint, status = status.as_u16(), "catalog request rejected");
            return Err(CatalogError::http_status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body).map_err(|err| {
            warn!(endpoint = ?endpoint, "undecodable catalog response: {err}");
            CatalogError::from(err)
        })
    }

    pub async fn fetch_segment(
        &self,
        segment: CatalogSegment,
        page: u32,
    ) -> FetchResult<FetchPage<Movie>> {
        let response: MovieResponse = self.get(&Endpoint::segment(segment, page)).await?;
        debug!(%segment, page, results = response.results.len(), "segment page fetched");
        Ok(response.into())
    }

    pub async fn search_movies(&self, query: &str, page: u32) -> FetchResult<FetchPage<Movie>> {
        let endpoint = Endpoint::Search {
            query: query.to_string(),
            page,
        };
        let response: MovieResponse = self.get(&endpoint).await?;
        Ok(response.into())
    }

    pub async fn movie_details(&self, id: MovieId) -> FetchResult<MovieDetail> {
        let detail: MovieDetail = self.get(&Endpoint::MovieDetails { id }).await?;
        debug!(%id, title = %detail.title, "movie details fetched");
        Ok(detail)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        CatalogError::network(err.to_string())
    } else if err.is_decode() {
        CatalogError::decoding(err.to_string())
    } else if let Some(status) = err.status() {
        CatalogError::http_status(status.as_u16())
    } else {
        CatalogError::unknown(err.to_string())
    }
}

/// One catalog segment exposed as a page source.
pub struct SegmentFeed {
    client: Arc<TmdbClient>,
    segment: CatalogSegment,
}

impl SegmentFeed {
    pub fn new(client: Arc<TmdbClient>, segment: CatalogSegment) -> Self {
        Self { client, segment }
    }
}

#[async_trait]
impl PageFetcher<Movie> for SegmentFeed {
    async fn fetch_page(&self, page: u32) -> FetchResult<FetchPage<Movie>> {
        self.client.fetch_segment(self.segment, page).await
    }
}

#[async_trait]
impl SearchFetcher<Movie> for TmdbClient {
    async fn fetch_search(&self, query: &str, page: u32) -> FetchResult<FetchPage<Movie>> {
        self.search_movies(query, page).await
    }
}

#[async_trait]
impl DetailFetcher<MovieId, MovieDetail> for TmdbClient {
    async fn fetch_detail(&self, id: MovieId) -> FetchResult<MovieDetail> {
        self.movie_details(id).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
