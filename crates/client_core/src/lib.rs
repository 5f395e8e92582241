use async_trait::async_trait;
use shared::{
    domain::{FetchPage, Movie},
    error::CatalogError,
};

mod detail;
pub mod events;
mod paginated;
mod session;
pub mod transport;

pub use detail::{DetailController, DetailState};
pub use events::{ChangeNotifier, StateChanged};
pub use paginated::{ListState, PaginatedListController, FIRST_PAGE};
pub use session::{
    MoviesSession, MoviesSessionBuilder, SessionSnapshot, DETAILS_SOURCE, SEARCH_SOURCE,
    SESSION_SOURCE,
};

pub type FetchResult<T> = std::result::Result<T, CatalogError>;

/// Fetches one page of an independently paginated list. Pages are 1-based.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch_page(&self, page: u32) -> FetchResult<FetchPage<T>>;
}

/// Fetches a single value by identifier.
#[async_trait]
pub trait DetailFetcher<K, T>: Send + Sync {
    async fn fetch_detail(&self, id: K) -> FetchResult<T>;
}

#[async_trait]
pub trait SearchFetcher<T>: Send + Sync {
    async fn fetch_search(&self, query: &str, page: u32) -> FetchResult<FetchPage<T>>;
}

/// Stand-in for a capability that was not wired. Every call fails with
/// `ErrorKind::Unknown`.
pub struct MissingCatalog;

#[async_trait]
impl PageFetcher<Movie> for MissingCatalog {
    async fn fetch_page(&self, page: u32) -> FetchResult<FetchPage<Movie>> {
        Err(CatalogError::unknown(format!(
            "catalog backend unavailable for page {page}"
        )))
    }
}

#[async_trait]
impl SearchFetcher<Movie> for MissingCatalog {
    async fn fetch_search(&self, query: &str, _page: u32) -> FetchResult<FetchPage<Movie>> {
        Err(CatalogError::unknown(format!(
            "catalog backend unavailable for search '{query}'"
        )))
    }
}

#[async_trait]
impl<K, T> DetailFetcher<K, T> for MissingCatalog
where
    K: std::fmt::Display + Send + 'static,
    T: Send + 'static,
{
    async fn fetch_detail(&self, id: K) -> FetchResult<T> {
        Err(CatalogError::unknown(format!(
            "catalog backend unavailable for detail {id}"
        )))
    }
}
