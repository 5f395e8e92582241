use std::sync::Arc;

use shared::{
    domain::{CatalogSegment, Movie, MovieDetail, MovieId},
    error::CatalogError,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use crate::{
    detail::{DetailController, DetailState},
    events::{ChangeNotifier, StateChanged},
    paginated::{ListState, PaginatedListController, FIRST_PAGE},
    transport::{SegmentFeed, TmdbClient},
    DetailFetcher, MissingCatalog, PageFetcher, SearchFetcher,
};

const SESSION_EVENT_CAPACITY: usize = 1024;
pub const DETAILS_SOURCE: &str = "details";
pub const SEARCH_SOURCE: &str = "search";
pub const SESSION_SOURCE: &str = "session";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub now_playing: ListState<Movie>,
    pub popular: ListState<Movie>,
    pub details: DetailState<MovieDetail>,
    pub search_error: Option<CatalogError>,
}

impl SessionSnapshot {
    pub fn list(&self, segment: CatalogSegment) -> &ListState<Movie> {
        match segment {
            CatalogSegment::NowPlaying => &self.now_playing,
            CatalogSegment::Popular => &self.popular,
        }
    }

    pub fn has_error(&self) -> bool {
        self.now_playing.last_error.is_some()
            || self.popular.last_error.is_some()
            || self.details.last_error.is_some()
            || self.search_error.is_some()
    }

    /// A first page is on its way and nothing is on screen yet.
    pub fn is_initial_loading(&self) -> bool {
        let loading = self.now_playing.is_loading_initial || self.popular.is_loading_initial;
        loading && self.now_playing.items.is_empty() && self.popular.items.is_empty()
    }
}

/// The catalog surface a UI talks to: two paginated lists, one detail slot and
/// a stateless search. All controllers publish into one event channel.
pub struct MoviesSession {
    now_playing: PaginatedListController<Movie>,
    popular: PaginatedListController<Movie>,
    details: DetailController<MovieId, MovieDetail>,
    search: Arc<dyn SearchFetcher<Movie>>,
    search_notifier: ChangeNotifier,
    session_notifier: ChangeNotifier,
    search_error: Mutex<Option<CatalogError>>,
    events: broadcast::Sender<StateChanged>,
}

pub struct MoviesSessionBuilder {
    now_playing: Arc<dyn PageFetcher<Movie>>,
    popular: Arc<dyn PageFetcher<Movie>>,
    details: Arc<dyn DetailFetcher<MovieId, MovieDetail>>,
    search: Arc<dyn SearchFetcher<Movie>>,
}

impl MoviesSessionBuilder {
    pub fn segment(mut self, segment: CatalogSegment, fetcher: Arc<dyn PageFetcher<Movie>>) -> Self {
        match segment {
            CatalogSegment::NowPlaying => self.now_playing = fetcher,
            CatalogSegment::Popular => self.popular = fetcher,
        }
        self
    }

    pub fn details(mut self, fetcher: Arc<dyn DetailFetcher<MovieId, MovieDetail>>) -> Self {
        self.details = fetcher;
        self
    }

    pub fn search(mut self, fetcher: Arc<dyn SearchFetcher<Movie>>) -> Self {
        self.search = fetcher;
        self
    }

    pub fn build(self) -> MoviesSession {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        let notifier = |source| ChangeNotifier::with_sender(source, events.clone());
        MoviesSession {
            now_playing: PaginatedListController::new(
                self.now_playing,
                notifier(CatalogSegment::NowPlaying.as_str()),
            ),
            popular: PaginatedListController::new(
                self.popular,
                notifier(CatalogSegment::Popular.as_str()),
            ),
            details: DetailController::new(self.details, notifier(DETAILS_SOURCE)),
            search: self.search,
            search_notifier: notifier(SEARCH_SOURCE),
            session_notifier: notifier(SESSION_SOURCE),
            search_error: Mutex::new(None),
            events,
        }
    }
}

impl MoviesSession {
    /// Every capability starts out unwired and fails with `ErrorKind::Unknown`.
    pub fn builder() -> MoviesSessionBuilder {
        let missing = Arc::new(MissingCatalog);
        MoviesSessionBuilder {
            now_playing: missing.clone(),
            popular: missing.clone(),
            details: missing.clone(),
            search: missing,
        }
    }

    pub fn from_client(client: Arc<TmdbClient>) -> Self {
        Self::builder()
            .segment(
                CatalogSegment::NowPlaying,
                Arc::new(SegmentFeed::new(client.clone(), CatalogSegment::NowPlaying)),
            )
            .segment(
                CatalogSegment::Popular,
                Arc::new(SegmentFeed::new(client.clone(), CatalogSegment::Popular)),
            )
            .details(client.clone())
            .search(client)
            .build()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChanged> {
        self.events.subscribe()
    }

    pub fn list(&self, segment: CatalogSegment) -> &PaginatedListController<Movie> {
        match segment {
            CatalogSegment::NowPlaying => &self.now_playing,
            CatalogSegment::Popular => &self.popular,
        }
    }

    pub fn details(&self) -> &DetailController<MovieId, MovieDetail> {
        &self.details
    }

    pub async fn load_initial(&self, segment: CatalogSegment) {
        self.list(segment).load_initial().await;
    }

    pub async fn load_more(&self, segment: CatalogSegment) {
        self.list(segment).load_more().await;
    }

    pub async fn load_detail(&self, id: MovieId) {
        self.details.load_detail(id).await;
    }

    /// Loads the first page of both segments concurrently.
    pub async fn refresh_all(&self) {
        futures::join!(self.now_playing.load_initial(), self.popular.load_initial());
    }

    /// First page of matches for `query`. Blank queries return nothing without
    /// touching the catalog; failures are recorded as the search error.
    pub async fn search(&self, query: &str) -> Vec<Movie> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        debug!(query, "searching catalog");
        match self.search.fetch_search(query, FIRST_PAGE).await {
            Ok(fetched) => {
                let cleared = self.search_error.lock().await.take().is_some();
                if cleared {
                    self.search_notifier.notify();
                }
                fetched.results
            }
            Err(err) => {
                warn!(query, kind = ?err.kind, "search failed: {}", err.message);
                *self.search_error.lock().await = Some(err);
                self.search_notifier.notify();
                Vec::new()
            }
        }
    }

    pub async fn search_error(&self) -> Option<CatalogError> {
        self.search_error.lock().await.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            now_playing: self.now_playing.snapshot().await,
            popular: self.popular.snapshot().await,
            details: self.details.snapshot().await,
            search_error: self.search_error().await,
        }
    }

    /// Returns every controller to its construction-time state and announces
    /// it with a single `"session"` event.
    pub async fn reset(&self) {
        self.now_playing.reset_silently().await;
        self.popular.reset_silently().await;
        self.details.reset_silently().await;
        *self.search_error.lock().await = None;
        debug!("session reset");
        self.session_notifier.notify();
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
