use std::sync::Arc;

use shared::{domain::FetchPage, error::CatalogError};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    events::{ChangeNotifier, StateChanged},
    PageFetcher,
};

pub const FIRST_PAGE: u32 = 1;

/// Snapshot of one paginated list.
///
/// `page` is the next page to request. `is_loading_initial` and
/// `is_loading_more` are never both set.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub has_more: bool,
    pub is_loading_initial: bool,
    pub is_loading_more: bool,
    pub last_error: Option<CatalogError>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: FIRST_PAGE,
            has_more: true,
            is_loading_initial: false,
            is_loading_more: false,
            last_error: None,
        }
    }
}

impl<T> ListState<T> {
    pub fn is_busy(&self) -> bool {
        self.is_loading_initial || self.is_loading_more
    }

    /// Whether a `load_more` issued now would fetch anything.
    pub fn can_load_more(&self) -> bool {
        !self.is_busy() && self.has_more && !self.items.is_empty()
    }

    fn apply_first_page(&mut self, fetched: FetchPage<T>) {
        self.has_more = match fetched.total_pages {
            Some(total) => total > FIRST_PAGE,
            None => !fetched.results.is_empty(),
        };
        self.items = fetched.results;
        self.page = if self.has_more {
            FIRST_PAGE + 1
        } else {
            FIRST_PAGE
        };
        self.last_error = None;
    }

    fn apply_next_page(&mut self, fetched: FetchPage<T>) {
        self.has_more = match fetched.total_pages {
            Some(total) => self.page < total,
            None => !fetched.results.is_empty(),
        };
        self.items.extend(fetched.results);
        if self.has_more {
            self.page += 1;
        }
        self.last_error = None;
    }
}

struct ListInner<T> {
    state: ListState<T>,
    /// Bumped by `reset`; a fetch that resolves under an older generation is
    /// dropped.
    generation: u64,
}

/// Owns one independently paginated list and its fetch state.
///
/// Operations take `&self` and never hold the state lock across the fetch, so
/// concurrent callers observe the loading flags and back off instead of
/// issuing a second request. Failures are captured into `last_error`; none of
/// the operations return an error.
pub struct PaginatedListController<T> {
    fetcher: Arc<dyn PageFetcher<T>>,
    notifier: ChangeNotifier,
    inner: Mutex<ListInner<T>>,
}

impl<T> PaginatedListController<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(fetcher: Arc<dyn PageFetcher<T>>, notifier: ChangeNotifier) -> Self {
        Self {
            fetcher,
            notifier,
            inner: Mutex::new(ListInner {
                state: ListState::default(),
                generation: 0,
            }),
        }
    }

    pub fn source(&self) -> &'static str {
        self.notifier.source()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChanged> {
        self.notifier.subscribe()
    }

    pub async fn snapshot(&self) -> ListState<T> {
        self.inner.lock().await.state.clone()
    }

    /// Fetches the first page and replaces the list with it.
    ///
    /// No-op while any fetch for this list is in flight. On failure the
    /// previous items, cursor and `has_more` are kept.
    pub async fn load_initial(&self) {
        let generation = {
            let mut guard = self.inner.lock().await;
            let inner = &mut *guard;
            if inner.state.is_busy() {
                debug!(source = self.source(), "load_initial skipped: fetch in flight");
                return;
            }
            inner.state.is_loading_initial = true;
            inner.state.last_error = None;
            inner.generation
        };
        self.notifier.notify();

        debug!(source = self.source(), page = FIRST_PAGE, "fetching first page");
        let result = self.fetcher.fetch_page(FIRST_PAGE).await;

        {
            let mut guard = self.inner.lock().await;
            let inner = &mut *guard;
            if inner.generation != generation {
                debug!(source = self.source(), "discarding first page fetched before reset");
                return;
            }
            inner.state.is_loading_initial = false;
            match result {
                Ok(fetched) => {
                    inner.state.apply_first_page(fetched);
                    info!(
                        source = self.source(),
                        items = inner.state.items.len(),
                        has_more = inner.state.has_more,
                        "first page loaded"
                    );
                }
                Err(err) => {
                    warn!(
                        source = self.source(),
                        page = FIRST_PAGE,
                        kind = ?err.kind,
                        "failed to fetch first page: {}",
                        err.message
                    );
                    inner.state.last_error = Some(err);
                }
            }
        }
        self.notifier.notify();
    }

    /// Fetches the page under the cursor and appends it.
    ///
    /// No-op while any fetch is in flight or once the catalog reported no more
    /// pages.
    pub async fn load_more(&self) {
        let (page, generation) = {
            let mut guard = self.inner.lock().await;
            let inner = &mut *guard;
            if inner.state.is_busy() || !inner.state.has_more {
                debug!(
                    source = self.source(),
                    has_more = inner.state.has_more,
                    "load_more skipped"
                );
                return;
            }
            inner.state.is_loading_more = true;
            (inner.state.page, inner.generation)
        };
        self.notifier.notify();

        debug!(source = self.source(), page, "fetching next page");
        let result = self.fetcher.fetch_page(page).await;

        {
            let mut guard = self.inner.lock().await;
            let inner = &mut *guard;
            if inner.generation != generation {
                debug!(source = self.source(), page, "discarding page fetched before reset");
                return;
            }
            inner.state.is_loading_more = false;
            match result {
                Ok(fetched) => {
                    inner.state.apply_next_page(fetched);
                    info!(
                        source = self.source(),
                        page,
                        items = inner.state.items.len(),
                        has_more = inner.state.has_more,
                        "page appended"
                    );
                }
                Err(err) => {
                    warn!(
                        source = self.source(),
                        page,
                        kind = ?err.kind,
                        "failed to fetch page: {}",
                        err.message
                    );
                    inner.state.last_error = Some(err);
                }
            }
        }
        self.notifier.notify();
    }

    /// Restores construction-time defaults. A fetch still in flight is
    /// discarded when it resolves.
    pub async fn reset(&self) {
        self.reset_silently().await;
        self.notifier.notify();
    }

    /// `reset` without the notification, for owners that announce a combined
    /// reset themselves.
    pub(crate) async fn reset_silently(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.state = ListState::default();
            inner.generation += 1;
        }
        debug!(source = self.source(), "list reset");
    }
}

#[cfg(test)]
#[path = "tests/paginated_tests.rs"]
mod tests;
