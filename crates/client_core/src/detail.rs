use std::{fmt, sync::Arc};

use shared::error::CatalogError;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use crate::{
    events::{ChangeNotifier, StateChanged},
    DetailFetcher,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DetailState<T> {
    pub value: Option<T>,
    pub is_loading: bool,
    pub last_error: Option<CatalogError>,
}

impl<T> Default for DetailState<T> {
    fn default() -> Self {
        Self {
            value: None,
            is_loading: false,
            last_error: None,
        }
    }
}

struct DetailInner<T> {
    state: DetailState<T>,
    generation: u64,
}

/// Fetches and holds the most recently requested detail value.
pub struct DetailController<K, T> {
    fetcher: Arc<dyn DetailFetcher<K, T>>,
    notifier: ChangeNotifier,
    inner: Mutex<DetailInner<T>>,
}

impl<K, T> DetailController<K, T>
where
    K: fmt::Display + Send + 'static,
    T: Clone + Send + 'static,
{
    pub fn new(fetcher: Arc<dyn DetailFetcher<K, T>>, notifier: ChangeNotifier) -> Self {
        Self {
            fetcher,
            notifier,
            inner: Mutex::new(DetailInner {
                state: DetailState::default(),
                generation: 0,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChanged> {
        self.notifier.subscribe()
    }

    pub async fn snapshot(&self) -> DetailState<T> {
        self.inner.lock().await.state.clone()
    }

    /// No-op while another detail fetch is in flight. A failure keeps the
    /// previously loaded value.
    pub async fn load_detail(&self, id: K) {
        let generation = {
            let mut inner = self.inner.lock().await;
            if inner.state.is_loading {
                debug!(source = self.notifier.source(), %id, "load_detail skipped: fetch in flight");
                return;
            }
            inner.state.is_loading = true;
            inner.state.last_error = None;
            inner.generation
        };
        self.notifier.notify();

        let label = id.to_string();
        let result = self.fetcher.fetch_detail(id).await;

        {
            let mut inner = self.inner.lock().await;
            if inner.generation != generation {
                debug!(source = self.notifier.source(), id = %label, "discarding detail fetched before reset");
                return;
            }
            inner.state.is_loading = false;
            match result {
                Ok(value) => {
                    debug!(source = self.notifier.source(), id = %label, "detail loaded");
                    inner.state.value = Some(value);
                }
                Err(err) => {
                    warn!(
                        source = self.notifier.source(),
                        id = %label,
                        kind = ?err.kind,
                        "failed to fetch detail: {}",
                        err.message
                    );
                    inner.state.last_error = Some(err);
                }
            }
        }
        self.notifier.notify();
    }

    pub async fn reset(&self) {
        self.reset_silently().await;
        self.notifier.notify();
    }

    pub(crate) async fn reset_silently(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = DetailState::default();
        inner.generation += 1;
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
