use super::*;
use crate::FetchResult;
use async_trait::async_trait;
use shared::{domain::FetchPage, error::ErrorKind};
use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
};

fn movie(id: i64, title: &str) -> Movie {
    Movie {
        id: MovieId(id),
        title: title.into(),
        overview: String::new(),
        poster_path: None,
        backdrop_path: None,
        vote_average: None,
        vote_count: None,
        release_date: None,
        original_language: None,
    }
}

struct StubSegment {
    pages: Mutex<VecDeque<FetchResult<FetchPage<Movie>>>>,
}

impl StubSegment {
    fn new(pages: Vec<FetchResult<FetchPage<Movie>>>) -> Arc<Self> {
        Arc::new(Self {
            pages: Mutex::new(pages.into()),
        })
    }
}

#[async_trait]
impl PageFetcher<Movie> for StubSegment {
    async fn fetch_page(&self, _page: u32) -> FetchResult<FetchPage<Movie>> {
        self.pages
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(FetchPage::unbounded(Vec::new())))
    }
}

#[derive(Default)]
struct StubSearch {
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
    fail_with: Option<CatalogError>,
}

#[async_trait]
impl SearchFetcher<Movie> for StubSearch {
    async fn fetch_search(&self, query: &str, page: u32) -> FetchResult<FetchPage<Movie>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().await.push(format!("{query}@{page}"));
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(FetchPage::new(vec![movie(9, query)], Some(4)))
    }
}

fn drain(rx: &mut broadcast::Receiver<StateChanged>) -> Vec<&'static str> {
    std::iter::from_fn(|| rx.try_recv().ok())
        .map(|event| event.source)
        .collect()
}

#[tokio::test]
async fn segments_paginate_independently() {
    let session = MoviesSession::builder()
        .segment(
            CatalogSegment::NowPlaying,
            StubSegment::new(vec![
                Ok(FetchPage::new(vec![movie(1, "A")], Some(2))),
                Ok(FetchPage::new(vec![movie(2, "B")], Some(2))),
            ]),
        )
        .segment(
            CatalogSegment::Popular,
            StubSegment::new(vec![Ok(FetchPage::new(vec![movie(3, "C")], Some(1)))]),
        )
        .build();

    session.refresh_all().await;
    session.load_more(CatalogSegment::NowPlaying).await;
    session.load_more(CatalogSegment::Popular).await;

    let snapshot = session.snapshot().await;
    let ids = |segment| -> Vec<MovieId> {
        snapshot.list(segment).items.iter().map(|movie| movie.id).collect()
    };
    assert_eq!(ids(CatalogSegment::NowPlaying), vec![MovieId(1), MovieId(2)]);
    assert_eq!(ids(CatalogSegment::Popular), vec![MovieId(3)]);
    assert!(!snapshot.popular.has_more);
    assert!(!snapshot.has_error());
}

#[tokio::test]
async fn events_are_tagged_with_their_source() {
    let session = MoviesSession::builder()
        .segment(
            CatalogSegment::Popular,
            StubSegment::new(vec![Ok(FetchPage::new(vec![movie(3, "C")], None))]),
        )
        .build();
    let mut rx = session.subscribe();

    session.load_initial(CatalogSegment::Popular).await;
    session.load_detail(MovieId(5)).await;

    assert_eq!(drain(&mut rx), vec!["popular", "popular", DETAILS_SOURCE, DETAILS_SOURCE]);
}

#[tokio::test]
async fn blank_search_skips_the_catalog() {
    let search = Arc::new(StubSearch::default());
    let session = MoviesSession::builder().search(search.clone()).build();
    let mut rx = session.subscribe();

    assert!(session.search("").await.is_empty());
    assert!(session.search("   ").await.is_empty());

    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn search_returns_first_page_of_matches() {
    let search = Arc::new(StubSearch::default());
    let session = MoviesSession::builder().search(search.clone()).build();

    let results = session.search("  alien ").await;

    assert_eq!(results, vec![movie(9, "alien")]);
    assert_eq!(*search.queries.lock().await, vec!["alien@1".to_string()]);
    assert_eq!(session.search_error().await, None);
}

#[tokio::test]
async fn failed_search_is_recorded_and_returns_nothing() {
    let search = Arc::new(StubSearch {
        fail_with: Some(CatalogError::network("offline")),
        ..Default::default()
    });
    let session = MoviesSession::builder().search(search).build();
    let mut rx = session.subscribe();

    assert!(session.search("alien").await.is_empty());

    assert_eq!(
        session.search_error().await.map(|err| err.kind),
        Some(ErrorKind::NetworkFailure)
    );
    assert!(session.snapshot().await.has_error());
    assert_eq!(drain(&mut rx), vec![SEARCH_SOURCE]);
}

#[tokio::test]
async fn unwired_capabilities_report_unknown_errors() {
    let session = MoviesSession::builder().build();

    session.load_initial(CatalogSegment::NowPlaying).await;
    session.load_detail(MovieId(1)).await;

    let snapshot = session.snapshot().await;
    assert_eq!(
        snapshot.now_playing.last_error.map(|err| err.kind),
        Some(ErrorKind::Unknown)
    );
    assert_eq!(
        snapshot.details.last_error.map(|err| err.kind),
        Some(ErrorKind::Unknown)
    );
}

#[tokio::test]
async fn reset_returns_every_controller_to_fresh_state() {
    let session = MoviesSession::builder()
        .segment(
            CatalogSegment::NowPlaying,
            StubSegment::new(vec![Ok(FetchPage::new(vec![movie(1, "A")], Some(3)))]),
        )
        .search(Arc::new(StubSearch {
            fail_with: Some(CatalogError::http_status(500)),
            ..Default::default()
        }))
        .build();
    session.refresh_all().await;
    session.search("x").await;
    session.load_detail(MovieId(1)).await;
    let mut rx = session.subscribe();

    session.reset().await;

    let fresh = MoviesSession::builder().build().snapshot().await;
    assert_eq!(session.snapshot().await, fresh);
    assert_eq!(drain(&mut rx), vec![SESSION_SOURCE]);
}

#[tokio::test]
async fn reset_of_fresh_session_sends_one_event() {
    let session = MoviesSession::builder().build();
    let mut rx = session.subscribe();

    session.reset().await;

    assert_eq!(drain(&mut rx), vec![SESSION_SOURCE]);
}

#[test]
fn initial_loading_only_while_nothing_is_shown() {
    let mut snapshot = SessionSnapshot {
        now_playing: ListState::default(),
        popular: ListState::default(),
        details: DetailState::default(),
        search_error: None,
    };
    snapshot.popular.is_loading_initial = true;
    assert!(snapshot.is_initial_loading());

    snapshot.now_playing.items.push(movie(1, "A"));
    assert!(!snapshot.is_initial_loading());
}
