use super::*;
use crate::domain::MovieId;

#[test]
fn decodes_now_playing_body_with_dates() {
    let raw = r#"{
        "dates": {"maximum": "2024-06-12", "minimum": "2024-04-25"},
        "page": 1,
        "results": [
            {"id": 1, "title": "First", "overview": "o", "poster_path": "/a.jpg", "vote_average": 7.25},
            {"id": 2, "title": "Second", "overview": "", "release_date": "2024-05-01"}
        ],
        "total_pages": 3,
        "total_results": 41
    }"#;

    let response: MovieResponse = serde_json::from_str(raw).expect("decode");
    assert_eq!(
        response.dates,
        Some(ResponseDates {
            maximum: "2024-06-12".into(),
            minimum: "2024-04-25".into(),
        })
    );

    let page = FetchPage::from(response);
    assert_eq!(page.total_pages, Some(3));
    let ids: Vec<MovieId> = page.results.iter().map(|movie| movie.id).collect();
    assert_eq!(ids, vec![MovieId(1), MovieId(2)]);
    assert_eq!(page.results[1].release_year(), Some(2024));
}

#[test]
fn zero_total_pages_is_treated_as_unknown() {
    let raw = r#"{"page": 1, "results": [], "total_pages": 0, "total_results": 0}"#;
    let response: MovieResponse = serde_json::from_str(raw).expect("decode");
    assert_eq!(FetchPage::from(response).total_pages, None);
}

#[test]
fn missing_results_is_a_decoding_failure() {
    let err = serde_json::from_str::<MovieResponse>(r#"{"page": 1}"#)
        .map_err(crate::error::CatalogError::from)
        .expect_err("results are required");
    assert_eq!(err.kind, crate::error::ErrorKind::DecodingFailure);
}
