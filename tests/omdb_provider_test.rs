//! Wire-level tests for the OMDb provider against a mock HTTP server.

use screendex::config::OmdbConfig;
use screendex::metadata::provider::SecondaryProvider;
use screendex::metadata::providers::OmdbProvider;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> OmdbProvider {
    OmdbProvider::new(&OmdbConfig {
        api_key: "test-key".to_string(),
        base_url: server.uri(),
    })
}

#[tokio::test]
async fn lookup_by_id_parses_and_normalizes_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("apikey", "test-key"))
        .and(query_param("i", "tt1375666"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Response": "True",
            "Title": "Inception",
            "Year": "2010",
            "Runtime": "148 min",
            "Genre": "Action, Adventure, Sci-Fi",
            "Director": "Christopher Nolan",
            "Actors": "Leonardo DiCaprio, Joseph Gordon-Levitt",
            "Plot": "A thief who steals corporate secrets.",
            "Poster": "N/A",
            "Ratings": [
                {"Source": "Internet Movie Database", "Value": "8.8/10"},
                {"Source": "Metacritic", "Value": "74/100"}
            ]
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let supp = provider
        .lookup_by_external_id("tt1375666")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(supp.title.as_deref(), Some("Inception"));
    assert_eq!(supp.year, Some(2010));
    assert_eq!(supp.runtime.as_deref(), Some("148 min"));
    assert_eq!(supp.director.as_deref(), Some("Christopher Nolan"));
    assert_eq!(
        supp.actors,
        vec!["Leonardo DiCaprio", "Joseph Gordon-Levitt"]
    );
    assert_eq!(supp.genres, vec!["Action", "Adventure", "Sci-Fi"]);
    // "N/A" never leaks through as a value.
    assert_eq!(supp.poster_url, None);
    assert_eq!(
        supp.ratings.get("Metacritic").map(String::as_str),
        Some("74/100")
    );
}

#[tokio::test]
async fn unknown_title_is_not_found_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Response": "False",
            "Error": "Movie not found!"
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let result = provider.lookup_by_external_id("tt0000000").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn title_lookup_sends_title_and_year_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("t", "Heat"))
        .and(query_param("y", "1995"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Response": "True",
            "Title": "Heat",
            "Year": "1995"
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let supp = provider
        .lookup_by_title("Heat", Some(1995))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(supp.title.as_deref(), Some("Heat"));
}

#[tokio::test]
async fn http_error_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    assert!(provider.lookup_by_external_id("tt1375666").await.is_err());
}
