//! Send requests to a router and decode the answers.

use axum::http::StatusCode;
use axum_test_helper::TestClient;

/// `GET` the given URL, returning the status and the JSON body.
pub async fn get_json(router: axum::Router, url: &str) -> (StatusCode, serde_json::Value) {
    let client = TestClient::new(router);
    let response = client.get(url).send().await;
    let status = response.status();
    (status, response.json().await)
}

/// `GET` the given URL, returning the status and the body as text.
pub async fn get_text(router: axum::Router, url: &str) -> (StatusCode, String) {
    let client = TestClient::new(router);
    let response = client.get(url).send().await;
    let status = response.status();
    (status, response.text().await)
}

/// The `id` of every record of a list response, in order.
pub fn ids(body: &serde_json::Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|row| row["id"].as_i64()).collect())
        .unwrap_or_default()
}
