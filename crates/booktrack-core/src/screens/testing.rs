//! Helpers shared by the screen tests.

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::MockServer;

use crate::api::ApiClient;
use crate::auth::Session;

/// Client against `server`, logged in with `token` if given.
pub fn client_for(server: &MockServer, token: Option<&str>) -> ApiClient {
    let session = Arc::new(Session::in_memory());
    if let Some(token) = token {
        session.begin(token).expect("Failed to start test session");
    }
    ApiClient::new(&server.uri(), session).expect("Failed to build client")
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

pub fn book_json(id: &str, title: &str, pages: u32) -> Value {
    json!({
        "_id": id,
        "title": title,
        "author": "Herbert",
        "genre": "SF",
        "description": "...",
        "totalPages": pages
    })
}
