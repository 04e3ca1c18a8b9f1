//! HTTP client wrapper for the OpenLibrary endpoints.
//!
//! Every lookup in this crate goes through [`fetch_json`], which never fails:
//! a network error, a non-200 status or an undecodable body all come back as
//! an empty JSON object. Nothing is retried.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde_json::{Map, Value};

use crate::error::Result;

/// User agent sent with every request. The catalog rejects some default client agents.
const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; openlibrary-harvester/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Parsed JSON object returned by a catalog endpoint.
pub type JsonObject = Map<String, Value>;

/// Create a configured blocking HTTP client.
///
/// Timeouts are set per request, see [`fetch_json`].
pub fn create_client() -> Result<Client> {
    let client = Client::builder().user_agent(USER_AGENT).build()?;
    Ok(client)
}

/// GET a URL and return its JSON object body, or an empty object on any failure.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `url` - URL to fetch
/// * `timeout` - Timeout for this single request
pub fn fetch_json(client: &Client, url: &Url, timeout: Duration) -> JsonObject {
    let response = match client.get(url.clone()).timeout(timeout).send() {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, timeout = ?timeout, "Request failed");
            return JsonObject::new();
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        tracing::debug!(url = %url, status = %status, "Non-success status");
        return JsonObject::new();
    }

    let bytes = match response.bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Failed to read response body");
            return JsonObject::new();
        }
    };

    parse_object(&bytes).unwrap_or_else(|| {
        tracing::debug!(url = %url, bytes = bytes.len(), "Body is not a JSON object");
        JsonObject::new()
    })
}

/// Decode a body as a JSON object. `null` and other non-object values yield `None`.
fn parse_object(bytes: &[u8]) -> Option<JsonObject> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
