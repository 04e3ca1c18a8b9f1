//! Catalog endpoints consumed by the harvest.
//!
//! [`CatalogSource`] is the seam between the harvest logic and the network.
//! [`OpenLibraryClient`] talks to the real API; tests substitute fixtures.

use reqwest::blocking::Client;
use reqwest::Url;

use crate::config::{
    author_works_url, editions_url, parse_base_url, ratings_url, search_url, work_url,
    AUTHOR_TIMEOUT, EDITIONS_TIMEOUT, RATINGS_TIMEOUT, SEARCH_TIMEOUT, WORK_TIMEOUT,
};
use crate::error::Result;
use crate::http::{create_client, fetch_json, JsonObject};

/// Read-only access to the catalog resources used by a harvest.
///
/// Every method returns the response body as a JSON object, or an empty
/// object when the resource is unavailable. Implementations must not fail.
pub trait CatalogSource {
    /// One page of `search.json` results for a query.
    fn search(&self, query: &str, page: u32, limit: u32) -> JsonObject;

    /// Ratings summary of a work.
    fn ratings(&self, work_key: &str) -> JsonObject;

    /// Work resource.
    fn work(&self, work_key: &str) -> JsonObject;

    /// Snapshot of up to `limit` editions of a work.
    fn editions(&self, work_key: &str, limit: u32) -> JsonObject;

    /// Works listing of an author; only its `size` field is read.
    fn author_works(&self, author_key: &str) -> JsonObject;
}

/// HTTP implementation of [`CatalogSource`] for openlibrary.org or a mirror.
#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
    client: Client,
    base: Url,
}

impl OpenLibraryClient {
    /// Create a client for the given base URL, e.g. `https://openlibrary.org`.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            base: parse_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }
}

impl CatalogSource for OpenLibraryClient {
    fn search(&self, query: &str, page: u32, limit: u32) -> JsonObject {
        let url = search_url(&self.base, query, limit, page);
        fetch_json(&self.client, &url, SEARCH_TIMEOUT)
    }

    fn ratings(&self, work_key: &str) -> JsonObject {
        fetch_json(&self.client, &ratings_url(&self.base, work_key), RATINGS_TIMEOUT)
    }

    fn work(&self, work_key: &str) -> JsonObject {
        fetch_json(&self.client, &work_url(&self.base, work_key), WORK_TIMEOUT)
    }

    fn editions(&self, work_key: &str, limit: u32) -> JsonObject {
        let url = editions_url(&self.base, work_key, limit);
        fetch_json(&self.client, &url, EDITIONS_TIMEOUT)
    }

    fn author_works(&self, author_key: &str) -> JsonObject {
        let url = author_works_url(&self.base, author_key);
        fetch_json(&self.client, &url, AUTHOR_TIMEOUT)
    }
}
