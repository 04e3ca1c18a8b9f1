//! Fixture-backed catalog and pacer shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use openlibrary_harvester::http::JsonObject;
use openlibrary_harvester::{CatalogSource, Pacer};
use serde_json::{json, Value};

/// A request made against [`FixtureSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search { query: String, page: u32 },
    Ratings(String),
    Work(String),
    Editions(String),
    AuthorWorks(String),
}

/// In-memory catalog. Unknown resources answer with an empty object,
/// exactly like a failed request against the real API.
#[derive(Debug, Default)]
pub struct FixtureSource {
    pages: HashMap<(String, u32), Value>,
    ratings: HashMap<String, Value>,
    works: HashMap<String, Value>,
    editions: HashMap<String, Value>,
    authors: HashMap<String, Value>,
    calls: RefCell<Vec<Call>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a search page made of the given documents.
    pub fn page(mut self, query: &str, page: u32, docs: Vec<Value>) -> Self {
        self.pages
            .insert((query.to_string(), page), json!({ "docs": docs }));
        self
    }

    /// Register a ratings summary.
    pub fn rated(mut self, work_key: &str, count: u64, average: f64) -> Self {
        self.ratings.insert(
            work_key.to_string(),
            json!({"summary": {"count": count, "average": average}}),
        );
        self
    }

    pub fn work(mut self, work_key: &str, body: Value) -> Self {
        self.works.insert(work_key.to_string(), body);
        self
    }

    pub fn editions(mut self, work_key: &str, entries: Vec<Value>) -> Self {
        self.editions
            .insert(work_key.to_string(), json!({ "entries": entries }));
        self
    }

    pub fn author(mut self, author_key: &str, size: u64) -> Self {
        self.authors
            .insert(author_key.to_string(), json!({"size": size, "entries": []}));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn ratings_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Ratings(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn search_calls(&self) -> Vec<(String, u32)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search { query, page } => Some((query, page)),
                _ => None,
            })
            .collect()
    }

    fn answer(&self, call: Call, body: Option<&Value>) -> JsonObject {
        self.calls.borrow_mut().push(call);
        body.and_then(Value::as_object).cloned().unwrap_or_default()
    }
}

impl CatalogSource for FixtureSource {
    fn search(&self, query: &str, page: u32, _limit: u32) -> JsonObject {
        let call = Call::Search {
            query: query.to_string(),
            page,
        };
        self.answer(call, self.pages.get(&(query.to_string(), page)))
    }

    fn ratings(&self, work_key: &str) -> JsonObject {
        self.answer(Call::Ratings(work_key.to_string()), self.ratings.get(work_key))
    }

    fn work(&self, work_key: &str) -> JsonObject {
        self.answer(Call::Work(work_key.to_string()), self.works.get(work_key))
    }

    fn editions(&self, work_key: &str, _limit: u32) -> JsonObject {
        self.answer(Call::Editions(work_key.to_string()), self.editions.get(work_key))
    }

    fn author_works(&self, author_key: &str) -> JsonObject {
        self.answer(
            Call::AuthorWorks(author_key.to_string()),
            self.authors.get(author_key),
        )
    }
}

/// Pacer that records requested delays instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingPacer {
    pub pauses: Vec<Duration>,
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

/// Minimal search document for a work.
pub fn doc(work_key: &str, title: &str) -> Value {
    json!({
        "key": work_key,
        "title": title,
        "author_name": ["Test Author"],
        "author_key": ["OL1A"],
        "first_publish_year": 1950,
        "edition_count": 3,
    })
}
