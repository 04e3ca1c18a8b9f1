//! Main harvest loop that ties all components together.
//!
//! The loop walks queries, then search pages, then documents. A document is
//! kept when its rating count reaches `min_ratings`; a query is abandoned
//! after `max_skips_without_rating` consecutive documents fail that filter.
//! All accumulated data lives in [`HarvestState`], which is passed in and
//! handed back so callers (and tests) control it explicitly.

use std::collections::{HashMap, HashSet};
use std::thread;
use std::time::Duration;

use rand::Rng;
use serde_json::Value;

use crate::config::HarvestConfig;
use crate::enrich::enrich_candidate;
use crate::error::Result;
use crate::http::JsonObject;
use crate::lookup::{get_author_work_count, get_ratings};
use crate::source::CatalogSource;
use crate::types::{CandidateDocument, OutputRow};

/// A progress line is logged every this many accepted rows.
const PROGRESS_LOG_INTERVAL: usize = 20;

/// Performs the politeness delays between catalog requests.
pub trait Pacer {
    fn pause(&mut self, duration: Duration);
}

/// Pacer that blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Counters describing what a harvest did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStats {
    pub queries_started: usize,
    pub queries_abandoned: usize,
    pub pages_fetched: usize,
    /// Documents whose ratings were looked up.
    pub documents_evaluated: usize,
    /// Documents rejected by the rating filter.
    pub low_rating_skips: usize,
    /// Documents skipped because their work was already accepted.
    pub duplicates_skipped: usize,
}

/// Everything accumulated by a harvest run.
#[derive(Debug, Clone, Default)]
pub struct HarvestState {
    /// Accepted rows in insertion order.
    pub rows: Vec<OutputRow>,
    /// Work keys of accepted rows.
    pub seen: HashSet<String>,
    /// Author key to work count; `None` records a lookup that found nothing.
    pub author_cache: HashMap<String, Option<u64>>,
    pub stats: HarvestStats,
}

impl HarvestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn accept(&mut self, row: OutputRow) {
        self.seen.insert(row.work_key.clone());
        self.rows.push(row);
    }
}

/// How a single query ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryOutcome {
    /// Page cap reached or a page came back empty.
    Exhausted,
    /// Too many consecutive documents failed the rating filter.
    Abandoned,
    TargetReached,
}

/// Run a harvest.
///
/// # Arguments
/// * `source` - Catalog endpoints
/// * `pacer` - Performs the delays between requests
/// * `config` - Harvest settings, validated before any request
/// * `state` - Starting state, usually [`HarvestState::new`]
/// * `on_row` - Called with each accepted row and the new row count
///
/// # Returns
/// The final state, holding at most `config.target_books` rows.
pub fn harvest<S, P, F>(
    source: &S,
    pacer: &mut P,
    config: &HarvestConfig,
    state: HarvestState,
    on_row: F,
) -> Result<HarvestState>
where
    S: CatalogSource + ?Sized,
    P: Pacer + ?Sized,
    F: FnMut(&OutputRow, usize),
{
    config.validate()?;

    let mut run = Run {
        source,
        pacer,
        config,
        state,
        on_row,
    };

    for query in config.queries.iter().filter(|q| !q.trim().is_empty()) {
        if run.target_reached() {
            break;
        }
        tracing::info!(query = %query, rows = run.state.len(), "Starting query");
        run.state.stats.queries_started += 1;

        match run.harvest_query(query) {
            QueryOutcome::TargetReached => break,
            QueryOutcome::Abandoned => run.state.stats.queries_abandoned += 1,
            QueryOutcome::Exhausted => {}
        }
    }

    let state = run.state;
    tracing::info!(
        rows = state.len(),
        target = config.target_books,
        queries = state.stats.queries_started,
        abandoned = state.stats.queries_abandoned,
        pages = state.stats.pages_fetched,
        evaluated = state.stats.documents_evaluated,
        low_rating = state.stats.low_rating_skips,
        "Harvest finished"
    );
    Ok(state)
}

struct Run<'a, S: ?Sized, P: ?Sized, F> {
    source: &'a S,
    pacer: &'a mut P,
    config: &'a HarvestConfig,
    state: HarvestState,
    on_row: F,
}

impl<S, P, F> Run<'_, S, P, F>
where
    S: CatalogSource + ?Sized,
    P: Pacer + ?Sized,
    F: FnMut(&OutputRow, usize),
{
    fn target_reached(&self) -> bool {
        self.state.len() >= self.config.target_books
    }

    fn harvest_query(&mut self, query: &str) -> QueryOutcome {
        let mut consecutive_skips = 0usize;

        for page in 1..=self.config.max_pages_per_query {
            if self.target_reached() {
                return QueryOutcome::TargetReached;
            }

            let body = self
                .source
                .search(query, page, self.config.search_limit);
            self.state.stats.pages_fetched += 1;
            let docs = page_documents(body);
            if docs.is_empty() {
                tracing::debug!(query, page, "No more search results");
                return QueryOutcome::Exhausted;
            }
            tracing::debug!(query, page, docs = docs.len(), "Fetched search page");

            for raw in &docs {
                if self.target_reached() {
                    return QueryOutcome::TargetReached;
                }

                let doc = CandidateDocument::from_json(raw);
                let Some(work_key) = doc.key.as_deref() else {
                    continue;
                };
                if self.state.seen.contains(work_key) {
                    self.state.stats.duplicates_skipped += 1;
                    continue;
                }

                self.state.stats.documents_evaluated += 1;
                let ratings = get_ratings(self.source, work_key);
                if !ratings.qualifies(self.config.min_ratings) {
                    consecutive_skips += 1;
                    self.state.stats.low_rating_skips += 1;
                    if consecutive_skips >= self.config.max_skips_without_rating {
                        tracing::warn!(
                            query,
                            page,
                            skips = consecutive_skips,
                            "Too many works below the rating minimum in a row, moving to next query"
                        );
                        return QueryOutcome::Abandoned;
                    }
                    self.pacer.pause(self.config.pause);
                    continue;
                }
                consecutive_skips = 0;

                let mut row = enrich_candidate(self.source, self.config, &doc, work_key, ratings);
                self.attach_author_stats(&mut row);
                self.state.accept(row);
                self.report_progress();

                let delay = self.config.pause + jitter(self.config.jitter);
                self.pacer.pause(delay);
            }

            self.pacer.pause(self.config.pause);
        }

        QueryOutcome::Exhausted
    }

    /// Fill `author_work_count` from the cache or a single lookup per author.
    fn attach_author_stats(&mut self, row: &mut OutputRow) {
        let Some(author_key) = row.author_key.as_deref() else {
            return;
        };
        if !self.config.author_stats {
            tracing::trace!(work_key = %row.work_key, author_key, "Author stats disabled");
            return;
        }

        let work_count = match self.state.author_cache.get(author_key) {
            Some(cached) => *cached,
            None => {
                let count = get_author_work_count(self.source, author_key);
                self.state
                    .author_cache
                    .insert(author_key.to_string(), count);
                self.pacer.pause(self.config.pause);
                count
            }
        };
        row.author_work_count = work_count;
    }

    fn report_progress(&mut self) {
        let count = self.state.len();
        let Some(last) = self.state.rows.last() else {
            return;
        };
        (self.on_row)(last, count);

        if count % PROGRESS_LOG_INTERVAL == 0 {
            tracing::info!(
                rows = count,
                title = %last.title,
                ratings_average = ?last.ratings_average,
                ratings_count = ?last.ratings_count,
                language = ?last.language,
                series = ?last.series,
                "Harvest progress"
            );
        }
    }
}

/// Search result documents of a page; non-object entries are dropped.
fn page_documents(mut body: JsonObject) -> Vec<JsonObject> {
    match body.remove("docs") {
        Some(Value::Array(docs)) => docs
            .into_iter()
            .filter_map(|doc| match doc {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Uniform random delay in `[0, max)`.
fn jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    rand::thread_rng().gen_range(Duration::ZERO..max)
}
