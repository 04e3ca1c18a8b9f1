//! Configuration constants, harvest settings and endpoint URL builders.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::{HarvesterError, Result};

/// Base URL of the OpenLibrary catalog.
pub const OPENLIBRARY_BASE_URL: &str = "https://openlibrary.org";

/// Topical queries scanned in order by a default harvest.
pub const DEFAULT_QUERIES: &[&str] = &[
    "fiction",
    "novel",
    "classics",
    "literature",
    "fantasy",
    "science fiction",
    "mystery",
    "thriller",
    "horror",
    "romance",
    "young adult",
    "historical fiction",
    "nonfiction",
];

/// Timeout for `search.json` requests. Search pages are the slowest endpoint.
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(25);

/// Timeout for `ratings.json` requests.
pub const RATINGS_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for work detail requests.
pub const WORK_TIMEOUT: Duration = Duration::from_secs(20);

/// Timeout for `editions.json` requests.
pub const EDITIONS_TIMEOUT: Duration = Duration::from_secs(20);

/// Timeout for author works requests.
pub const AUTHOR_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum page size accepted by `search.json`.
pub const MAX_SEARCH_LIMIT: u32 = 100;

/// Settings for a single harvest run.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestConfig {
    /// Number of rows to collect across all queries.
    pub target_books: usize,
    /// Minimum rating count for a work to be kept.
    pub min_ratings: u64,
    /// Consecutive rating-filter failures after which a query is abandoned.
    pub max_skips_without_rating: usize,
    /// Fixed delay after every remote call.
    pub pause: Duration,
    /// Upper bound of the random delay added after an accepted row.
    pub jitter: Duration,
    /// Maximum number of search pages scanned per query.
    pub max_pages_per_query: u32,
    /// Use `editions.json` to fill pages, series, publisher, place and languages.
    pub use_editions_fallback: bool,
    /// Write the CSV file at the end of the run.
    pub output_csv: bool,
    /// Number of editions requested per work.
    pub editions_limit: u32,
    /// Number of search results requested per page.
    pub search_limit: u32,
    /// Queries scanned in order.
    pub queries: Vec<String>,
    /// Look up the primary author and attach `author_work_count`.
    pub author_stats: bool,
    /// Directory the CSV file is written to.
    pub output_dir: PathBuf,
    /// Catalog base URL.
    pub base_url: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            target_books: 1000,
            min_ratings: 5,
            max_skips_without_rating: 50,
            pause: Duration::from_millis(200),
            jitter: Duration::from_millis(100),
            max_pages_per_query: 20,
            use_editions_fallback: true,
            output_csv: true,
            editions_limit: 200,
            search_limit: MAX_SEARCH_LIMIT,
            queries: DEFAULT_QUERIES.iter().map(|q| (*q).to_string()).collect(),
            author_stats: false,
            output_dir: PathBuf::from("."),
            base_url: OPENLIBRARY_BASE_URL.to_string(),
        }
    }
}

impl HarvestConfig {
    pub fn with_target_books(mut self, target_books: usize) -> Self {
        self.target_books = target_books;
        self
    }

    pub fn with_min_ratings(mut self, min_ratings: u64) -> Self {
        self.min_ratings = min_ratings;
        self
    }

    pub fn with_max_skips_without_rating(mut self, max_skips: usize) -> Self {
        self.max_skips_without_rating = max_skips;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_max_pages_per_query(mut self, max_pages: u32) -> Self {
        self.max_pages_per_query = max_pages;
        self
    }

    pub fn with_editions_fallback(mut self, enabled: bool) -> Self {
        self.use_editions_fallback = enabled;
        self
    }

    pub fn with_output_csv(mut self, enabled: bool) -> Self {
        self.output_csv = enabled;
        self
    }

    pub fn with_editions_limit(mut self, limit: u32) -> Self {
        self.editions_limit = limit;
        self
    }

    pub fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn with_queries<I, S>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queries = queries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_author_stats(mut self, enabled: bool) -> Self {
        self.author_stats = enabled;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Check the settings before any request is made.
    ///
    /// # Examples
    /// ```
    /// use openlibrary_harvester::config::HarvestConfig;
    ///
    /// assert!(HarvestConfig::default().validate().is_ok());
    /// assert!(HarvestConfig::default().with_target_books(0).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.target_books == 0 {
            return Err(invalid("target_books must be at least 1"));
        }
        if self.max_pages_per_query == 0 {
            return Err(invalid("max_pages_per_query must be at least 1"));
        }
        if self.max_skips_without_rating == 0 {
            return Err(invalid("max_skips_without_rating must be at least 1"));
        }
        if self.search_limit == 0 || self.search_limit > MAX_SEARCH_LIMIT {
            return Err(invalid(&format!(
                "search_limit must be between 1 and {MAX_SEARCH_LIMIT}, got {}",
                self.search_limit
            )));
        }
        if self.editions_limit == 0 {
            return Err(invalid("editions_limit must be at least 1"));
        }
        if self.queries.iter().all(|q| q.trim().is_empty()) {
            return Err(invalid("at least one non-empty query is required"));
        }
        parse_base_url(&self.base_url)?;
        Ok(())
    }
}

fn invalid(message: &str) -> HarvesterError {
    HarvesterError::InvalidConfig(message.to_string())
}

/// Parse and check a catalog base URL.
///
/// # Examples
/// ```
/// use openlibrary_harvester::config::parse_base_url;
///
/// assert!(parse_base_url("https://openlibrary.org").is_ok());
/// assert!(parse_base_url("ftp://openlibrary.org").is_err());
/// assert!(parse_base_url("not a url").is_err());
/// ```
pub fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| HarvesterError::InvalidUrl(format!("{base_url}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(HarvesterError::InvalidUrl(format!(
            "{base_url}: expected an http(s) base URL"
        )));
    }
    Ok(url)
}

/// Join a catalog path onto the base URL, dropping any query string.
fn endpoint(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!("{}{}", base.path().trim_end_matches('/'), path);
    url.set_path(&joined);
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Build a `search.json` URL for one page of a query.
pub fn search_url(base: &Url, query: &str, limit: u32, page: u32) -> Url {
    let mut url = endpoint(base, "/search.json");
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("limit", &limit.to_string())
        .append_pair("page", &page.to_string());
    url
}

/// Build the ratings summary URL for a work key such as `/works/OL45883W`.
pub fn ratings_url(base: &Url, work_key: &str) -> Url {
    endpoint(base, &format!("{work_key}/ratings.json"))
}

/// Build the work detail URL for a work key.
pub fn work_url(base: &Url, work_key: &str) -> Url {
    endpoint(base, &format!("{work_key}.json"))
}

/// Build the editions snapshot URL for a work key.
pub fn editions_url(base: &Url, work_key: &str, limit: u32) -> Url {
    let mut url = endpoint(base, &format!("{work_key}/editions.json"));
    url.query_pairs_mut()
        .append_pair("limit", &limit.to_string());
    url
}

/// Build the author works URL for an author key such as `/authors/OL23919A`.
///
/// Only the `size` field of the response is used, so a single entry is requested.
pub fn author_works_url(base: &Url, author_key: &str) -> Url {
    let mut url = endpoint(base, &format!("{author_key}/works.json"));
    url.query_pairs_mut().append_pair("limit", "1");
    url
}

/// File name of the exported dataset for a given row count.
pub fn output_file_name(row_count: usize) -> String {
    format!("openlibrary_{row_count}.csv")
}
