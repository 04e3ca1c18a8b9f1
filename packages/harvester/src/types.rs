//! Core data types for the harvester.
//!
//! These types describe one OpenLibrary work as it moves through the harvest:
//! the search hit, the secondary lookups, and the flattened output row.

use serde_json::Value;

use crate::extract::search_languages;
use crate::http::JsonObject;

/// One entry of a `search.json` page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateDocument {
    /// Work key, e.g. `/works/OL45883W`.
    pub key: Option<String>,
    pub title: String,
    pub author_names: Vec<String>,
    /// Bare author ids as listed by search, e.g. `OL23919A`.
    pub author_keys: Vec<String>,
    pub first_publish_year: Option<i64>,
    pub edition_count: Option<u64>,
    /// Language codes from the search index, used as a fallback.
    pub languages: Vec<String>,
}

impl CandidateDocument {
    /// Build a candidate from a raw search document, ignoring wrong-typed fields.
    pub fn from_json(doc: &JsonObject) -> Self {
        let strings = |field: &str| -> Vec<String> {
            doc.get(field)
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            key: doc
                .get("key")
                .and_then(Value::as_str)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            title: doc
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            author_names: strings("author_name"),
            author_keys: strings("author_key"),
            first_publish_year: doc.get("first_publish_year").and_then(Value::as_i64),
            edition_count: doc.get("edition_count").and_then(Value::as_u64),
            languages: search_languages(doc.get("language")),
        }
    }
}

/// Aggregate rating of a work. Missing values stay missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingsSummary {
    pub count: Option<u64>,
    pub average: Option<f64>,
}

impl RatingsSummary {
    /// Whether the work passes the rating-count filter.
    ///
    /// # Examples
    /// ```
    /// use openlibrary_harvester::types::RatingsSummary;
    ///
    /// let summary = RatingsSummary { count: Some(5), average: Some(4.2) };
    /// assert!(summary.qualifies(5));
    /// assert!(!summary.qualifies(6));
    /// assert!(!RatingsSummary::default().qualifies(0));
    /// ```
    #[must_use]
    pub fn qualifies(&self, min_ratings: u64) -> bool {
        self.count.is_some_and(|count| count >= min_ratings)
    }
}

/// Details read from a work resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkDetail {
    pub subjects: Vec<String>,
    pub subject_people: Vec<String>,
    pub subject_places: Vec<String>,
    pub subject_times: Vec<String>,
    pub languages: Vec<String>,
    /// `number_of_pages_median` exactly as the work resource states it.
    pub pages_median: Option<Value>,
    pub series_name: Option<String>,
    /// Raw work resource, kept for author extraction.
    pub work: JsonObject,
}

/// Values inferred from a snapshot of a work's editions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditionAggregate {
    /// Median page count over all editions.
    pub pages_median: Option<u64>,
    /// Most frequent series label over all editions.
    pub series_name: Option<String>,
    /// Most frequent publisher among editions from the first-publish year.
    pub publisher: Option<String>,
    /// Most frequent place among editions from the first-publish year.
    pub publish_place: Option<String>,
    /// Distinct language codes, in first-seen order.
    pub languages: Vec<String>,
}

/// One row of the exported dataset.
///
/// Exported fields are declared in CSV column order; `work_key`,
/// `author_key` and `author_work_count` are bookkeeping for the harvest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputRow {
    pub work_key: String,
    pub author_key: Option<String>,

    pub title: String,
    pub author: String,
    pub first_publish_year: Option<i64>,
    pub edition_count: Option<u64>,
    pub subject: String,
    pub subject_people: String,
    pub subject_places: String,
    pub subject_times: String,
    pub language: Option<String>,
    pub series: Option<String>,
    pub number_of_pages_median: Option<Value>,
    pub publisher: Option<String>,
    pub publish_place: Option<String>,
    pub ratings_count: Option<u64>,
    pub ratings_average: Option<f64>,

    pub author_work_count: Option<u64>,
}

impl OutputRow {
    /// Column names in export order.
    pub const COLUMNS: [&'static str; 15] = [
        "title",
        "author",
        "first_publish_year",
        "edition_count",
        "subject",
        "subject_people",
        "subject_places",
        "subject_times",
        "language",
        "series",
        "number_of_pages_median",
        "publisher",
        "publish_place",
        "ratings_count",
        "ratings_average",
    ];

    /// Extra trailing column written when author statistics are enabled.
    pub const AUTHOR_WORK_COUNT_COLUMN: &'static str = "author_work_count";

    /// Cell values in export order. Absent values become empty cells.
    pub fn to_record(&self, with_author_stats: bool) -> Vec<String> {
        let mut record = vec![
            self.title.clone(),
            self.author.clone(),
            opt(self.first_publish_year),
            opt(self.edition_count),
            self.subject.clone(),
            self.subject_people.clone(),
            self.subject_places.clone(),
            self.subject_times.clone(),
            self.language.clone().unwrap_or_default(),
            self.series.clone().unwrap_or_default(),
            self.number_of_pages_median
                .as_ref()
                .map(render_value)
                .unwrap_or_default(),
            self.publisher.clone().unwrap_or_default(),
            self.publish_place.clone().unwrap_or_default(),
            opt(self.ratings_count),
            self.ratings_average.map(decimal).unwrap_or_default(),
        ];
        if with_author_stats {
            record.push(opt(self.author_work_count));
        }
        record
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render a float with at least one decimal place, e.g. `4.0` rather than `4`.
fn decimal(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// Render a pass-through JSON value as a cell: strings unquoted, `null` empty.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
