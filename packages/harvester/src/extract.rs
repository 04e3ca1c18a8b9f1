//! Field extractors for loosely-typed catalog responses.
//!
//! OpenLibrary documents are inconsistent: the same field can be a string, a
//! list, an object, `null` or missing altogether depending on who edited the
//! record. Every function here is pure and treats an absent, wrong-typed or
//! empty field as "no information" rather than an error.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::http::JsonObject;
use crate::types::CandidateDocument;

/// Prefix of language keys, e.g. `/languages/eng`.
const LANGUAGE_PREFIX: &str = "/languages/";

/// Prefix of author keys, e.g. `/authors/OL23919A`.
const AUTHOR_PREFIX: &str = "/authors/";

/// First run of four digits in a free-text publish date.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}").expect("valid regex"));

/// Extract language codes from a `languages` list of `{"key": "/languages/xxx"}` objects.
///
/// # Examples
/// ```
/// use openlibrary_harvester::extract::language_codes;
/// use serde_json::json;
///
/// let languages = json!([{"key": "/languages/eng"}, {"key": "/languages/fre"}]);
/// assert_eq!(language_codes(Some(&languages)), vec!["eng", "fre"]);
/// assert!(language_codes(None).is_empty());
/// ```
pub fn language_codes(languages: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = languages else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| item.get("key")?.as_str())
        .filter(|key| key.starts_with(LANGUAGE_PREFIX))
        .filter_map(|key| key.rsplit('/').next())
        .map(str::to_string)
        .collect()
}

/// Language codes of a work or edition resource.
pub fn parse_languages(resource: &JsonObject) -> Vec<String> {
    language_codes(resource.get("languages"))
}

/// String elements of a list-valued field. Missing or non-list fields yield an empty list.
pub fn string_list(resource: &JsonObject, field: &str) -> Vec<String> {
    match resource.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Scalar elements of the search document `language` field, rendered as text.
pub fn search_languages(language: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = language else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

/// Series name declared on a work resource.
///
/// A string is trimmed; for a list the first element is used. Values that
/// are empty after trimming count as absent.
pub fn work_series(resource: &JsonObject) -> Option<String> {
    let series = match resource.get("series")? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => match items.first()? {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string().trim().to_string(),
        },
        _ => return None,
    };
    non_empty(series)
}

/// Every non-empty series label on an edition (string or list of strings).
pub fn edition_series_labels(edition: &JsonObject) -> Vec<String> {
    match edition.get("series") {
        Some(Value::String(s)) => trimmed(s).into_iter().collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(trimmed)
            .collect(),
        _ => Vec::new(),
    }
}

/// Positive page count of an edition, truncated to an integer.
pub fn page_count(edition: &JsonObject) -> Option<u64> {
    let pages = edition.get("number_of_pages")?.as_f64()?;
    (pages > 0.0).then_some(pages.trunc() as u64)
}

/// Publication year of an edition.
///
/// Takes the smallest integer in `publish_year`, then falls back to the
/// first four-digit run in the free-text `publish_date`.
///
/// # Examples
/// ```
/// use openlibrary_harvester::extract::edition_year;
/// use serde_json::json;
///
/// let edition = json!({"publish_date": "March 1950"});
/// assert_eq!(edition_year(edition.as_object().unwrap()), Some(1950));
///
/// let edition = json!({"publish_year": [1962, 1951], "publish_date": "1970"});
/// assert_eq!(edition_year(edition.as_object().unwrap()), Some(1951));
/// ```
pub fn edition_year(edition: &JsonObject) -> Option<i64> {
    let listed = match edition.get("publish_year") {
        Some(Value::Array(years)) => years.iter().filter_map(Value::as_i64).min(),
        _ => None,
    };

    listed.or_else(|| {
        let date = edition.get("publish_date")?.as_str()?;
        YEAR_PATTERN.find(date)?.as_str().parse().ok()
    })
}

/// First non-empty publisher listed on an edition.
pub fn first_publisher(edition: &JsonObject) -> Option<String> {
    first_non_empty(edition.get("publishers"))
}

/// Place of publication of an edition.
///
/// Precedence: `publish_places` list, then `publish_place` (list or string),
/// then `publish_country`.
pub fn publish_place(edition: &JsonObject) -> Option<String> {
    first_non_empty(edition.get("publish_places"))
        .or_else(|| match edition.get("publish_place") {
            Some(Value::String(s)) => trimmed(s),
            other => first_non_empty(other),
        })
        .or_else(|| edition.get("publish_country")?.as_str().and_then(trimmed))
}

/// Primary author key of a work.
///
/// Prefers `authors[0].author.key` from the work resource, used verbatim,
/// and falls back to the first search `author_key`, normalised to the
/// `/authors/<id>` form.
pub fn primary_author_key(doc: &CandidateDocument, work: &JsonObject) -> Option<String> {
    let from_work = work
        .get("authors")
        .and_then(Value::as_array)
        .and_then(|authors| authors.first())
        .and_then(|first| first.get("author"))
        .and_then(|author| author.get("key"))
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty());

    if let Some(key) = from_work {
        return Some(key.to_string());
    }

    doc.author_keys.first().map(|key| {
        if key.starts_with(AUTHOR_PREFIX) {
            key.clone()
        } else {
            format!("{AUTHOR_PREFIX}{key}")
        }
    })
}

/// Integer median; the mean of the two middle values is truncated for even counts.
///
/// # Examples
/// ```
/// use openlibrary_harvester::extract::integer_median;
///
/// assert_eq!(integer_median(&[300, 100, 200]), Some(200));
/// assert_eq!(integer_median(&[100, 201]), Some(150));
/// assert_eq!(integer_median(&[]), None);
/// ```
pub fn integer_median(values: &[u64]) -> Option<u64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some(floor_midpoint(sorted[mid - 1], sorted[mid]))
    }
}

/// `(a + b) / 2` rounded down, without overflowing on large page counts.
fn floor_midpoint(a: u64, b: u64) -> u64 {
    a / 2 + b / 2 + (a % 2 + b % 2) / 2
}

/// Occurrence counter that remembers first-insertion order.
///
/// `most_common` breaks ties in favour of the label that was seen first.
#[derive(Debug, Clone, Default)]
pub struct FrequencyCounter {
    counts: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: impl Into<String>) {
        let label = label.into();
        match self.index.get(&label) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(label.clone(), self.counts.len());
                self.counts.push((label, 1));
            }
        }
    }

    /// Label with the highest count, earliest first-seen label on ties.
    pub fn most_common(&self) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.counts {
            match best {
                Some(current) if current.1 >= entry.1 => {}
                _ => best = Some(entry),
            }
        }
        best.map(|(label, _)| label.as_str())
    }
}

fn first_non_empty(list: Option<&Value>) -> Option<String> {
    list?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .find_map(trimmed)
}

fn trimmed(s: &str) -> Option<String> {
    non_empty(s.trim().to_string())
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}
