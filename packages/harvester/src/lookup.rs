//! Secondary lookups performed for each candidate work.
//!
//! Each lookup makes exactly one catalog call and reduces the response to a
//! typed summary. Malformed responses reduce to empty summaries.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::extract::{
    edition_series_labels, edition_year, first_publisher, integer_median, page_count,
    parse_languages, publish_place, string_list, work_series, FrequencyCounter,
};
use crate::http::JsonObject;
use crate::source::CatalogSource;
use crate::types::{EditionAggregate, RatingsSummary, WorkDetail};

/// Envelope of `ratings.json`.
#[derive(Debug, Default, Deserialize)]
struct RatingsResponse {
    #[serde(default)]
    summary: Option<RawSummary>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSummary {
    #[serde(default)]
    count: Value,
    #[serde(default)]
    average: Value,
}

/// Envelope of `editions.json`.
#[derive(Debug, Default, Deserialize)]
struct EditionsResponse {
    #[serde(default)]
    entries: Option<Vec<Value>>,
}

/// Envelope of an author `works.json` listing.
#[derive(Debug, Default, Deserialize)]
struct AuthorWorksResponse {
    #[serde(default)]
    size: Option<u64>,
}

/// Decode an envelope, falling back to its empty form when the shape is wrong.
fn decode<T: Default + DeserializeOwned>(body: JsonObject) -> T {
    serde_json::from_value(Value::Object(body)).unwrap_or_default()
}

/// Fetch the rating count and average of a work.
///
/// Non-numeric or negative counts and non-numeric averages are reported as absent.
pub fn get_ratings<S: CatalogSource + ?Sized>(source: &S, work_key: &str) -> RatingsSummary {
    let response: RatingsResponse = decode(source.ratings(work_key));
    let Some(summary) = response.summary else {
        return RatingsSummary::default();
    };

    RatingsSummary {
        count: summary
            .count
            .as_f64()
            .filter(|count| *count >= 0.0)
            .map(|count| count.trunc() as u64),
        average: summary.average.as_f64(),
    }
}

/// Fetch a work resource and extract its subjects, languages, pages and series.
pub fn get_work_details<S: CatalogSource + ?Sized>(source: &S, work_key: &str) -> WorkDetail {
    let work = source.work(work_key);
    parse_work_detail(work)
}

/// Reduce a work resource to a [`WorkDetail`].
pub fn parse_work_detail(work: JsonObject) -> WorkDetail {
    WorkDetail {
        subjects: string_list(&work, "subjects"),
        subject_people: string_list(&work, "subject_people"),
        subject_places: string_list(&work, "subject_places"),
        subject_times: string_list(&work, "subject_times"),
        languages: parse_languages(&work),
        pages_median: work
            .get("number_of_pages_median")
            .filter(|value| !value.is_null())
            .cloned(),
        series_name: work_series(&work),
        work,
    }
}

/// Fetch an editions snapshot and aggregate it.
///
/// Publisher and place only come from editions published in
/// `first_publish_year`; the catalog has no "original edition" marker.
pub fn infer_from_editions<S: CatalogSource + ?Sized>(
    source: &S,
    work_key: &str,
    first_publish_year: Option<i64>,
    limit: u32,
) -> EditionAggregate {
    let response: EditionsResponse = decode(source.editions(work_key, limit));
    let entries = response.entries.unwrap_or_default();
    tracing::trace!(work_key, editions = entries.len(), "Fetched editions snapshot");
    aggregate_editions(&entries, first_publish_year)
}

/// Aggregate edition entries into pages median, series, publisher, place and languages.
///
/// Entries that are not JSON objects are ignored.
pub fn aggregate_editions(entries: &[Value], first_publish_year: Option<i64>) -> EditionAggregate {
    let mut pages = Vec::new();
    let mut series = FrequencyCounter::new();
    let mut publishers = FrequencyCounter::new();
    let mut places = FrequencyCounter::new();
    let mut languages = Vec::new();
    let mut seen_languages = HashSet::new();

    for edition in entries.iter().filter_map(Value::as_object) {
        if let Some(count) = page_count(edition) {
            pages.push(count);
        }

        for label in edition_series_labels(edition) {
            series.add(label);
        }

        for code in parse_languages(edition) {
            if seen_languages.insert(code.clone()) {
                languages.push(code);
            }
        }

        let from_first_year =
            first_publish_year.is_some() && edition_year(edition) == first_publish_year;
        if from_first_year {
            if let Some(publisher) = first_publisher(edition) {
                publishers.add(publisher);
            }
            if let Some(place) = publish_place(edition) {
                places.add(place);
            }
        }
    }

    EditionAggregate {
        pages_median: integer_median(&pages),
        series_name: series.most_common().map(str::to_string),
        publisher: publishers.most_common().map(str::to_string),
        publish_place: places.most_common().map(str::to_string),
        languages,
    }
}

/// Number of works the catalog lists for an author.
pub fn get_author_work_count<S: CatalogSource + ?Sized>(
    source: &S,
    author_key: &str,
) -> Option<u64> {
    let response: AuthorWorksResponse = decode(source.author_works(author_key));
    response.size
}
