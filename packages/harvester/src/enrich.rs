//! Merge the per-work lookups into one output row.
//!
//! Precedence rules:
//! - languages: work resource, then search document, then editions;
//! - pages median and series: work resource, then editions;
//! - publisher and place: editions only (year-scoped), overwriting any prior value.

use crate::config::HarvestConfig;
use crate::extract::primary_author_key;
use crate::lookup::{get_work_details, infer_from_editions};
use crate::source::CatalogSource;
use crate::types::{CandidateDocument, EditionAggregate, OutputRow, RatingsSummary, WorkDetail};

/// Separator for list-valued text columns.
const LIST_SEPARATOR: &str = ", ";

/// Run the work and editions lookups for a qualifying candidate and build its row.
pub fn enrich_candidate<S: CatalogSource + ?Sized>(
    source: &S,
    config: &HarvestConfig,
    doc: &CandidateDocument,
    work_key: &str,
    ratings: RatingsSummary,
) -> OutputRow {
    let detail = get_work_details(source, work_key);
    let editions = config.use_editions_fallback.then(|| {
        infer_from_editions(
            source,
            work_key,
            doc.first_publish_year,
            config.editions_limit,
        )
    });
    build_row(doc, work_key, ratings, detail, editions)
}

/// Combine a search document with its lookups, applying the fallback chain.
///
/// `editions` is `None` when the editions fallback is disabled.
pub fn build_row(
    doc: &CandidateDocument,
    work_key: &str,
    ratings: RatingsSummary,
    detail: WorkDetail,
    editions: Option<EditionAggregate>,
) -> OutputRow {
    let mut languages = detail.languages;
    if languages.is_empty() {
        languages = doc.languages.clone();
    }

    let mut pages_median = detail.pages_median;
    let mut series = detail.series_name;
    let mut publisher = None;
    let mut publish_place = None;

    if let Some(editions) = editions {
        if pages_median.is_none() {
            pages_median = editions.pages_median.map(Into::into);
        }
        if series.is_none() {
            series = editions.series_name;
        }
        publisher = editions.publisher;
        publish_place = editions.publish_place;
        if languages.is_empty() {
            languages = editions.languages;
        }
    }

    let author_key = primary_author_key(doc, &detail.work);

    OutputRow {
        work_key: work_key.to_string(),
        author_key,
        title: doc.title.clone(),
        author: doc.author_names.join(LIST_SEPARATOR),
        first_publish_year: doc.first_publish_year,
        edition_count: doc.edition_count,
        subject: detail.subjects.join(LIST_SEPARATOR),
        subject_people: detail.subject_people.join(LIST_SEPARATOR),
        subject_places: detail.subject_places.join(LIST_SEPARATOR),
        subject_times: detail.subject_times.join(LIST_SEPARATOR),
        language: (!languages.is_empty()).then(|| languages.join(LIST_SEPARATOR)),
        series,
        number_of_pages_median: pages_median,
        publisher,
        publish_place,
        ratings_count: ratings.count,
        ratings_average: ratings.average,
        author_work_count: None,
    }
}
