//! Filler list parsing and correlation.
//!
//! Every `.EpisodeList` table on a filler list page has one row per episode
//! with cells `td.Number`, `td.Type`, `td.Date` and `td.Title`. Rows are
//! resolved through an [`EpisodeIndex`] and joined with their season and
//! episode number.

use crate::index::EpisodeIndex;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use shared::{ClassificationRow, FillerRecord};
use tracing::{debug, warn};

/// Type label of episodes not adapted from the source material
pub const FILLER_LABEL: &str = "Filler";

static EPISODE_TABLES: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".EpisodeList").expect("valid selector"));
static BODY_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody > tr").expect("valid selector"));
static NUMBER_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.Number").expect("valid selector"));
static TYPE_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.Type").expect("valid selector"));
static DATE_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.Date").expect("valid selector"));
static TITLE_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.Title").expect("valid selector"));

/// Raw text of one table row before its id is interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawRow {
    number: String,
    kind: String,
    date: String,
    title: String,
}

impl RawRow {
    fn into_classification(self) -> Option<ClassificationRow> {
        Some(ClassificationRow {
            id: self.number.parse().ok()?,
            is_filler: self.kind == FILLER_LABEL,
            title: self.title,
            date: self.date,
        })
    }
}

fn raw_rows(html: &str) -> Vec<RawRow> {
    let document = Html::parse_document(html);

    document
        .select(&EPISODE_TABLES)
        .flat_map(|table| table.select(&BODY_ROWS))
        .map(|row| RawRow {
            number: cell_text(row, &NUMBER_CELL),
            kind: cell_text(row, &TYPE_CELL),
            date: cell_text(row, &DATE_CELL),
            title: cell_text(row, &TITLE_CELL),
        })
        .collect()
}

fn cell_text(row: ElementRef, selector: &Selector) -> String {
    row.select(selector)
        .next()
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Parse every row of the filler list tables in document order
///
/// Rows whose number cell is not a plain episode number are dropped.
pub fn parse_rows(html: &str) -> Vec<ClassificationRow> {
    raw_rows(html)
        .into_iter()
        .filter_map(|row| {
            let number = row.number.clone();
            let parsed = row.into_classification();
            if parsed.is_none() {
                debug!(number = %number, "Skipping row without episode number");
            }
            parsed
        })
        .collect()
}

/// Join the filler list rows with their season and episode numbers
///
/// Rows whose id is not covered by `index` are skipped with a warning; the
/// remaining rows keep their table order.
pub fn merge(html: &str, index: &EpisodeIndex) -> Vec<FillerRecord> {
    let mut records = Vec::new();
    let mut unmapped = 0usize;

    for row in raw_rows(html) {
        let Some(coordinate) = index.resolve(&row.number) else {
            warn!(
                id = %row.number,
                mapped = index.len(),
                "Episode id has no season mapping, skipping"
            );
            unmapped += 1;
            continue;
        };

        if let Some(row) = row.into_classification() {
            records.push(FillerRecord::new(row, coordinate));
        }
    }

    debug!(
        records = records.len(),
        unmapped = unmapped,
        "Merged filler list"
    );

    records
}
