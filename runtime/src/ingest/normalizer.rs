//! Classify an input table and rewrite it into [`CanonicalRow`]s.
//!
//! Each [`SourceKind`] owns a declarative column map (lowercased header →
//! canonical field). Classification and mapping happen once here; nothing
//! downstream looks at raw header names again.

use super::loader::RawTable;
use crate::error::{AnalyzerError, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Which export an input table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Rank-tracking export: keyword, URL, search volume, position.
    RankTracking,
    /// Search-console export: query, page, clicks, impressions, CTR, position.
    SearchConsole,
    /// Neither. Terminal: the run aborts.
    Unknown,
}

impl SourceKind {
    /// Classify from header names (case-insensitive, surrounding whitespace ignored).
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Self {
        let lower: Vec<String> = headers
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();
        let has = |name: &str| lower.iter().any(|h| h == name);

        if has("keyword") && has("url") && has("search volume") {
            Self::RankTracking
        } else if has("query") && has("page") {
            Self::SearchConsole
        } else {
            Self::Unknown
        }
    }

    /// Stable lowercase label used in reports and process output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RankTracking => "rank_tracking",
            Self::SearchConsole => "search_console",
            Self::Unknown => "unknown",
        }
    }

    fn column_map(self) -> &'static [(&'static str, Field)] {
        match self {
            Self::RankTracking => RANK_TRACKING_COLUMNS,
            Self::SearchConsole => SEARCH_CONSOLE_COLUMNS,
            Self::Unknown => &[],
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Query,
    Page,
    Position,
    SearchVolume,
    Clicks,
    Impressions,
    Ctr,
}

// Exact matches only: "Previous position" must never map to Position.
const RANK_TRACKING_COLUMNS: &[(&str, Field)] = &[
    ("keyword", Field::Query),
    ("url", Field::Page),
    ("search volume", Field::SearchVolume),
    ("position", Field::Position),
];

const SEARCH_CONSOLE_COLUMNS: &[(&str, Field)] = &[
    ("query", Field::Query),
    ("page", Field::Page),
    ("clicks", Field::Clicks),
    ("impressions", Field::Impressions),
    ("ctr", Field::Ctr),
    ("position", Field::Position),
];

/// One normalized keyword row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanonicalRow {
    pub query: String,
    pub page: String,
    pub position: Option<f64>,
    pub search_volume: Option<f64>,
    pub clicks: Option<f64>,
    pub impressions: Option<f64>,
    pub ctr: Option<f64>,
    pub traffic_opportunity: Option<f64>,
}

impl CanonicalRow {
    /// Bare row with only query and page, mostly for tests and fixtures.
    pub fn new(query: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: page.into(),
            ..Self::default()
        }
    }
}

/// Normalizer output.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub source: SourceKind,
    /// Whether the input had a Position column at all. The recommended
    /// filter only applies when it did.
    pub has_position: bool,
    pub rows: Vec<CanonicalRow>,
}

/// Resolved column indices for one table.
#[derive(Debug, Default)]
struct ColumnIndex {
    query: Option<usize>,
    page: Option<usize>,
    position: Option<usize>,
    search_volume: Option<usize>,
    clicks: Option<usize>,
    impressions: Option<usize>,
    ctr: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &[String], map: &[(&str, Field)]) -> Self {
        let mut idx = Self::default();
        for (i, header) in headers.iter().enumerate() {
            let lower = header.trim().to_lowercase();
            let Some((_, field)) = map.iter().find(|(name, _)| *name == lower) else {
                continue;
            };
            let slot = match field {
                Field::Query => &mut idx.query,
                Field::Page => &mut idx.page,
                Field::Position => &mut idx.position,
                Field::SearchVolume => &mut idx.search_volume,
                Field::Clicks => &mut idx.clicks,
                Field::Impressions => &mut idx.impressions,
                Field::Ctr => &mut idx.ctr,
            };
            // First matching column wins.
            slot.get_or_insert(i);
        }
        idx
    }
}

/// Classify `table` and rewrite every row into the canonical schema.
///
/// Rows with an empty query or page are dropped. Fails with
/// `UnrecognizedSchema` or `MissingRequiredColumns`; never returns a
/// partially normalized table.
pub fn normalize(table: &RawTable) -> Result<NormalizedTable> {
    let source = SourceKind::detect(&table.headers);
    if source == SourceKind::Unknown {
        return Err(AnalyzerError::UnrecognizedSchema {
            columns: table.headers.clone(),
        });
    }

    let cols = ColumnIndex::resolve(&table.headers, source.column_map());
    let mut missing = Vec::new();
    if cols.query.is_none() {
        missing.push("Query");
    }
    if cols.page.is_none() {
        missing.push("Page");
    }
    let (Some(q_col), Some(p_col)) = (cols.query, cols.page) else {
        return Err(AnalyzerError::MissingRequiredColumns { missing });
    };

    let get = |row: usize, col: Option<usize>| col.map(|c| table.cell(row, c));
    let mut rows = Vec::with_capacity(table.records.len());
    let mut dropped = 0usize;

    for r in 0..table.records.len() {
        let query = table.cell(r, q_col);
        let page = table.cell(r, p_col);
        if query.trim().is_empty() || page.trim().is_empty() {
            dropped += 1;
            continue;
        }

        let mut row = CanonicalRow::new(query, page);
        row.position = get(r, cols.position).and_then(parse_number);

        match source {
            SourceKind::RankTracking => {
                if let Some(raw) = get(r, cols.search_volume) {
                    let volume = parse_number(raw).unwrap_or(0.0);
                    row.search_volume = Some(volume);
                    row.impressions = Some(volume);
                    row.clicks = Some(0.0);
                    row.traffic_opportunity = Some(volume);
                }
            }
            SourceKind::SearchConsole => {
                row.ctr = get(r, cols.ctr).and_then(parse_number);
                if let (Some(c), Some(i)) = (get(r, cols.clicks), get(r, cols.impressions)) {
                    let clicks = parse_number(c).unwrap_or(0.0);
                    let impressions = parse_number(i).unwrap_or(0.0);
                    row.clicks = Some(clicks);
                    row.impressions = Some(impressions);
                    row.traffic_opportunity = Some((impressions - clicks).max(0.0));
                } else {
                    row.clicks = get(r, cols.clicks).and_then(parse_number);
                    row.impressions = get(r, cols.impressions).and_then(parse_number);
                }
            }
            SourceKind::Unknown => unreachable!("rejected above"),
        }

        rows.push(row);
    }

    if dropped > 0 {
        debug!("dropped {dropped} rows with an empty query or page");
    }
    info!("detected {source} input with {} usable rows", rows.len());

    Ok(NormalizedTable {
        source,
        has_position: cols.position.is_some(),
        rows,
    })
}

/// Lenient numeric parse: trims and drops thousands separators. A trailing
/// `%` is read as a percentage, so `"5%"` and `"0.05"` parse the same.
/// Returns `None` for anything non-numeric or non-finite.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (digits, scale) = match trimmed.strip_suffix('%') {
        Some(rest) => (rest, 100.0),
        None => (trimmed, 1.0),
    };
    let cleaned: String = digits.chars().filter(|c| *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .map(|v| v / scale)
        .filter(|v| v.is_finite())
}
