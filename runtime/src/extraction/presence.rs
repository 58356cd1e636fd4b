//! Keyword presence across the seven zones.

use super::zones::{extract_zones, Zone};
use crate::acquisition::FetchedContent;
use serde::Serialize;
use thiserror::Error;

/// Why a presence check produced no evidence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    /// The page could not be rendered this run.
    #[error("page content unavailable")]
    ContentUnavailable,

    /// A zone could not be extracted; the whole row degrades.
    #[error("failed to extract {zone:?} zone: {reason}")]
    ZoneExtraction { zone: Zone, reason: String },
}

/// One flag per zone: whether the keyword occurs there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PresenceResult {
    pub title: bool,
    pub description: bool,
    pub h1: bool,
    pub h2: bool,
    pub content: bool,
    pub alt_text: bool,
    pub schema: bool,
}

impl PresenceResult {
    /// All zones absent. Recorded for degraded rows.
    pub const NONE: PresenceResult = PresenceResult {
        title: false,
        description: false,
        h1: false,
        h2: false,
        content: false,
        alt_text: false,
        schema: false,
    };

    pub fn get(&self, zone: Zone) -> bool {
        match zone {
            Zone::Title => self.title,
            Zone::Description => self.description,
            Zone::H1 => self.h1,
            Zone::H2 => self.h2,
            Zone::Content => self.content,
            Zone::AltText => self.alt_text,
            Zone::Schema => self.schema,
        }
    }

    /// `(zone, present)` pairs in report column order.
    pub fn iter(&self) -> impl Iterator<Item = (Zone, bool)> + '_ {
        Zone::ALL.into_iter().map(move |z| (z, self.get(z)))
    }
}

/// Check `keyword` against every zone of `content`.
///
/// Matching is case-insensitive substring containment. Errors are all or
/// nothing: a caller never sees a partially evaluated result.
pub fn match_presence(
    content: &FetchedContent,
    keyword: &str,
) -> Result<PresenceResult, PresenceError> {
    let FetchedContent::Available(doc) = content else {
        return Err(PresenceError::ContentUnavailable);
    };

    let zones = extract_zones(doc)?;
    let needle = keyword.to_lowercase();
    let found = |zone| zones.get(zone).contains(needle.as_str());

    Ok(PresenceResult {
        title: found(Zone::Title),
        description: found(Zone::Description),
        h1: found(Zone::H1),
        h2: found(Zone::H2),
        content: found(Zone::Content),
        alt_text: found(Zone::AltText),
        schema: found(Zone::Schema),
    })
}
