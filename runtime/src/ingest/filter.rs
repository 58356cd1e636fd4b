//! Position filter and (query, page) de-duplication.

use super::normalizer::CanonicalRow;
use crate::config::FilterMode;
use std::collections::HashSet;

/// Inclusive position band kept by [`FilterMode::Recommended`].
pub const RECOMMENDED_POSITIONS: (f64, f64) = (5.0, 20.0);

/// Apply `mode` and drop repeated (query, page) pairs, keeping the first.
///
/// `has_position` says whether the input carried a Position column. Without
/// one the recommended band cannot apply and only de-duplication runs.
pub fn filter_rows(rows: Vec<CanonicalRow>, mode: FilterMode, has_position: bool) -> Vec<CanonicalRow> {
    let (lo, hi) = RECOMMENDED_POSITIONS;
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(rows.len());

    rows.into_iter()
        .filter(|row| match mode {
            FilterMode::Recommended if has_position => {
                row.position.is_some_and(|p| (lo..=hi).contains(&p))
            }
            _ => true,
        })
        .filter(|row| seen.insert((row.query.clone(), row.page.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(q: &str, p: &str, pos: Option<f64>) -> CanonicalRow {
        CanonicalRow {
            position: pos,
            ..CanonicalRow::new(q, p)
        }
    }

    #[test]
    fn test_recommended_keeps_mid_positions() {
        let rows = vec![
            row("a", "https://x.com/", Some(3.0)),
            row("b", "https://x.com/", Some(12.0)),
            row("c", "https://x.com/", Some(5.0)),
            row("d", "https://x.com/", Some(20.0)),
            row("e", "https://x.com/", Some(20.5)),
            row("f", "https://x.com/", None),
        ];
        let kept = filter_rows(rows, FilterMode::Recommended, true);
        let queries: Vec<_> = kept.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_recommended_without_position_column() {
        let rows = vec![row("a", "https://x.com/", None), row("b", "https://x.com/", None)];
        let kept = filter_rows(rows, FilterMode::Recommended, false);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_all_mode_skips_position_filter() {
        let rows = vec![row("a", "https://x.com/", Some(1.0)), row("b", "https://x.com/", Some(90.0))];
        assert_eq!(filter_rows(rows, FilterMode::All, true).len(), 2);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut first = row("a", "https://x.com/", Some(6.0));
        first.clicks = Some(10.0);
        let mut dup = row("a", "https://x.com/", Some(7.0));
        dup.clicks = Some(99.0);
        let rows = vec![first, row("a", "https://x.com/other", Some(8.0)), dup];

        let kept = filter_rows(rows, FilterMode::All, true);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].clicks, Some(10.0));
        assert_eq!(kept[1].page, "https://x.com/other");
    }

    #[test]
    fn test_filter_is_idempotent() {
        let rows = vec![
            row("a", "https://x.com/", Some(6.0)),
            row("a", "https://x.com/", Some(6.0)),
            row("b", "https://x.com/", Some(2.0)),
            row("c", "https://y.com/", Some(15.0)),
        ];
        let once = filter_rows(rows, FilterMode::Recommended, true);
        let twice = filter_rows(once.clone(), FilterMode::Recommended, true);
        assert_eq!(once, twice);
    }
}
