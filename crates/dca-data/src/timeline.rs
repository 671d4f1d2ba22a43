//! Cumulative sats series for the accumulation chart.
//!
//! Daily [`TimelinePoint`]s are summed into a running total. When the server
//! has no daily timeline, the already-cumulative [`CostBasisPoint`] history
//! is reduced to one value per calendar date instead.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use dca_core::formatting::format_short_date;
use dca_core::models::{CostBasisPoint, CumulativeSeries, SeriesPoint, TimelinePoint};
use dca_core::time_utils::parse_calendar_date;

/// Stateless builder of [`CumulativeSeries`] values.
pub struct TimelineAggregator;

impl TimelineAggregator {
    /// Build the chart series from the analytics response.
    ///
    /// `timeline` takes precedence; `cost_basis` is only consulted when
    /// `timeline` is empty. A series with no points is replaced by
    /// [`CumulativeSeries::placeholder`].
    pub fn aggregate(timeline: &[TimelinePoint], cost_basis: &[CostBasisPoint]) -> CumulativeSeries {
        let series = if timeline.is_empty() {
            Self::from_cost_basis(cost_basis)
        } else {
            Self::from_timeline(timeline)
        };

        if series.is_empty() {
            return CumulativeSeries::placeholder();
        }
        series
    }

    /// Running total over daily points.
    ///
    /// Points are stably sorted by date. Unparseable dates are skipped and do
    /// not advance the total. Consecutive points on the same date collapse
    /// into one entry carrying the later total.
    pub fn from_timeline(timeline: &[TimelinePoint]) -> CumulativeSeries {
        let mut dated: Vec<(NaiveDate, u64)> = Vec::with_capacity(timeline.len());
        let mut skipped = 0usize;
        for point in timeline {
            match parse_calendar_date(&point.date) {
                Some(date) => dated.push((date, point.sats)),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!("Skipped {} timeline points with unparseable dates", skipped);
        }

        // `sort_by_key` is stable, so same-day points keep their server order.
        dated.sort_by_key(|(date, _)| *date);

        let mut points: Vec<SeriesPoint> = Vec::with_capacity(dated.len());
        let mut last_date: Option<NaiveDate> = None;
        let mut running: u64 = 0;

        for (date, sats) in dated {
            running = running.saturating_add(sats);
            match points.last_mut() {
                Some(last) if last_date == Some(date) => last.value = running,
                _ => points.push(SeriesPoint {
                    label: format_short_date(date),
                    value: running,
                }),
            }
            last_date = Some(date);
        }

        CumulativeSeries { points }
    }

    /// One point per calendar date from cumulative snapshots.
    ///
    /// Dates are grouped as written, without timezone conversion, and each
    /// group keeps its largest `cumulative_sats`. Values are clamped to the
    /// running maximum so the series never decreases.
    pub fn from_cost_basis(history: &[CostBasisPoint]) -> CumulativeSeries {
        let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for point in history {
            let Some(date) = parse_calendar_date(&point.date) else {
                debug!("Skipping cost basis point with date {:?}", point.date);
                continue;
            };
            by_date
                .entry(date)
                .and_modify(|v| *v = (*v).max(point.cumulative_sats))
                .or_insert(point.cumulative_sats);
        }

        let mut high_water: u64 = 0;
        let points = by_date
            .into_iter()
            .map(|(date, sats)| {
                high_water = high_water.max(sats);
                SeriesPoint {
                    label: format_short_date(date),
                    value: high_water,
                }
            })
            .collect();

        CumulativeSeries { points }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tp(date: &str, sats: u64) -> TimelinePoint {
        TimelinePoint::new(date, sats)
    }

    fn cb(date: &str, sats: u64) -> CostBasisPoint {
        CostBasisPoint::new(date, sats)
    }

    fn pairs(series: &CumulativeSeries) -> Vec<(String, u64)> {
        series
            .points
            .iter()
            .map(|p| (p.label.clone(), p.value))
            .collect()
    }

    // ── primary path ──────────────────────────────────────────────────────────

    #[test]
    fn test_running_total_over_two_days() {
        let series =
            TimelineAggregator::aggregate(&[tp("2024-01-01", 100), tp("2024-01-02", 50)], &[]);
        assert_eq!(
            pairs(&series),
            vec![("Jan 1".to_string(), 100), ("Jan 2".to_string(), 150)]
        );
    }

    #[test]
    fn test_unsorted_input_is_sorted_by_date() {
        let series = TimelineAggregator::aggregate(
            &[tp("2024-01-03", 5), tp("2024-01-01", 10), tp("2024-01-02", 20)],
            &[],
        );
        assert_eq!(series.labels(), vec!["Jan 1", "Jan 2", "Jan 3"]);
        assert_eq!(series.values(), vec![10, 30, 35]);
    }

    #[test]
    fn test_well_formed_input_is_non_decreasing_with_one_point_per_date() {
        let input: Vec<TimelinePoint> = (1..=28)
            .map(|d| tp(&format!("2024-02-{d:02}"), (d * 37 % 11) as u64))
            .collect();
        let series = TimelineAggregator::aggregate(&input, &[]);

        assert_eq!(series.len(), input.len());
        for pair in series.points.windows(2) {
            assert!(pair[0].value <= pair[1].value);
        }
        assert_eq!(series.labels().len(), series.values().len());
    }

    #[test]
    fn test_unparseable_date_is_skipped() {
        let series = TimelineAggregator::aggregate(
            &[tp("2024-01-01", 100), tp("garbage", 999), tp("2024-01-02", 50)],
            &[],
        );
        assert_eq!(series.values(), vec![100, 150]);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_duplicate_dates_collapse_to_later_total() {
        let series = TimelineAggregator::aggregate(
            &[tp("2024-01-01", 100), tp("2024-01-01", 50), tp("2024-01-02", 10)],
            &[],
        );
        assert_eq!(
            pairs(&series),
            vec![("Jan 1".to_string(), 150), ("Jan 2".to_string(), 160)]
        );
    }

    #[test]
    fn test_timestamps_with_time_group_by_written_day() {
        let series = TimelineAggregator::aggregate(
            &[tp("2024-01-01T08:00:00", 10), tp("2024-01-01T23:59:00-06:00", 20)],
            &[],
        );
        assert_eq!(pairs(&series), vec![("Jan 1".to_string(), 30)]);
    }

    #[test]
    fn test_zero_sats_still_emits_point() {
        let series =
            TimelineAggregator::aggregate(&[tp("2024-01-01", 0), tp("2024-01-02", 0)], &[]);
        assert_eq!(series.values(), vec![0, 0]);
    }

    #[test]
    fn test_timeline_takes_precedence_over_cost_basis() {
        let series =
            TimelineAggregator::aggregate(&[tp("2024-01-05", 7)], &[cb("2024-01-01", 1_000)]);
        assert_eq!(pairs(&series), vec![("Jan 5".to_string(), 7)]);
    }

    #[test]
    fn test_all_dates_unparseable_yields_placeholder() {
        let series = TimelineAggregator::aggregate(&[tp("", 10), tp("soon", 20)], &[]);
        assert!(series.is_placeholder());
    }

    // ── fallback path ─────────────────────────────────────────────────────────

    #[test]
    fn test_cost_basis_duplicate_dates_keep_largest() {
        let series = TimelineAggregator::aggregate(
            &[],
            &[cb("2024-01-01T09:00:00", 100), cb("2024-01-01T18:00:00", 150)],
        );
        assert_eq!(pairs(&series), vec![("Jan 1".to_string(), 150)]);
    }

    #[test]
    fn test_cost_basis_sorted_ascending() {
        let series = TimelineAggregator::aggregate(
            &[],
            &[
                cb("2024-03-02T10:00:00", 300),
                cb("2024-03-01T10:00:00", 100),
                cb("2024-03-03T10:00:00", 450),
            ],
        );
        assert_eq!(series.labels(), vec!["Mar 1", "Mar 2", "Mar 3"]);
        assert_eq!(series.values(), vec![100, 300, 450]);
    }

    #[test]
    fn test_cost_basis_clamped_to_running_max() {
        let series = TimelineAggregator::aggregate(
            &[],
            &[cb("2024-01-01", 500), cb("2024-01-02", 400), cb("2024-01-03", 600)],
        );
        assert_eq!(series.values(), vec![500, 500, 600]);
    }

    #[test]
    fn test_cost_basis_skips_unparseable_dates() {
        let series =
            TimelineAggregator::aggregate(&[], &[cb("n/a", 9_999), cb("2024-01-02", 10)]);
        assert_eq!(pairs(&series), vec![("Jan 2".to_string(), 10)]);
    }

    // ── empty policy / idempotence ────────────────────────────────────────────

    #[test]
    fn test_both_empty_yields_placeholder() {
        let series = TimelineAggregator::aggregate(&[], &[]);
        assert_eq!(
            pairs(&series),
            vec![("Start Your DCA Journey".to_string(), 0)]
        );
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let timeline = vec![
            tp("2024-01-02", 5),
            tp("bad", 1),
            tp("2024-01-01", 7),
            tp("2024-01-01", 3),
        ];
        let history = vec![cb("2024-01-01", 1)];
        let first = TimelineAggregator::aggregate(&timeline, &history);
        let second = TimelineAggregator::aggregate(&timeline, &history);
        assert_eq!(first, second);
    }
}
