//! Reduction of transaction-level records to a daily series.
//!
//! Aggregation happens in two named steps: values are summed per calendar
//! day, then [`zero_fill`] reindexes the sums onto a gap-free daily grid.
//! Treating a day without transactions as zero demand is therefore an
//! explicit, testable rule rather than a side effect of the loader.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::core::DailySeries;
use crate::error::{EngineError, Result};

/// Sum values per calendar day.
pub fn daily_totals<I>(records: I) -> BTreeMap<NaiveDate, f64>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut totals = BTreeMap::new();
    for (date, value) in records {
        *totals.entry(date).or_insert(0.0) += value;
    }
    totals
}

/// Reindex daily totals onto every day of `[start, end]`, filling absent days with 0.
///
/// Totals outside the range are ignored.
pub fn zero_fill(
    totals: &BTreeMap<NaiveDate, f64>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<DailySeries> {
    if end < start {
        return Err(EngineError::DateMismatch(format!(
            "grid end {end} precedes start {start}"
        )));
    }

    let days = (end - start).num_days() as usize + 1;
    let values = (0..days)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            totals.get(&date).copied().unwrap_or(0.0)
        })
        .collect();

    DailySeries::from_start(start, values)
}

/// Aggregate records into a series covering `[min_date, max_date]` of the input.
pub fn aggregate_daily<I>(records: I) -> Result<DailySeries>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let totals = daily_totals(records);
    let (Some((&start, _)), Some((&end, _))) = (totals.first_key_value(), totals.last_key_value())
    else {
        return Err(EngineError::EmptyData);
    };
    zero_fill(&totals, start, end)
}

/// Aggregate records onto a fixed `[start, end]` grid, dropping records outside it.
pub fn aggregate_window<I>(records: I, start: NaiveDate, end: NaiveDate) -> Result<DailySeries>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let totals = daily_totals(
        records
            .into_iter()
            .filter(|(date, _)| *date >= start && *date <= end),
    );
    zero_fill(&totals, start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, d).unwrap()
    }

    #[test]
    fn sums_same_day_records() {
        let series = aggregate_daily(vec![
            (day(1), 10.0),
            (day(1), 5.0),
            (day(2), 1.0),
        ])
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_relative_eq!(series.values()[0], 15.0);
        assert_relative_eq!(series.values()[1], 1.0);
    }

    #[test]
    fn fills_missing_days_with_zero() {
        let series = aggregate_daily(vec![(day(5), 3.0), (day(1), 2.0)]).unwrap();

        // (max - min).days + 1
        assert_eq!(series.len(), 5);
        assert_eq!(series.start(), day(1));
        assert_eq!(series.values(), &[2.0, 0.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn unordered_input_is_sorted() {
        let series = aggregate_daily(vec![(day(3), 3.0), (day(2), 2.0), (day(1), 1.0)]).unwrap();
        assert_eq!(series.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_input_is_error() {
        let records: Vec<(NaiveDate, f64)> = Vec::new();
        assert!(matches!(
            aggregate_daily(records),
            Err(EngineError::EmptyData)
        ));
    }

    #[test]
    fn zero_fill_rule_applies_to_explicit_grid() {
        let mut totals = BTreeMap::new();
        totals.insert(day(2), 4.0);

        let series = zero_fill(&totals, day(1), day(4)).unwrap();
        assert_eq!(series.values(), &[0.0, 4.0, 0.0, 0.0]);

        let inverted = zero_fill(&totals, day(4), day(1));
        assert!(matches!(inverted, Err(EngineError::DateMismatch(_))));
    }

    #[test]
    fn window_drops_records_outside_range() {
        let series = aggregate_window(
            vec![(day(1), 100.0), (day(3), 1.0), (day(9), 100.0)],
            day(2),
            day(4),
        )
        .unwrap();

        assert_eq!(series.start(), day(2));
        assert_eq!(series.values(), &[0.0, 1.0, 0.0]);
    }
}
