//! Daily and weekly nutrition aggregates over food log entries.
//!
//! Everything here is a pure function of the entries passed in.

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::models::{DailyTotals, FoodLogEntry, WeeklyPoint};

/// Default length of the trailing series.
pub const WEEK_WINDOW: usize = 7;

/// Non-finite or negative amounts are malformed and count as zero.
fn sanitized(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Unrounded sum of the four tracked macros.
#[must_use]
pub fn sum_totals<'a, I>(entries: I) -> DailyTotals
where
    I: IntoIterator<Item = &'a FoodLogEntry>,
{
    entries
        .into_iter()
        .fold(DailyTotals::default(), |acc, entry| {
            debug!(
                name = %entry.name,
                calories = entry.calories,
                protein = entry.protein,
                carbs = entry.carbs,
                fat = entry.fat,
                "Folding entry into totals"
            );
            DailyTotals {
                calories: acc.calories + sanitized(entry.calories),
                protein: acc.protein + sanitized(entry.protein),
                carbs: acc.carbs + sanitized(entry.carbs),
                fat: acc.fat + sanitized(entry.fat),
            }
        })
}

/// Totals for one calendar day, rounded for display.
#[must_use]
pub fn daily_totals(log: &[FoodLogEntry], date: NaiveDate) -> DailyTotals {
    let totals = sum_totals(log.iter().filter(|e| e.date == date)).rounded();
    debug!(%date, ?totals, "Computed daily totals");
    totals
}

/// Raw calorie sum per day for the `window` days ending on `reference`,
/// oldest first. Days without entries contribute a zero point.
#[must_use]
pub fn weekly_series(
    log: &[FoodLogEntry],
    reference: NaiveDate,
    window: usize,
) -> Vec<WeeklyPoint> {
    (0..window)
        .rev()
        .map(|back| {
            let date = reference - Days::new(back as u64);
            let calories = log
                .iter()
                .filter(|e| e.date == date)
                .fold(0.0, |acc, e| acc + sanitized(e.calories));
            WeeklyPoint {
                date,
                day_label: date.format("%a").to_string(),
                calories,
            }
        })
        .collect()
}
