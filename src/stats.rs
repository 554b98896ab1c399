use crate::models::{DayRecord, Habit, Statistics};

pub fn todays_score(habits: &[Habit]) -> u32 {
    habits.iter().filter(|habit| habit.completed).count() as u32
}

/// Whole-number percentage of `score` out of `total`; 0 when there is nothing to complete.
pub fn percent_complete(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let percent = (f64::from(score) / f64::from(total) * 100.0).round() as u32;
    percent.min(100)
}

/// Summary over a slice ordered by ascending date. Empty slices yield all zeros.
pub fn statistics(days: &[DayRecord]) -> Statistics {
    if days.is_empty() {
        return Statistics::default();
    }

    let total = days
        .iter()
        .fold(0u32, |sum, day| sum.saturating_add(day.total_score));
    let best = days.iter().map(|day| day.total_score).max().unwrap_or(0);
    let average = round_to_tenth(f64::from(total) / days.len() as f64);
    let streak = days
        .iter()
        .rev()
        .take_while(|day| day.total_score > 0)
        .count() as u32;

    Statistics {
        average,
        best,
        total,
        streak,
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
