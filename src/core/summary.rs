//! Aggregate reductions for summary cards
//!
//! Every reduction is a single pass and returns zero for an empty input.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Number of records matching a predicate
pub fn count_where<'a, T: 'a, I, P>(items: I, predicate: P) -> usize
where
    I: IntoIterator<Item = &'a T>,
    P: Fn(&T) -> bool,
{
    items.into_iter().filter(|item| predicate(*item)).count()
}

/// Sum of a numeric field; non-finite values are skipped
pub fn sum_by<'a, T: 'a, I, F>(items: I, value: F) -> f64
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> f64,
{
    items
        .into_iter()
        .map(value)
        .filter(|v| v.is_finite())
        .sum()
}

/// Number of distinct values of a key
pub fn distinct_count<'a, T: 'a, I, K, F>(items: I, key: F) -> usize
where
    I: IntoIterator<Item = &'a T>,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    items.into_iter().map(key).collect::<HashSet<K>>().len()
}

/// Record counts grouped by a key, sorted by key
pub fn count_by<'a, T: 'a, I, F>(items: I, key: F) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> String,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

/// Percentage change between two periods, formatted for a summary card
///
/// When there is no previous value the change is not a percentage: a
/// positive current value is shown as "+current", anything else as "0".
pub fn trend_label(current: f64, previous: f64) -> String {
    if previous == 0.0 {
        return if current > 0.0 {
            format!("+{}", format_number(current))
        } else {
            "0".to_string()
        };
    }

    let pct = (current - previous) / previous.abs() * 100.0;
    if pct >= 0.0 {
        format!("+{:.1}%", pct)
    } else {
        format!("{:.1}%", pct)
    }
}

/// Format a number without a trailing ".0" for whole values
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}
