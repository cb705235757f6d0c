use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::sentiment::SentimentLabel;

/// Count and share of one sentiment label in the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionRow {
    pub label: SentimentLabel,
    pub count: usize,
    /// Percentage of the batch, rounded to one decimal.
    pub percentage: f64,
}

/// Mean signed sentiment of the articles published on one UTC date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub average_score: f64,
    pub article_count: usize,
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Label counts, most frequent first. Labels that never occur are omitted.
pub fn sentiment_composition(labels: &[SentimentLabel]) -> Vec<CompositionRow> {
    if labels.is_empty() {
        return Vec::new();
    }

    let mut rows: Vec<CompositionRow> = SentimentLabel::ALL
        .iter()
        .map(|&label| (label, labels.iter().filter(|&&l| l == label).count()))
        .filter(|(_, count)| *count > 0)
        .map(|(label, count)| CompositionRow {
            label,
            count,
            percentage: round_one_decimal(count as f64 / labels.len() as f64 * 100.0),
        })
        .collect();
    // stable: equal counts stay in positive, neutral, negative order
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Daily mean of the signed scores, oldest date first.
pub fn sentiment_trend(scores: &[(NaiveDate, f64)]) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for &(date, score) in scores {
        let entry = by_day.entry(date).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    by_day
        .into_iter()
        .map(|(date, (sum, count))| TrendPoint {
            date,
            average_score: sum / count as f64,
            article_count: count,
        })
        .collect()
}

/// Dates whose daily mean lies more than `stddev_multiplier` sample standard
/// deviations away from the mean of the whole trend.
///
/// Nothing is flagged unless the trend has more than `min_points` points.
pub fn detect_events(trend: &[TrendPoint], stddev_multiplier: f64, min_points: usize) -> Vec<NaiveDate> {
    // sample standard deviation needs two points no matter what was configured
    if trend.len() <= min_points || trend.len() < 2 {
        return Vec::new();
    }

    let n = trend.len() as f64;
    let mean = trend.iter().map(|p| p.average_score).sum::<f64>() / n;
    let variance = trend
        .iter()
        .map(|p| (p.average_score - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    let threshold = stddev_multiplier * variance.sqrt();

    trend
        .iter()
        .filter(|p| (p.average_score - mean).abs() > threshold)
        .map(|p| p.date)
        .collect()
}
