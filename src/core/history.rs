use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::types::{CategorySeed, HistoricalMonth, HistoryTrend, TrendDirection};

pub const HISTORY_MONTHS: u32 = 24;

const NOISE_AMPLITUDE: f64 = 3.0;
const FLAT_TREND_THRESHOLD: f64 = 0.5;

/// Linear-congruential generator over 31 bits. Identical seeds and call
/// sequences reproduce identical draws.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const MULTIPLIER: u64 = 1_103_515_245;
    const INCREMENT: u64 = 12_345;
    const MASK: u64 = 0x7fff_ffff;

    pub fn new(seed: u64) -> Self {
        Self {
            state: seed & Self::MASK,
        }
    }

    pub fn next_state(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
            & Self::MASK;
        self.state
    }

    pub fn next_f64(&mut self) -> f64 {
        self.next_state() as f64 / Self::MASK as f64
    }
}

/// Builds the trailing 24-month allocation series ending at the month of
/// `today`, oldest first.
pub fn generate_history(
    catalog: &[CategorySeed],
    seed: u64,
    today: NaiveDate,
) -> Vec<HistoricalMonth> {
    if catalog.is_empty() {
        return Vec::new();
    }

    let mut rng = Lcg::new(seed);
    let mut months = Vec::with_capacity(HISTORY_MONTHS as usize);

    for elapsed in 0..HISTORY_MONTHS {
        let months_back = HISTORY_MONTHS - 1 - elapsed;
        let raw: Vec<(&str, f64)> = catalog
            .iter()
            .map(|entry| {
                let trend = elapsed as f64 * entry.trend_per_month;
                let noise = (rng.next_f64() - 0.5) * NOISE_AMPLITUDE;
                let value = (entry.category.default_percent + trend + noise).clamp(0.0, 100.0);
                (entry.category.id.as_str(), value)
            })
            .collect();

        months.push(HistoricalMonth {
            month: month_label(today, months_back),
            allocations: normalize(&raw),
        });
    }

    debug!(
        seed,
        months = months.len(),
        categories = catalog.len(),
        "generated allocation history"
    );
    months
}

fn normalize(raw: &[(&str, f64)]) -> BTreeMap<String, f64> {
    let total: f64 = raw.iter().map(|(_, value)| value).sum();
    raw.iter()
        .map(|&(id, value)| {
            let permille = if total > 0.0 {
                value / total * 1000.0
            } else {
                1000.0 / raw.len() as f64
            };
            (id.to_string(), permille.round() / 10.0)
        })
        .collect()
}

fn month_label(today: NaiveDate, months_back: u32) -> String {
    let index = today.year() * 12 + today.month0() as i32 - months_back as i32;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) + 1;
    format!("{year:04}-{month:02}")
}

/// Values recorded for one category, oldest first. Months without an entry
/// for the category are skipped.
pub fn category_series(history: &[HistoricalMonth], category_id: &str) -> Vec<f64> {
    history
        .iter()
        .filter_map(|month| month.allocations.get(category_id).copied())
        .collect()
}

pub fn history_trend(series: &[f64]) -> Option<HistoryTrend> {
    let first = *series.first()?;
    let last = *series.last()?;
    let change = last - first;
    let direction = if change.abs() < FLAT_TREND_THRESHOLD {
        TrendDirection::Flat
    } else if change > 0.0 {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };
    Some(HistoryTrend {
        first,
        last,
        change,
        direction,
    })
}
