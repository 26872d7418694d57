use super::types::{BenchmarkPercentiles, PercentileBand};

/// Percentile rank of `value` against a p25/p50/p75 triple.
///
/// Piecewise-linear between the anchors. Above p75 the rank extrapolates
/// over the same width as the p50..p75 segment and saturates at 100.
/// The result is always finite and within 0..=100: a non-positive p25 ranks
/// the bottom segment at 0, and a zero p50..p75 span ranks anything above
/// p75 at 100.
pub fn percentile_rank(value: f64, benchmarks: &BenchmarkPercentiles) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    let BenchmarkPercentiles { p25, p50, p75 } = *benchmarks;

    let rank = if value <= p25 {
        if p25 <= 0.0 {
            0.0
        } else {
            25.0 * (value / p25)
        }
    } else if value <= p50 {
        25.0 + 25.0 * ((value - p25) / (p50 - p25))
    } else if value <= p75 {
        50.0 + 25.0 * ((value - p50) / (p75 - p50))
    } else {
        let extra_range = p75 - p50;
        if extra_range <= 0.0 {
            100.0
        } else {
            75.0 + 25.0 * ((value - p75) / extra_range).min(1.0)
        }
    };
    rank.clamp(0.0, 100.0)
}

pub fn percentile_band(rank: f64) -> PercentileBand {
    if (40.0..=60.0).contains(&rank) {
        PercentileBand::Normal
    } else if rank > 60.0 {
        PercentileBand::High
    } else {
        PercentileBand::Low
    }
}
