use super::store::AllocationState;
use super::types::{
    BudgetAnalytics, Category, Comparison, ComparisonResult, Direction, StageBenchmark,
};

/// Deviations at or below this many percentage points are not reported.
pub const MATERIALITY_THRESHOLD: f64 = 3.0;

/// Compares the snapshot against the benchmark table of its active stage.
pub fn compare_to_benchmarks(
    state: &AllocationState,
    categories: &[Category],
    analytics: &BudgetAnalytics,
) -> Comparison {
    match analytics.stage_benchmark(state.stage()) {
        Some(benchmark) => compare_to_stage(state, categories, benchmark),
        None => Comparison::NotAvailable,
    }
}

/// Picks the category furthest from its median benchmark, scanning in
/// catalog order so the earliest category wins ties.
pub fn compare_to_stage(
    state: &AllocationState,
    categories: &[Category],
    benchmark: &StageBenchmark,
) -> Comparison {
    let mut max_deviation = 0.0_f64;
    let mut max_category: Option<&Category> = None;

    for category in categories {
        let Some(percentiles) = benchmark.percentiles(&category.id) else {
            continue;
        };
        let allocation = state
            .percent(&category.id)
            .unwrap_or(category.default_percent);
        let deviation = allocation - percentiles.p50;
        if deviation.abs() > max_deviation.abs() {
            max_deviation = deviation;
            max_category = Some(category);
        }
    }

    match max_category {
        Some(category) if max_deviation.abs() > MATERIALITY_THRESHOLD => {
            Comparison::Deviation(ComparisonResult {
                category_id: category.id.clone(),
                category: category.name.clone(),
                deviation: max_deviation.abs().round() as u32,
                direction: if max_deviation > 0.0 {
                    Direction::Above
                } else {
                    Direction::Below
                },
            })
        }
        _ => Comparison::SimilarToPeers,
    }
}
