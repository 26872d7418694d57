mod catalog;
mod comparison;
mod error;
mod history;
mod percentile;
mod report;
mod store;
mod types;

pub use catalog::{
    CURRENCY, CURRENCY_SYMBOL, DEFAULT_BUDGET, DEFAULT_STAGE, HISTORY_SEED, PRESET_BUDGETS, STAGES,
    budget_data, default_benchmarks, default_catalog,
};
pub use comparison::{MATERIALITY_THRESHOLD, compare_to_benchmarks, compare_to_stage};
pub use error::{Error, Result};
pub use history::{HISTORY_MONTHS, Lcg, category_series, generate_history, history_trend};
pub use percentile::{percentile_band, percentile_rank};
pub use report::{build_report, format_budget_summary, format_currency_full, format_currency_short};
pub use store::{AllocationState, CategoryAllocation};
pub use types::{
    BalanceStatus, BenchmarkPercentiles, BudgetAnalytics, BudgetConfig, BudgetData, BudgetReport,
    Category, CategoryRow, CategorySeed, Comparison, ComparisonResult, Direction, HistoricalMonth,
    HistoryTrend, PercentileBand, StageBenchmark, TrendDirection,
};
