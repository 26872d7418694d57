use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub default_percent: f64,
}

/// Catalog entry used by the history synthesizer. The trend slope never
/// leaves the process; only the embedded [`Category`] is published.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeed {
    pub category: Category,
    pub trend_per_month: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalMonth {
    pub month: String,
    pub allocations: BTreeMap<String, f64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkPercentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

impl BenchmarkPercentiles {
    pub fn new(p25: f64, p50: f64, p75: f64) -> Self {
        Self { p25, p50, p75 }
    }

    pub fn is_ordered(&self) -> bool {
        self.p25 <= self.p50 && self.p50 <= self.p75
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageBenchmark {
    pub stage: String,
    pub category_benchmarks: BTreeMap<String, BenchmarkPercentiles>,
}

impl StageBenchmark {
    pub fn percentiles(&self, category_id: &str) -> Option<&BenchmarkPercentiles> {
        self.category_benchmarks.get(category_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetConfig {
    pub categories: Vec<Category>,
    pub preset_budgets: Vec<f64>,
    pub default_budget: f64,
    pub currency: String,
    pub currency_symbol: String,
}

impl BudgetConfig {
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn is_preset_budget(&self, amount: f64) -> bool {
        self.preset_budgets.iter().any(|&preset| preset == amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAnalytics {
    pub history: Vec<HistoricalMonth>,
    pub benchmarks: Vec<StageBenchmark>,
    pub stages: Vec<String>,
    pub default_stage: String,
}

impl BudgetAnalytics {
    pub fn stage_benchmark(&self, stage: &str) -> Option<&StageBenchmark> {
        self.benchmarks.iter().find(|b| b.stage == stage)
    }

    pub fn has_stage(&self, stage: &str) -> bool {
        self.stages.iter().any(|s| s == stage)
    }
}

/// The payload handed to rendering collaborators once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetData {
    pub config: BudgetConfig,
    pub analytics: BudgetAnalytics,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub category_id: String,
    pub category: String,
    pub deviation: u32,
    pub direction: Direction,
}

impl ComparisonResult {
    pub fn is_above(&self) -> bool {
        self.direction == Direction::Above
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Comparison {
    /// The active stage has no benchmark table.
    NotAvailable,
    /// No category deviates from its median by more than the threshold.
    SimilarToPeers,
    Deviation(ComparisonResult),
}

impl Comparison {
    pub fn result(&self) -> Option<&ComparisonResult> {
        match self {
            Comparison::Deviation(result) => Some(result),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BalanceStatus {
    Balanced,
    Over { by: f64 },
    Under { by: f64 },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentileBand {
    Low,
    Normal,
    High,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryTrend {
    pub first: f64,
    pub last: f64,
    pub change: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub percent: f64,
    pub amount: f64,
    /// Compact amount label, e.g. `$63K`.
    pub amount_label: String,
    pub percentile: Option<f64>,
    pub band: Option<PercentileBand>,
    pub history: Vec<f64>,
    pub trend: Option<HistoryTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReport {
    pub budget: f64,
    pub stage: String,
    pub currency: String,
    pub currency_symbol: String,
    pub total_percent: f64,
    pub allocated_amount: f64,
    pub balance: BalanceStatus,
    pub comparison: Comparison,
    pub categories: Vec<CategoryRow>,
}
