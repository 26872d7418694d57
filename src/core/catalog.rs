//! Static category catalog, benchmark table and the payload built from them.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use super::error::{Error, Result};
use super::history::generate_history;
use super::types::{
    BenchmarkPercentiles, BudgetAnalytics, BudgetConfig, BudgetData, Category, CategorySeed,
    StageBenchmark,
};

pub const HISTORY_SEED: u64 = 42;
pub const PRESET_BUDGETS: [f64; 4] = [50_000.0, 100_000.0, 250_000.0, 500_000.0];
pub const DEFAULT_BUDGET: f64 = 100_000.0;
pub const CURRENCY: &str = "USD";
pub const CURRENCY_SYMBOL: &str = "$";
pub const STAGES: [&str; 4] = ["Seed", "Series A", "Series B", "Growth"];
pub const DEFAULT_STAGE: &str = "Series A";

// id, name, color, default percent, trend per month
const CATEGORIES: [(&str, &str, &str, f64, f64); 5] = [
    ("marketing", "Marketing", "#3b82f6", 25.0, 0.15),
    ("engineering", "Engineering", "#10b981", 35.0, -0.1),
    ("operations", "Operations", "#f59e0b", 15.0, 0.05),
    ("sales", "Sales", "#ef4444", 15.0, 0.08),
    ("rd", "R&D", "#8b5cf6", 10.0, -0.18),
];

// p25, p50, p75 per category, in CATEGORIES order.
const BENCHMARKS: [(&str, [(f64, f64, f64); 5]); 4] = [
    (
        "Seed",
        [
            (15.0, 20.0, 25.0),
            (40.0, 47.0, 55.0),
            (8.0, 12.0, 15.0),
            (10.0, 15.0, 20.0),
            (5.0, 10.0, 15.0),
        ],
    ),
    (
        "Series A",
        [
            (20.0, 25.0, 30.0),
            (35.0, 40.0, 45.0),
            (10.0, 14.0, 18.0),
            (15.0, 20.0, 25.0),
            (8.0, 12.0, 15.0),
        ],
    ),
    (
        "Series B",
        [
            (22.0, 27.0, 32.0),
            (30.0, 35.0, 40.0),
            (12.0, 16.0, 20.0),
            (18.0, 23.0, 28.0),
            (8.0, 12.0, 15.0),
        ],
    ),
    (
        "Growth",
        [
            (25.0, 30.0, 35.0),
            (25.0, 30.0, 35.0),
            (15.0, 18.0, 22.0),
            (20.0, 25.0, 30.0),
            (5.0, 8.0, 12.0),
        ],
    ),
];

pub fn default_catalog() -> Vec<CategorySeed> {
    CATEGORIES
        .iter()
        .map(|&(id, name, color, default_percent, trend_per_month)| CategorySeed {
            category: Category {
                id: id.to_string(),
                name: name.to_string(),
                color: color.to_string(),
                default_percent,
            },
            trend_per_month,
        })
        .collect()
}

pub fn default_benchmarks() -> Vec<StageBenchmark> {
    BENCHMARKS
        .iter()
        .map(|(stage, rows)| StageBenchmark {
            stage: stage.to_string(),
            category_benchmarks: CATEGORIES
                .iter()
                .zip(rows.iter())
                .map(|(&(id, ..), &(p25, p50, p75))| {
                    (id.to_string(), BenchmarkPercentiles::new(p25, p50, p75))
                })
                .collect::<BTreeMap<_, _>>(),
        })
        .collect()
}

/// Materialises the full payload: configuration plus history synthesized
/// for the month of `today`.
pub fn budget_data(seed: u64, today: NaiveDate) -> BudgetData {
    let catalog = default_catalog();
    let history = generate_history(&catalog, seed, today);

    BudgetData {
        config: BudgetConfig {
            categories: catalog.into_iter().map(|entry| entry.category).collect(),
            preset_budgets: PRESET_BUDGETS.to_vec(),
            default_budget: DEFAULT_BUDGET,
            currency: CURRENCY.to_string(),
            currency_symbol: CURRENCY_SYMBOL.to_string(),
        },
        analytics: BudgetAnalytics {
            history,
            benchmarks: default_benchmarks(),
            stages: STAGES.iter().map(|s| s.to_string()).collect(),
            default_stage: DEFAULT_STAGE.to_string(),
        },
    }
}

impl BudgetData {
    /// Checks the shape invariants the engine relies on.
    pub fn validate(&self) -> Result<()> {
        let config = &self.config;
        let analytics = &self.analytics;

        if config.categories.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for category in &config.categories {
            if !seen.insert(category.id.as_str()) {
                return Err(Error::DuplicateCategory(category.id.clone()));
            }
            if !(0.0..=100.0).contains(&category.default_percent) {
                return Err(Error::InvalidPercent {
                    category: category.id.clone(),
                    value: category.default_percent,
                });
            }
        }

        if !config.is_preset_budget(config.default_budget) {
            return Err(Error::InvalidBudget(config.default_budget));
        }

        if !analytics.has_stage(&analytics.default_stage) {
            return Err(Error::UnknownStage(analytics.default_stage.clone()));
        }

        for benchmark in &analytics.benchmarks {
            for (category, percentiles) in &benchmark.category_benchmarks {
                if !percentiles.is_ordered() {
                    return Err(Error::MalformedBenchmark {
                        stage: benchmark.stage.clone(),
                        category: category.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
