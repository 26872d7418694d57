use super::comparison::compare_to_benchmarks;
use super::history::{category_series, history_trend};
use super::percentile::{percentile_band, percentile_rank};
use super::store::AllocationState;
use super::types::{BudgetData, BudgetReport, CategoryRow};

/// Derives every value a renderer needs from one snapshot. Nothing here is
/// cached: call it again after each mutation.
pub fn build_report(data: &BudgetData, state: &AllocationState) -> BudgetReport {
    let config = &data.config;
    let analytics = &data.analytics;
    let stage_benchmark = analytics.stage_benchmark(state.stage());

    let categories = config
        .categories
        .iter()
        .map(|category| {
            let percent = state
                .percent(&category.id)
                .unwrap_or(category.default_percent);
            let percentile = stage_benchmark
                .and_then(|benchmark| benchmark.percentiles(&category.id))
                .map(|percentiles| percentile_rank(percent, percentiles));
            let amount = percent / 100.0 * state.budget();
            let history = category_series(&analytics.history, &category.id);
            let trend = history_trend(&history);

            CategoryRow {
                id: category.id.clone(),
                name: category.name.clone(),
                color: category.color.clone(),
                percent,
                amount,
                amount_label: format_currency_short(amount, &config.currency_symbol),
                percentile,
                band: percentile.map(percentile_band),
                history,
                trend,
            }
        })
        .collect();

    BudgetReport {
        budget: state.budget(),
        stage: state.stage().to_string(),
        currency: config.currency.clone(),
        currency_symbol: config.currency_symbol.clone(),
        total_percent: state.total_percent(),
        allocated_amount: state.allocated_amount(),
        balance: state.balance(),
        comparison: compare_to_benchmarks(state, &config.categories, analytics),
        categories,
    }
}

/// Plain-text overview of the payload configuration.
pub fn format_budget_summary(data: &BudgetData) -> String {
    let config = &data.config;
    let analytics = &data.analytics;
    let symbol = config.currency_symbol.as_str();

    let presets = config
        .preset_budgets
        .iter()
        .map(|&amount| format_currency_full(amount, symbol))
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        "Budget Allocator Configuration".to_string(),
        "==============================".to_string(),
        String::new(),
        format!(
            "Default Budget: {}",
            format_currency_full(config.default_budget, symbol)
        ),
        format!("Available Presets: {presets}"),
        String::new(),
        "Categories:".to_string(),
    ];
    lines.extend(
        config
            .categories
            .iter()
            .map(|c| format!("  - {}: {}% default", c.name, c.default_percent)),
    );
    lines.push(String::new());
    lines.push(format!("Historical Data: {} months", analytics.history.len()));
    lines.push(format!("Benchmark Stages: {}", analytics.stages.join(", ")));
    lines.push(format!("Default Stage: {}", analytics.default_stage));
    lines.join("\n")
}

/// `$250,000`; fractional cents are kept up to two places.
pub fn format_currency_full(amount: f64, symbol: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let fraction = cents % 100;
    if fraction == 0 {
        format!("{sign}{symbol}{whole}")
    } else if fraction % 10 == 0 {
        format!("{sign}{symbol}{whole}.{}", fraction / 10)
    } else {
        format!("{sign}{symbol}{whole}.{fraction:02}")
    }
}

/// `$250K` for amounts of a thousand or more.
pub fn format_currency_short(amount: f64, symbol: &str) -> String {
    if amount >= 1000.0 {
        format!("{symbol}{}K", (amount / 1000.0).round() as i64)
    } else {
        format_currency_full(amount, symbol)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{HISTORY_SEED, budget_data};
    use crate::core::types::{BalanceStatus, Comparison, Direction, PercentileBand};
    use chrono::NaiveDate;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_data() -> BudgetData {
        budget_data(
            HISTORY_SEED,
            NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date"),
        )
    }

    #[test]
    fn default_report_is_balanced_against_series_a() {
        let data = sample_data();
        let state = AllocationState::from_defaults(&data);
        let report = build_report(&data, &state);

        assert_eq!(report.stage, "Series A");
        assert_eq!(report.budget, 100_000.0);
        assert_approx(report.total_percent, 100.0);
        assert_approx(report.allocated_amount, 100_000.0);
        assert_eq!(report.balance, BalanceStatus::Balanced);
        assert_eq!(report.categories.len(), 5);
        // Defaults: engineering 35 vs median 40 is the largest gap.
        let deviation = report.comparison.result().expect("material deviation");
        assert_eq!(deviation.category, "Engineering");
        assert_eq!(deviation.deviation, 5);
        assert_eq!(deviation.direction, Direction::Below);
    }

    #[test]
    fn rows_carry_amount_percentile_band_and_history() {
        let data = sample_data();
        let state = AllocationState::from_defaults(&data).with_budget(250_000.0);
        let report = build_report(&data, &state);

        let marketing = &report.categories[0];
        assert_eq!(marketing.id, "marketing");
        assert_approx(marketing.amount, 62_500.0);
        assert_eq!(marketing.amount_label, "$63K");
        assert_eq!(marketing.percentile, Some(50.0));
        assert_eq!(marketing.band, Some(PercentileBand::Normal));
        assert_eq!(marketing.history.len(), 24);
        assert!(marketing.trend.is_some());

        let rd = &report.categories[4];
        // 10 against Series A 8/12/15 sits halfway between p25 and p50.
        assert_eq!(rd.percentile, Some(37.5));
        assert_eq!(rd.band, Some(PercentileBand::Low));
        assert_eq!(rd.amount_label, "$25K");
    }

    #[test]
    fn unknown_stage_drops_percentiles_and_comparison() {
        let data = sample_data();
        let state = AllocationState::from_defaults(&data).with_stage("Pre-Seed");
        let report = build_report(&data, &state);

        assert_eq!(report.comparison, Comparison::NotAvailable);
        assert!(report.categories.iter().all(|row| row.percentile.is_none()));
        assert!(report.categories.iter().all(|row| row.band.is_none()));
    }

    #[test]
    fn report_reflects_latest_mutation() {
        let data = sample_data();
        let state = AllocationState::from_defaults(&data)
            .with_percent("marketing", 40.0)
            .expect("known category");
        let report = build_report(&data, &state);

        assert_approx(report.total_percent, 115.0);
        match report.balance {
            BalanceStatus::Over { by } => assert_approx(by, 15.0),
            other => panic!("expected over-allocation, got {other:?}"),
        }
        let deviation = report.comparison.result().expect("material deviation");
        assert_eq!(deviation.category, "Marketing");
        assert_eq!(deviation.deviation, 15);
        assert_eq!(deviation.direction, Direction::Above);
    }

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let data = sample_data();
        let report = build_report(&data, &AllocationState::from_defaults(&data));
        let json = serde_json::to_string(&report).expect("report should serialize");
        assert!(json.contains("\"totalPercent\""));
        assert!(json.contains("\"allocatedAmount\""));
        assert!(json.contains("\"currencySymbol\""));
        assert!(json.contains("\"amountLabel\":\"$25K\""));
        assert!(json.contains("\"balance\":{\"status\":\"balanced\"}"));
    }

    #[test]
    fn summary_lists_configuration() {
        let summary = format_budget_summary(&sample_data());
        let expected = "\
Budget Allocator Configuration
==============================

Default Budget: $100,000
Available Presets: $50,000, $100,000, $250,000, $500,000

Categories:
  - Marketing: 25% default
  - Engineering: 35% default
  - Operations: 15% default
  - Sales: 15% default
  - R&D: 10% default

Historical Data: 24 months
Benchmark Stages: Seed, Series A, Series B, Growth
Default Stage: Series A";
        assert_eq!(summary, expected);
    }

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency_full(1_234_567.0, "$"), "$1,234,567");
        assert_eq!(format_currency_full(999.5, "$"), "$999.5");
        assert_eq!(format_currency_full(12.34, "€"), "€12.34");
        assert_eq!(format_currency_full(0.0, "$"), "$0");
        assert_eq!(format_currency_short(62_500.0, "$"), "$63K");
        assert_eq!(format_currency_short(250.0, "$"), "$250");
    }
}
