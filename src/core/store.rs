use serde::Serialize;

use super::error::{Error, Result};
use super::types::{BalanceStatus, BudgetData, Category};

const BALANCE_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAllocation {
    pub category_id: String,
    pub percent: f64,
}

/// Immutable snapshot of the user's allocation.
///
/// Allocations are kept in catalog order. Every mutation returns a new
/// snapshot and leaves the receiver untouched; totals are never normalised,
/// so over- and under-allocation are ordinary states.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationState {
    allocations: Vec<CategoryAllocation>,
    budget: f64,
    stage: String,
}

impl AllocationState {
    pub fn new(categories: &[Category], budget: f64, stage: impl Into<String>) -> Self {
        Self {
            allocations: categories
                .iter()
                .map(|category| CategoryAllocation {
                    category_id: category.id.clone(),
                    percent: category.default_percent,
                })
                .collect(),
            budget,
            stage: stage.into(),
        }
    }

    /// Snapshot seeded from the payload's category defaults, default budget
    /// and default stage.
    pub fn from_defaults(data: &BudgetData) -> Self {
        Self::new(
            &data.config.categories,
            data.config.default_budget,
            data.analytics.default_stage.clone(),
        )
    }

    pub fn allocations(&self) -> &[CategoryAllocation] {
        &self.allocations
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn percent(&self, category_id: &str) -> Option<f64> {
        self.allocations
            .iter()
            .find(|a| a.category_id == category_id)
            .map(|a| a.percent)
    }

    pub fn amount(&self, category_id: &str) -> Option<f64> {
        self.percent(category_id)
            .map(|percent| percent / 100.0 * self.budget)
    }

    /// Replaces one category's share. Other categories keep their values.
    pub fn with_percent(&self, category_id: &str, percent: f64) -> Result<Self> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(Error::InvalidPercent {
                category: category_id.to_string(),
                value: percent,
            });
        }

        let index = self
            .allocations
            .iter()
            .position(|a| a.category_id == category_id)
            .ok_or_else(|| Error::UnknownCategory(category_id.to_string()))?;

        let mut next = self.clone();
        next.allocations[index].percent = percent;
        Ok(next)
    }

    /// Callers are expected to check the amount against the preset list.
    pub fn with_budget(&self, budget: f64) -> Self {
        Self {
            budget,
            ..self.clone()
        }
    }

    pub fn with_stage(&self, stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..self.clone()
        }
    }

    pub fn total_percent(&self) -> f64 {
        self.allocations.iter().map(|a| a.percent).sum()
    }

    pub fn allocated_amount(&self) -> f64 {
        self.total_percent() / 100.0 * self.budget
    }

    pub fn balance(&self) -> BalanceStatus {
        let total = self.total_percent();
        let gap = total - 100.0;
        if gap.abs() < BALANCE_TOLERANCE {
            BalanceStatus::Balanced
        } else if gap > 0.0 {
            BalanceStatus::Over { by: gap }
        } else {
            BalanceStatus::Under { by: -gap }
        }
    }
}
