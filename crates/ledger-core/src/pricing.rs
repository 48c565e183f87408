//! Per-model debit cost table.
//!
//! The transaction engine is agnostic to how cost is computed; the HTTP
//! layer looks the billed action up here and passes a fixed positive amount.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default cost in credits for models without an explicit entry.
const DEFAULT_MODEL_COST: i64 = 1;

/// Cost table keyed by model name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostTable {
    /// Explicit per-model costs, in credits.
    pub costs: HashMap<String, i64>,

    /// Cost applied to models not listed in `costs`.
    pub default_cost: i64,
}

impl CostTable {
    /// Look up the debit cost for a model.
    #[must_use]
    pub fn cost_for(&self, model: &str) -> i64 {
        self.costs.get(model).copied().unwrap_or(self.default_cost)
    }
}

impl Default for CostTable {
    fn default() -> Self {
        let mut costs = HashMap::new();
        costs.insert("gpt-4".to_string(), 2);

        Self {
            costs,
            default_cost: DEFAULT_MODEL_COST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpt4_costs_two() {
        let table = CostTable::default();
        assert_eq!(table.cost_for("gpt-4"), 2);
    }

    #[test]
    fn unknown_model_costs_default() {
        let table = CostTable::default();
        assert_eq!(table.cost_for("gpt-3.5-turbo"), 1);
        assert_eq!(table.cost_for("claude-3"), 1);
    }
}
