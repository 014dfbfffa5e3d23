// ==========================================
// 出口单证工作台 - 杂费聚合器
// ==========================================
// 职责: 有符号杂费行 → 费用/折扣/净影响合计
// 符号约定: 金额 >= 0 计入费用, < 0 以绝对值计入折扣
// ==========================================

use crate::domain::charge::Charge;
use serde::{Deserialize, Serialize};

// ==========================================
// ChargeTotals - 杂费合计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeTotals {
    pub total_charges: f64,   // Σ(amount >= 0)
    pub total_discounts: f64, // Σ|amount < 0|
    pub net_impact: f64,      // total_charges - total_discounts
}

// ==========================================
// ChargesAggregator - 杂费聚合器
// ==========================================
pub struct ChargesAggregator;

impl ChargesAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 每次杂费变更后整表重算合计
    pub fn totals(&self, charges: &[Charge]) -> ChargeTotals {
        let mut totals = ChargeTotals::default();
        for charge in charges {
            if charge.amount >= 0.0 {
                totals.total_charges += charge.amount;
            } else {
                totals.total_discounts += charge.amount.abs();
            }
        }
        totals.net_impact = totals.total_charges - totals.total_discounts;
        totals
    }
}

impl Default for ChargesAggregator {
    fn default() -> Self {
        ChargesAggregator::new()
    }
}
