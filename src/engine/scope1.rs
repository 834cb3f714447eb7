// ==========================================
// CBAM 铝业碳排放平台 - Scope 1 直接排放汇总
// ==========================================
// 规则: total = Σ(quantity × emission_factor), 覆盖燃料与工艺两条序列
// ==========================================

use crate::domain::emission::EntryContribution;
use crate::engine::ledger::EmissionLedger;

/// Scope 1 汇总器 (无状态)
pub struct Scope1Aggregator;

impl Scope1Aggregator {
    /// 直接排放总量 (tCO2e)
    pub fn total(ledger: &EmissionLedger) -> f64 {
        ledger.entries().map(|e| e.contribution()).sum()
    }

    /// 逐条贡献明细,顺序与台账一致
    pub fn breakdown(ledger: &EmissionLedger) -> Vec<EntryContribution> {
        ledger
            .entries()
            .map(|e| EntryContribution {
                entry_id: e.id.clone(),
                category: e.category,
                contribution: e.contribution(),
            })
            .collect()
    }
}
