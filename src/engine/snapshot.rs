// ==========================================
// CBAM 铝业碳排放平台 - 排放快照引擎
// ==========================================
// 职责: 台账 + 电力记录 + 产量 → 排放快照
// 红线: 每次变更后立即全量重算,调用返回前快照已是最新
// 红线: recompute 为纯函数,相同输入得到逐位相同的输出
// ==========================================

use crate::domain::emission::{EmissionsSnapshot, Scope2Record};
use crate::domain::report::{CbamProduct, EmissionFactorRecord};
use crate::domain::types::{ActivityCategory, ElectricitySource, EntrySource, FactorType};
use crate::engine::compliance::{ComplianceClassifier, ComplianceThresholds};
use crate::engine::factor_catalog::EmissionFactorCatalog;
use crate::engine::ledger::{AddOutcome, EmissionLedger};
use crate::engine::scope1::Scope1Aggregator;
use crate::engine::scope2::{coerce_non_negative, Scope2Calculator};

// ==========================================
// 纯重算函数
// ==========================================

/// 全量重算排放快照
///
/// # 参数
/// - ledger: Scope 1 台账
/// - scope2: 外购电力记录
/// - production_volume: 产量 (t),非法值按 0 处理
/// - thresholds: 合规阈值
pub fn recompute(
    ledger: &EmissionLedger,
    scope2: &Scope2Record,
    production_volume: f64,
    thresholds: &ComplianceThresholds,
) -> EmissionsSnapshot {
    let scope1_total = Scope1Aggregator::total(ledger);
    let scope2_total = Scope2Calculator::compute_record(scope2);
    let total_emissions = scope1_total + scope2_total;
    let production_volume = coerce_non_negative(production_volume);
    let specific_emissions = if production_volume > 0.0 {
        total_emissions / production_volume
    } else {
        0.0
    };

    EmissionsSnapshot {
        scope1_total,
        scope2_total,
        total_emissions,
        production_volume,
        specific_emissions,
        compliance_status: ComplianceClassifier::classify_with(specific_emissions, thresholds),
        breakdown: Scope1Aggregator::breakdown(ledger),
    }
}

// ==========================================
// EmissionsCalculator - 核算会话
// ==========================================
// 持有台账/电力记录/产量,每个变更方法返回前完成重算
#[derive(Debug, Clone)]
pub struct EmissionsCalculator {
    ledger: EmissionLedger,
    scope2: Scope2Record,
    production_volume: f64,
    thresholds: ComplianceThresholds,
    snapshot: EmissionsSnapshot,
}

impl EmissionsCalculator {
    pub fn new() -> Self {
        Self::with_settings(EmissionFactorCatalog::new(), ComplianceThresholds::default())
    }

    pub fn with_settings(catalog: EmissionFactorCatalog, thresholds: ComplianceThresholds) -> Self {
        let ledger = EmissionLedger::with_catalog(catalog);
        let scope2 = Scope2Record::default();
        let snapshot = recompute(&ledger, &scope2, 0.0, &thresholds);
        Self {
            ledger,
            scope2,
            production_volume: 0.0,
            thresholds,
            snapshot,
        }
    }

    /// 指定缺省电力因子 (来自配置)
    pub fn with_default_electricity_factor(mut self, factor: f64) -> Self {
        self.scope2.emission_factor = coerce_non_negative(factor);
        self.refresh();
        self
    }

    // ===== 只读访问 =====

    pub fn snapshot(&self) -> &EmissionsSnapshot {
        &self.snapshot
    }

    pub fn ledger(&self) -> &EmissionLedger {
        &self.ledger
    }

    pub fn scope2(&self) -> &Scope2Record {
        &self.scope2
    }

    pub fn production_volume(&self) -> f64 {
        self.production_volume
    }

    // ===== 台账变更 =====

    pub fn add_fuel(&mut self, fuel_type: &str, quantity: f64, provenance: EntrySource) -> AddOutcome {
        self.add_entry(ActivityCategory::Fuel, fuel_type, quantity, provenance)
    }

    pub fn add_process(&mut self, process_type: &str, quantity: f64, provenance: EntrySource) -> AddOutcome {
        self.add_entry(ActivityCategory::Process, process_type, quantity, provenance)
    }

    pub fn add_entry(
        &mut self,
        category: ActivityCategory,
        activity_type: &str,
        quantity: f64,
        provenance: EntrySource,
    ) -> AddOutcome {
        let outcome = self.ledger.add(category, activity_type, quantity, provenance);
        if outcome.is_accepted() {
            self.refresh();
        }
        outcome
    }

    pub fn remove_entry(&mut self, entry_id: &str) -> bool {
        let removed = self.ledger.remove(entry_id);
        if removed {
            self.refresh();
        }
        removed
    }

    pub fn replace_entry(&mut self, entry_id: &str, quantity: f64, provenance: EntrySource) -> AddOutcome {
        let outcome = self.ledger.replace(entry_id, quantity, provenance);
        if outcome.is_accepted() {
            self.refresh();
        }
        outcome
    }

    // ===== 电力与产量变更 (非法数值归零) =====

    pub fn set_electricity_consumption(&mut self, consumption: f64) {
        self.scope2.electricity_consumption = coerce_non_negative(consumption);
        self.refresh();
    }

    pub fn set_electricity_factor(&mut self, factor: f64) {
        self.scope2.emission_factor = coerce_non_negative(factor);
        self.refresh();
    }

    pub fn set_electricity_source(&mut self, source: ElectricitySource) {
        self.scope2.provenance = source;
        self.refresh();
    }

    pub fn set_production_volume(&mut self, volume: f64) {
        self.production_volume = coerce_non_negative(volume);
        self.refresh();
    }

    /// 由当前快照派生报告产品
    ///
    /// direct = Scope 1, indirect = Scope 2, 排放因子取自台账条目与电力记录
    pub fn to_product(&self, cn_code: &str, product_name: &str, unit: &str) -> CbamProduct {
        let mut emission_factors: Vec<EmissionFactorRecord> = self
            .ledger
            .entries()
            .map(|e| EmissionFactorRecord {
                factor_type: FactorType::from(e.category),
                source: e.provenance,
                value: e.emission_factor,
                unit: format!("tCO2/{}", e.unit),
                documentation: Some(e.name.clone()),
            })
            .collect();

        if self.scope2.electricity_consumption > 0.0 {
            emission_factors.push(EmissionFactorRecord {
                factor_type: FactorType::Electricity,
                source: self.scope2.provenance.to_entry_source(),
                value: self.scope2.emission_factor,
                unit: "tCO2/MWh".to_string(),
                documentation: None,
            });
        }

        CbamProduct {
            id: format!("product-{}", uuid::Uuid::new_v4()),
            cn_code: cn_code.trim().to_string(),
            product_name: product_name.trim().to_string(),
            production_volume: self.snapshot.production_volume,
            unit: unit.to_string(),
            direct_emissions: self.snapshot.scope1_total,
            indirect_emissions: self.snapshot.scope2_total,
            embedded_emissions: self.snapshot.total_emissions,
            specific_emissions: self.snapshot.specific_emissions,
            emission_factors,
        }
    }

    fn refresh(&mut self) {
        self.snapshot = recompute(
            &self.ledger,
            &self.scope2,
            self.production_volume,
            &self.thresholds,
        );
        tracing::debug!(
            scope1_total = self.snapshot.scope1_total,
            scope2_total = self.snapshot.scope2_total,
            specific_emissions = self.snapshot.specific_emissions,
            status = %self.snapshot.compliance_status,
            "排放快照已重算"
        );
    }
}

impl Default for EmissionsCalculator {
    fn default() -> Self {
        Self::new()
    }
}
