// ==========================================
// CBAM 铝业碳排放平台 - 排放核算领域模型
// ==========================================
// 职责: 活动数据条目 / 外购电力记录 / 排放快照
// 红线: 快照只由台账+电力记录+产量推导,不可手工编辑
// ==========================================

use crate::domain::types::{ActivityCategory, ComplianceStatus, ElectricitySource, EntrySource};
use serde::{Deserialize, Serialize};

/// 欧盟平均电力排放因子 (tCO2/MWh)
pub const EU_AVERAGE_ELECTRICITY_FACTOR: f64 = 0.275;

// ==========================================
// EmissionEntry - 活动数据条目
// ==========================================
// 添加后不可变,只能整体替换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionEntry {
    pub id: String,
    pub category: ActivityCategory,
    pub activity_type: String, // 活动类型代码 (natural-gas / primary-aluminium ...)
    pub name: String,          // 显示名称
    pub quantity: f64,         // 活动量 (>0)
    pub unit: String,          // 活动量单位 (GJ / L / kg / t)
    pub emission_factor: f64,  // 添加时快照的排放因子
    pub provenance: EntrySource,
}

impl EmissionEntry {
    /// 单条排放贡献 (tCO2e)
    pub fn contribution(&self) -> f64 {
        self.quantity * self.emission_factor
    }
}

// ==========================================
// Scope2Record - 外购电力记录
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope2Record {
    pub electricity_consumption: f64, // MWh
    pub emission_factor: f64,         // tCO2/MWh
    pub provenance: ElectricitySource,
}

impl Default for Scope2Record {
    fn default() -> Self {
        Self {
            electricity_consumption: 0.0,
            emission_factor: EU_AVERAGE_ELECTRICITY_FACTOR,
            provenance: ElectricitySource::Default,
        }
    }
}

// ==========================================
// EntryContribution - 快照中的单条贡献明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryContribution {
    pub entry_id: String,
    pub category: ActivityCategory,
    pub contribution: f64,
}

// ==========================================
// EmissionsSnapshot - 排放快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsSnapshot {
    pub scope1_total: f64,
    pub scope2_total: f64,
    pub total_emissions: f64,
    pub production_volume: f64,
    pub specific_emissions: f64,
    pub compliance_status: ComplianceStatus,
    pub breakdown: Vec<EntryContribution>,
}

impl EmissionsSnapshot {
    /// 空台账、零产量时的快照
    pub fn empty() -> Self {
        Self {
            scope1_total: 0.0,
            scope2_total: 0.0,
            total_emissions: 0.0,
            production_volume: 0.0,
            specific_emissions: 0.0,
            compliance_status: ComplianceStatus::Compliant,
            breakdown: Vec::new(),
        }
    }
}
