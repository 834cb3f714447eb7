// ==========================================
// CBAM 铝业碳排放平台 - 报告领域模型
// ==========================================
// 职责: CBAM 报告 / 产品 / 排放因子记录
// 红线: total_emissions 恒等于各产品 embedded_emissions 之和
// ==========================================

use crate::domain::types::{EntrySource, FactorType, ReportStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// EmissionFactorRecord - 排放因子记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionFactorRecord {
    #[serde(rename = "type")]
    pub factor_type: FactorType,
    pub source: EntrySource,
    pub value: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

// ==========================================
// CbamProduct - 报告产品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CbamProduct {
    pub id: String,
    pub cn_code: String,
    pub product_name: String,
    pub production_volume: f64,
    pub unit: String,
    pub direct_emissions: f64,   // Scope 1
    pub indirect_emissions: f64, // Scope 2
    pub embedded_emissions: f64, // direct + indirect
    pub specific_emissions: f64, // embedded / volume
    #[serde(default)]
    pub emission_factors: Vec<EmissionFactorRecord>,
}

impl CbamProduct {
    /// 按直接/间接排放和产量重新推导内含排放与比排放
    pub fn normalized(mut self) -> Self {
        self.embedded_emissions = self.direct_emissions + self.indirect_emissions;
        self.specific_emissions = if self.production_volume > 0.0 {
            self.embedded_emissions / self.production_volume
        } else {
            0.0
        };
        self
    }
}

// ==========================================
// CbamReport - CBAM 报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CbamReport {
    pub id: String,
    pub reporting_period: String,
    pub facility_id: String,
    pub facility_name: String,
    pub installation_id: String,
    pub products: Vec<CbamProduct>,
    pub total_emissions: f64,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub validated_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl CbamReport {
    pub fn is_draft(&self) -> bool {
        self.status == ReportStatus::Draft
    }

    /// 查找产品
    pub fn product(&self, product_id: &str) -> Option<&CbamProduct> {
        self.products.iter().find(|p| p.id == product_id)
    }
}

// ==========================================
// CN 编码参考表 (铝及铝制品)
// ==========================================
pub const ALUMINIUM_CN_CODES: &[(&str, &str)] = &[
    ("7601.10.00", "Unwrought aluminium, not alloyed"),
    ("7601.20.91", "Unwrought aluminium alloys"),
    ("7604.10.10", "Bars, rods and profiles of aluminium, not alloyed"),
    ("7604.29.10", "Bars, rods and profiles of aluminium alloys"),
    (
        "7606.11.10",
        "Rectangular plates, sheets and strip, of aluminium, not alloyed",
    ),
    (
        "7606.12.10",
        "Rectangular plates, sheets and strip, of aluminium alloys",
    ),
];

/// 查询 CN 编码描述 (仅限参考表)
pub fn cn_code_description(code: &str) -> Option<&'static str> {
    ALUMINIUM_CN_CODES
        .iter()
        .find(|(c, _)| *c == code.trim())
        .map(|(_, name)| *name)
}

/// 校验 CN 编码格式: dddd.dd.dd
pub fn is_well_formed_cn_code(code: &str) -> bool {
    let parts: Vec<&str> = code.trim().split('.').collect();
    parts.len() == 3
        && parts[0].len() == 4
        && parts[1].len() == 2
        && parts[2].len() == 2
        && parts
            .iter()
            .all(|p| p.chars().all(|c| c.is_ascii_digit()))
}
