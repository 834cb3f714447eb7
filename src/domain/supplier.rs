// ==========================================
// CBAM 铝业碳排放平台 - 供应商协作领域模型
// ==========================================
// 职责: 供应商 / 原料数据请求 / 邀请
// ==========================================

use crate::domain::types::{ElectricitySource, SupplierStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// 原料类型 (Material Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaterialType {
    Bauxite,
    Alumina,
    PrimaryAluminium,
    SecondaryAluminium,
    SemiFinished,
}

impl MaterialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::Bauxite => "bauxite",
            MaterialType::Alumina => "alumina",
            MaterialType::PrimaryAluminium => "primary-aluminium",
            MaterialType::SecondaryAluminium => "secondary-aluminium",
            MaterialType::SemiFinished => "semi-finished",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaterialType::Bauxite => "Bauxite",
            MaterialType::Alumina => "Alumina",
            MaterialType::PrimaryAluminium => "Primary Aluminium",
            MaterialType::SecondaryAluminium => "Secondary Aluminium",
            MaterialType::SemiFinished => "Semi-finished Products",
        }
    }

    /// 所有原料统一按吨计
    pub fn unit(&self) -> &'static str {
        "tonnes"
    }
}

// ==========================================
// 核验状态 (Verification Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

// ==========================================
// MaterialRequest - 原料排放数据请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    pub id: String,
    pub material_name: String,
    pub material_type: MaterialType,
    pub annual_volume: f64,
    pub unit: String,
    pub embedded_emissions: Option<f64>,
    pub emission_factor: Option<f64>,
    pub see_source: Option<ElectricitySource>,
    pub verification_status: VerificationStatus,
    pub documentation: Option<String>,
}

impl MaterialRequest {
    /// 为邀请生成空白请求 (待供应商填报)
    pub fn blank(material_type: MaterialType) -> Self {
        Self {
            id: format!("material-{}", uuid::Uuid::new_v4()),
            material_name: material_type.label().to_string(),
            material_type,
            annual_volume: 0.0,
            unit: material_type.unit().to_string(),
            embedded_emissions: None,
            emission_factor: None,
            see_source: None,
            verification_status: VerificationStatus::Pending,
            documentation: None,
        }
    }
}

// ==========================================
// Supplier - 供应商
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub email: String,
    pub country: String,
    pub status: SupplierStatus,
    pub invited_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub materials: Vec<MaterialRequest>,
}

// ==========================================
// SupplierInvitation - 邀请请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierInvitation {
    pub supplier_name: String,
    pub supplier_email: String,
    pub materials: Vec<MaterialType>,
    #[serde(default)]
    pub message: String,
    pub due_date: Option<NaiveDate>,
}

impl SupplierInvitation {
    /// 去重后的原料类型 (保持首次出现顺序)
    pub fn distinct_materials(&self) -> Vec<MaterialType> {
        let mut seen = Vec::new();
        for m in &self.materials {
            if !seen.contains(m) {
                seen.push(*m);
            }
        }
        seen
    }
}
