// ==========================================
// CBAM 铝业碳排放平台 - 领域类型定义
// ==========================================
// 依据: CBAM 实施条例 (EU) 2023/1773 数据来源分级
// 约束: 所有来源/状态字段均为封闭枚举,序列化为 kebab-case 小写
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 枚举解析失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知的{kind}取值: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

fn unknown(kind: &'static str, value: &str) -> UnknownVariant {
    UnknownVariant {
        kind,
        value: value.to_string(),
    }
}

// ==========================================
// 数据来源 (Entry Source)
// ==========================================
// 用于 Scope 1 活动数据与报告中的排放因子记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntrySource {
    Measured,   // 实测
    Calculated, // 计算
    Default,    // 缺省因子
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::Measured => "measured",
            EntrySource::Calculated => "calculated",
            EntrySource::Default => "default",
        }
    }
}

impl fmt::Display for EntrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntrySource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "measured" => Ok(EntrySource::Measured),
            "calculated" => Ok(EntrySource::Calculated),
            "default" => Ok(EntrySource::Default),
            _ => Err(unknown("数据来源", s)),
        }
    }
}

// ==========================================
// 电力排放因子来源 (Electricity Source)
// ==========================================
// 优先级: 供应商专属(indSEE) > 国家/地区(SEE) > 欧盟缺省
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElectricitySource {
    Supplier, // 供应商专属 (indSEE)
    National, // 国家/地区 (SEE)
    Default,  // 欧盟平均
}

impl ElectricitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElectricitySource::Supplier => "supplier",
            ElectricitySource::National => "national",
            ElectricitySource::Default => "default",
        }
    }

    /// 映射到报告中排放因子记录的来源字段
    pub fn to_entry_source(&self) -> EntrySource {
        match self {
            ElectricitySource::Supplier => EntrySource::Measured,
            ElectricitySource::National => EntrySource::Calculated,
            ElectricitySource::Default => EntrySource::Default,
        }
    }
}

impl fmt::Display for ElectricitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElectricitySource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supplier" => Ok(ElectricitySource::Supplier),
            "national" => Ok(ElectricitySource::National),
            "default" => Ok(ElectricitySource::Default),
            _ => Err(unknown("电力因子来源", s)),
        }
    }
}

// ==========================================
// 活动类别 (Activity Category)
// ==========================================
// Scope 1 台账的两条序列: 燃料燃烧 / 工艺排放
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityCategory {
    Fuel,
    Process,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Fuel => "fuel",
            ActivityCategory::Process => "process",
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fuel" => Ok(ActivityCategory::Fuel),
            "process" => Ok(ActivityCategory::Process),
            _ => Err(unknown("活动类别", s)),
        }
    }
}

// ==========================================
// 排放因子类型 (Factor Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FactorType {
    Fuel,
    Electricity,
    Process,
}

impl FactorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorType::Fuel => "fuel",
            FactorType::Electricity => "electricity",
            FactorType::Process => "process",
        }
    }
}

impl From<ActivityCategory> for FactorType {
    fn from(category: ActivityCategory) -> Self {
        match category {
            ActivityCategory::Fuel => FactorType::Fuel,
            ActivityCategory::Process => FactorType::Process,
        }
    }
}

impl fmt::Display for FactorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 合规状态 (Compliance Status)
// ==========================================
// 顺序: Compliant < Warning < NonCompliant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceStatus {
    Compliant,    // 合规
    Warning,      // 偏高
    NonCompliant, // 超标
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::Warning => "warning",
            ComplianceStatus::NonCompliant => "non-compliant",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 报告状态 (Report Status)
// ==========================================
// 生命周期: draft → validated → submitted (只进不退)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Draft,     // 草稿
    Validated, // 已校验
    Submitted, // 已提交
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::Validated => "validated",
            ReportStatus::Submitted => "submitted",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(ReportStatus::Draft),
            "validated" => Ok(ReportStatus::Validated),
            "submitted" => Ok(ReportStatus::Submitted),
            _ => Err(unknown("报告状态", s)),
        }
    }
}

// ==========================================
// 供应商状态 (Supplier Status)
// ==========================================
// 生命周期: invited → pending → active → completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupplierStatus {
    Invited,   // 已邀请
    Pending,   // 待提交
    Active,    // 协作中
    Completed, // 已完成
}

impl SupplierStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierStatus::Invited => "invited",
            SupplierStatus::Pending => "pending",
            SupplierStatus::Active => "active",
            SupplierStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SupplierStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupplierStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "invited" => Ok(SupplierStatus::Invited),
            "pending" => Ok(SupplierStatus::Pending),
            "active" => Ok(SupplierStatus::Active),
            "completed" => Ok(SupplierStatus::Completed),
            _ => Err(unknown("供应商状态", s)),
        }
    }
}

// ==========================================
// 设施类型与状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FacilityType {
    Primary,   // 原铝
    Secondary, // 再生铝
}

impl FacilityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacilityType::Primary => "primary",
            FacilityType::Secondary => "secondary",
        }
    }
}

impl FromStr for FacilityType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" => Ok(FacilityType::Primary),
            "secondary" => Ok(FacilityType::Secondary),
            _ => Err(unknown("设施类型", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FacilityStatus {
    Active,
    Inactive,
    Pending,
}

impl FacilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacilityStatus::Active => "active",
            FacilityStatus::Inactive => "inactive",
            FacilityStatus::Pending => "pending",
        }
    }
}

impl FromStr for FacilityStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(FacilityStatus::Active),
            "inactive" => Ok(FacilityStatus::Inactive),
            "pending" => Ok(FacilityStatus::Pending),
            _ => Err(unknown("设施状态", s)),
        }
    }
}

// ==========================================
// 用户角色 (User Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    Admin,
    Manager,
    Operator,
    Viewer,
}

impl UserRole {
    /// 只读角色不允许写入
    pub fn can_write(&self) -> bool {
        !matches!(self, UserRole::Viewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compliance_status_serializes_kebab_case() {
        let json = serde_json::to_string(&ComplianceStatus::NonCompliant).unwrap();
        assert_eq!(json, "\"non-compliant\"");
        assert_eq!(ComplianceStatus::NonCompliant.to_string(), "non-compliant");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Validated".parse::<ReportStatus>(), Ok(ReportStatus::Validated));
        assert_eq!(" pending ".parse::<SupplierStatus>(), Ok(SupplierStatus::Pending));
        assert!("archived".parse::<ReportStatus>().is_err());
        assert_eq!("measured".parse::<EntrySource>(), Ok(EntrySource::Measured));
    }

    #[test]
    fn test_unknown_variant_is_std_error() {
        let err = "archived".parse::<ReportStatus>().unwrap_err();
        assert_eq!(err.to_string(), "未知的报告状态取值: archived");
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_status_ordering_is_forward() {
        assert!(ReportStatus::Draft < ReportStatus::Validated);
        assert!(ReportStatus::Validated < ReportStatus::Submitted);
        assert!(SupplierStatus::Invited < SupplierStatus::Completed);
    }
}
