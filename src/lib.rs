// ==========================================
// CBAM 铝业碳排放平台 - 核心库
// ==========================================
// 系统定位: 铝生产商 CBAM 排放核算与报告编制
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 核算与编制规则
pub mod engine;

// 导出层 - CBAM XML
pub mod export;

// 导入层 - 活动数据
pub mod importer;

// 数据仓储层 - 数据访问
pub mod repository;

// 后台持久化分发
pub mod persistence;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ActivityCategory, ComplianceStatus, ElectricitySource, EntrySource, FactorType, ReportStatus,
    SupplierStatus,
};

// 领域实体
pub use domain::{
    CbamProduct, CbamReport, EmissionEntry, EmissionsSnapshot, Facility, Principal, Scope2Record,
    Supplier,
};

// 引擎
pub use engine::{
    ComplianceClassifier, EmissionFactorCatalog, EmissionLedger, EmissionsCalculator,
    ReportCompiler, ReportLifecycle, Scope1Aggregator, Scope2Calculator,
    SupplierInvitationLifecycle,
};

// 导出
pub use export::CbamXmlSerializer;

// API
pub use api::{EmissionsApi, FacilityApi, ReportApi, SupplierApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称 (导出文档 GeneratedBy 缺省值)
pub const APP_NAME: &str = "CBAM Aluminium Emissions Platform";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "CBAM Aluminium Emissions Platform");
    }
}
