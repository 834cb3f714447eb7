// ==========================================
// CBAM 铝业碳排放平台 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod emission;
pub mod facility;
pub mod report;
pub mod supplier;
pub mod types;

// 重导出核心类型
pub use emission::{
    EmissionEntry, EmissionsSnapshot, EntryContribution, Scope2Record,
    EU_AVERAGE_ELECTRICITY_FACTOR,
};
pub use facility::{Facility, NewFacility, Principal};
pub use report::{CbamProduct, CbamReport, EmissionFactorRecord, ALUMINIUM_CN_CODES};
pub use supplier::{MaterialRequest, MaterialType, Supplier, SupplierInvitation, VerificationStatus};
pub use types::{
    ActivityCategory, ComplianceStatus, ElectricitySource, EntrySource, FacilityStatus,
    FacilityType, FactorType, ReportStatus, SupplierStatus, UnknownVariant, UserRole,
};
