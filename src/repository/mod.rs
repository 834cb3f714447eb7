// ==========================================
// CBAM 铝业碳排放平台 - 数据仓储层
// ==========================================
// 职责: 租户隔离的 SQLite 集合 (facilities / cbam_reports / suppliers)
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod common;
pub mod error;
pub mod facility_repo;
pub mod report_repo;
pub mod supplier_repo;

pub use common::{ListQuery, SortOrder};
pub use error::{RepositoryError, RepositoryResult};
pub use facility_repo::{FacilityPatch, FacilityRepository};
pub use report_repo::{ReportPatch, ReportRepository};
pub use supplier_repo::{SupplierPatch, SupplierRepository};
