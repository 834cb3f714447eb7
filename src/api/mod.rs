// ==========================================
// CBAM 铝业碳排放平台 - API 层
// ==========================================
// 职责: 面向调用方的业务接口 (引擎 + 仓储 + 后台持久化)
// ==========================================

pub mod emissions_api;
pub mod error;
pub mod facility_api;
pub mod principal;
pub mod report_api;
pub mod supplier_api;

pub use emissions_api::{EmissionsApi, SnapshotView};
pub use error::{ApiError, ApiResult};
pub use facility_api::FacilityApi;
pub use principal::{PrincipalProvider, StaticPrincipalProvider};
pub use report_api::{NewReport, ReportApi};
pub use supplier_api::{SupplierApi, SupplierSummary};
