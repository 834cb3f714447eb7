// ==========================================
// CBAM 铝业碳排放平台 - 引擎层
// ==========================================
// 职责: 排放核算、合规分级、报告编制、状态机
// 红线: Engine 不拼 SQL,不做 I/O
// ==========================================

pub mod compliance;
pub mod error;
pub mod factor_catalog;
pub mod ledger;
pub mod lifecycle;
pub mod report_compiler;
pub mod scope1;
pub mod scope2;
pub mod snapshot;

// 重导出核心引擎
pub use compliance::{ComplianceClassifier, ComplianceThresholds};
pub use error::{EngineError, EngineResult};
pub use factor_catalog::{ActivityDefinition, EmissionFactorCatalog};
pub use ledger::{AddOutcome, EmissionLedger, RejectReason};
pub use lifecycle::{ReportLifecycle, SupplierInvitationLifecycle};
pub use report_compiler::{ReportCompiler, ReportSummary, UNKNOWN_FACILITY_NAME};
pub use scope1::Scope1Aggregator;
pub use scope2::Scope2Calculator;
pub use snapshot::{recompute, EmissionsCalculator};
