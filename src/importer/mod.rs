// ==========================================
// CBAM 铝业碳排放平台 - 导入层
// ==========================================
// 职责: 外部活动数据导入核算会话
// 支持: CSV
// ==========================================

pub mod activity_csv;
pub mod error;

pub use activity_csv::{ActivityCsvImporter, ActivityImportReport, RejectedRow, RowRejection};
pub use error::{ImportError, ImportResult};
