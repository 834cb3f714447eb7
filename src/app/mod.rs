// ==========================================
// CBAM 铝业碳排放平台 - 应用层
// ==========================================
// 职责: 组装仓储、配置与 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
