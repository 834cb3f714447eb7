// ==========================================
// CBAM 铝业碳排放平台 - 配置层
// ==========================================
// 职责: 核算阈值、回退因子、平台名称
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

pub use config_manager::{config_keys, ConfigManager, EngineSettings};
