// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use cbam_aluminium::api::StaticPrincipalProvider;
use cbam_aluminium::app::AppState;
use cbam_aluminium::db::{init_schema, open_sqlite_connection};
use cbam_aluminium::domain::facility::Principal;
use cbam_aluminium::domain::report::CbamProduct;
use cbam_aluminium::domain::types::UserRole;
use std::error::Error;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("路径非 UTF-8")?.to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

pub fn principal(user_id: &str, role: UserRole) -> Principal {
    Principal {
        user_id: user_id.to_string(),
        email: format!("{}@smelter.example", user_id),
        display_name: Some(user_id.to_uppercase()),
        role,
    }
}

/// 创建 AppState (当前主体为 operator)
pub fn create_test_state(user_id: &str) -> (NamedTempFile, AppState) {
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let provider = StaticPrincipalProvider::new(principal(user_id, UserRole::Operator));
    let state = AppState::new(db_path, Arc::new(provider)).expect("Failed to create AppState");
    (temp_file, state)
}

pub fn product(cn_code: &str, name: &str, volume: f64, direct: f64, indirect: f64) -> CbamProduct {
    CbamProduct {
        id: String::new(),
        cn_code: cn_code.to_string(),
        product_name: name.to_string(),
        production_volume: volume,
        unit: "t".to_string(),
        direct_emissions: direct,
        indirect_emissions: indirect,
        embedded_emissions: 0.0,
        specific_emissions: 0.0,
        emission_factors: vec![],
    }
}
