// ==========================================
// CBAM 铝业碳排放平台 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{
    ApiResult, EmissionsApi, FacilityApi, PrincipalProvider, ReportApi, SupplierApi,
};
use crate::config::{ConfigManager, EngineSettings};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::facility::Principal;
use crate::persistence::{PersistenceDispatcher, PersistenceFailureLog};
use crate::repository::{FacilityRepository, ReportRepository, SupplierRepository};

/// 应用状态
///
/// 所有 API 共用一个 SQLite 连接和一个持久化分发器
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 启动时加载的核算配置
    pub settings: EngineSettings,

    pub config_manager: Arc<ConfigManager>,
    pub emissions_api: Arc<EmissionsApi>,
    pub facility_api: Arc<FacilityApi>,
    pub report_api: Arc<ReportApi>,
    pub supplier_api: Arc<SupplierApi>,

    dispatcher: Arc<PersistenceDispatcher>,
    principals: Arc<dyn PrincipalProvider>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径 (不存在时自动创建并建表)
    /// - principals: 当前主体来源
    pub fn new(db_path: String, principals: Arc<dyn PrincipalProvider>) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let settings = config_manager
            .load_engine_settings()
            .map_err(|e| format!("无法加载核算配置: {}", e))?;

        // ==========================================
        // Repository层
        // ==========================================
        let facility_repo = Arc::new(FacilityRepository::from_connection(conn.clone()));
        let report_repo = Arc::new(ReportRepository::from_connection(conn.clone()));
        let supplier_repo = Arc::new(SupplierRepository::from_connection(conn));

        let dispatcher = Arc::new(PersistenceDispatcher::new(PersistenceFailureLog::new()));

        // ==========================================
        // API层
        // ==========================================
        let emissions_api = Arc::new(EmissionsApi::new(settings.clone()));
        let facility_api = Arc::new(FacilityApi::new(facility_repo.clone(), dispatcher.clone()));
        let report_api = Arc::new(ReportApi::new(
            facility_repo,
            report_repo,
            dispatcher.clone(),
            settings.serializer(),
        ));
        let supplier_api = Arc::new(SupplierApi::new(supplier_repo, dispatcher.clone()));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            settings,
            config_manager,
            emissions_api,
            facility_api,
            report_api,
            supplier_api,
            dispatcher,
            principals,
        })
    }

    /// 当前登录主体
    pub async fn current_principal(&self) -> ApiResult<Principal> {
        self.principals.current_principal().await
    }

    /// 后台写入失败记录
    pub fn persistence_failures(&self) -> &PersistenceFailureLog {
        self.dispatcher.failures()
    }

    /// 等待后台写入完成
    pub async fn flush(&self) {
        self.dispatcher.flush().await;
    }
}

/// 获取默认数据库路径
///
/// 优先读取环境变量 CBAM_DB_PATH,否则使用用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("CBAM_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./cbam_aluminium.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("cbam-aluminium-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("cbam-aluminium");
        }

        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&path).is_ok() {
            path = path.join("cbam_aluminium.db");
        } else {
            path = PathBuf::from("./cbam_aluminium.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }
}
