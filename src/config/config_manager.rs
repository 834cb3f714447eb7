// ==========================================
// CBAM 铝业碳排放平台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (scope_id='global')
// 规则: 配置格式错误时记录告警并回退缺省值
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::emission::EU_AVERAGE_ELECTRICITY_FACTOR;
use crate::engine::compliance::ComplianceThresholds;
use crate::engine::factor_catalog::{
    EmissionFactorCatalog, DEFAULT_FUEL_FALLBACK, DEFAULT_PROCESS_FALLBACK,
};
use crate::engine::snapshot::EmissionsCalculator;
use crate::export::CbamXmlSerializer;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：对传入连接再次应用统一 PRAGMA（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取非负浮点配置,格式错误回退缺省值
    fn get_non_negative_f64(&self, key: &str, default: f64) -> Result<f64, Box<dyn Error>> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => {
                tracing::warn!(config_key = key, raw_value = %raw, default, "配置格式错误，使用缺省值");
                Ok(default)
            }
        }
    }

    /// 同步加载核算引擎配置
    pub fn load_engine_settings(&self) -> Result<EngineSettings, Box<dyn Error>> {
        let defaults = ComplianceThresholds::default();
        let warning_above =
            self.get_non_negative_f64(config_keys::COMPLIANCE_WARNING_THRESHOLD, defaults.warning_above)?;
        let non_compliant_above = self.get_non_negative_f64(
            config_keys::COMPLIANCE_NON_COMPLIANT_THRESHOLD,
            defaults.non_compliant_above,
        )?;
        let fuel_fallback = self.get_non_negative_f64(config_keys::FUEL_FALLBACK_FACTOR, DEFAULT_FUEL_FALLBACK)?;
        let process_fallback =
            self.get_non_negative_f64(config_keys::PROCESS_FALLBACK_FACTOR, DEFAULT_PROCESS_FALLBACK)?;
        let default_electricity_factor = self.get_non_negative_f64(
            config_keys::DEFAULT_ELECTRICITY_FACTOR,
            EU_AVERAGE_ELECTRICITY_FACTOR,
        )?;
        let platform_name = self
            .get_config_value(config_keys::PLATFORM_NAME)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| crate::APP_NAME.to_string());

        let settings = EngineSettings {
            catalog: EmissionFactorCatalog::with_fallbacks(fuel_fallback, process_fallback),
            thresholds: ComplianceThresholds::new(warning_above, non_compliant_above),
            default_electricity_factor,
            platform_name,
        };
        tracing::debug!(?settings, "核算配置已加载");
        Ok(settings)
    }
}

// ==========================================
// EngineSettings - 核算引擎配置
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub catalog: EmissionFactorCatalog,
    pub thresholds: ComplianceThresholds,
    pub default_electricity_factor: f64,
    pub platform_name: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            catalog: EmissionFactorCatalog::new(),
            thresholds: ComplianceThresholds::default(),
            default_electricity_factor: EU_AVERAGE_ELECTRICITY_FACTOR,
            platform_name: crate::APP_NAME.to_string(),
        }
    }
}

impl EngineSettings {
    /// 按配置新建核算会话
    pub fn new_calculator(&self) -> EmissionsCalculator {
        EmissionsCalculator::with_settings(self.catalog, self.thresholds)
            .with_default_electricity_factor(self.default_electricity_factor)
    }

    pub fn serializer(&self) -> CbamXmlSerializer {
        CbamXmlSerializer::new(self.platform_name.clone())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 合规阈值
    pub const COMPLIANCE_WARNING_THRESHOLD: &str = "compliance_warning_threshold";
    pub const COMPLIANCE_NON_COMPLIANT_THRESHOLD: &str = "compliance_non_compliant_threshold";

    // 排放因子
    pub const FUEL_FALLBACK_FACTOR: &str = "fuel_fallback_factor";
    pub const PROCESS_FALLBACK_FACTOR: &str = "process_fallback_factor";
    pub const DEFAULT_ELECTRICITY_FACTOR: &str = "default_electricity_factor";

    // 导出
    pub const PLATFORM_NAME: &str = "platform_name";
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn manager() -> (NamedTempFile, ConfigManager) {
        let file = NamedTempFile::new().unwrap();
        let manager = ConfigManager::new(file.path().to_str().unwrap()).unwrap();
        (file, manager)
    }

    #[test]
    fn test_defaults_when_unset() {
        let (_file, manager) = manager();
        assert_eq!(manager.load_engine_settings().unwrap(), EngineSettings::default());
    }

    #[test]
    fn test_overrides_and_malformed_values() {
        let (_file, manager) = manager();
        manager.set_global_config_value(config_keys::COMPLIANCE_WARNING_THRESHOLD, "8").unwrap();
        manager.set_global_config_value(config_keys::FUEL_FALLBACK_FACTOR, "abc").unwrap();
        manager.set_global_config_value(config_keys::DEFAULT_ELECTRICITY_FACTOR, "0.4").unwrap();

        let settings = manager.load_engine_settings().unwrap();
        assert_eq!(settings.thresholds.warning_above, 8.0);
        assert_eq!(settings.thresholds.non_compliant_above, 15.0);
        assert_eq!(settings.catalog.fallback(crate::domain::types::ActivityCategory::Fuel), DEFAULT_FUEL_FALLBACK);
        assert_eq!(settings.default_electricity_factor, 0.4);
        assert_eq!(settings.new_calculator().scope2().emission_factor, 0.4);

        let snapshot = manager.get_config_snapshot().unwrap();
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_platform_name_is_trimmed() {
        let (_file, manager) = manager();
        manager.set_global_config_value(config_keys::PLATFORM_NAME, "  Smelter Portal ").unwrap();
        manager.set_global_config_value(config_keys::COMPLIANCE_NON_COMPLIANT_THRESHOLD, "-3").unwrap();

        let settings = manager.load_engine_settings().unwrap();
        assert_eq!(settings.platform_name, "Smelter Portal");
        assert_eq!(settings.serializer(), CbamXmlSerializer::new("Smelter Portal"));
        assert_eq!(settings.thresholds, ComplianceThresholds::default());
        assert_eq!(settings.catalog.fallback(crate::domain::types::ActivityCategory::Process), DEFAULT_PROCESS_FALLBACK);
    }
}
