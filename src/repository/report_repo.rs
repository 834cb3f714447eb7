// ==========================================
// CBAM 铝业碳排放平台 - CBAM 报告仓储
// ==========================================
// 存储: cbam_reports 表,产品列表以 JSON 存于 products_json
// 红线: Repository 不含业务逻辑 (状态机与总量记账在 engine 层)
// 红线: 所有查询按 user_id 做租户隔离
// ==========================================

use crate::domain::report::{CbamProduct, CbamReport};
use crate::domain::types::ReportStatus;
use crate::repository::common::{format_ts, parse_enum, parse_json, parse_opt_ts, parse_ts, ListQuery};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = "id, reporting_period, facility_id, facility_name, installation_id, \
     products_json, total_emissions, status, created_at, validated_at, submitted_at";

/// 报告部分更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatch {
    pub facility_name: Option<String>,
    pub products: Option<Vec<CbamProduct>>,
    pub total_emissions: Option<f64>,
    pub status: Option<ReportStatus>,
    pub validated_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ReportPatch {
    /// 产品列表 + 总量 (产品变更后的持久化补丁)
    pub fn products_of(report: &CbamReport) -> Self {
        Self {
            products: Some(report.products.clone()),
            total_emissions: Some(report.total_emissions),
            ..Self::default()
        }
    }

    /// 状态 + 时间戳 (生命周期转换后的持久化补丁)
    pub fn status_of(report: &CbamReport) -> Self {
        Self {
            status: Some(report.status),
            validated_at: report.validated_at,
            submitted_at: report.submitted_at,
            ..Self::default()
        }
    }

    pub fn apply(&self, report: &mut CbamReport) {
        if let Some(v) = &self.facility_name {
            report.facility_name = v.clone();
        }
        if let Some(v) = &self.products {
            report.products = v.clone();
        }
        if let Some(v) = self.total_emissions {
            report.total_emissions = v;
        }
        if let Some(v) = self.status {
            report.status = v;
        }
        if self.validated_at.is_some() {
            report.validated_at = self.validated_at;
        }
        if self.submitted_at.is_some() {
            report.submitted_at = self.submitted_at;
        }
    }
}

// ==========================================
// ReportRepository
// ==========================================
pub struct ReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReportRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 列出租户下的报告
    pub fn list(&self, query: &ListQuery) -> RepositoryResult<Vec<CbamReport>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM cbam_reports WHERE user_id = ?1 ORDER BY created_at {}, rowid {}",
            SELECT_COLUMNS,
            query.order.as_sql(),
            query.order.as_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![query.owner_id], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get(&self, owner_id: &str, id: &str) -> RepositoryResult<Option<CbamReport>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM cbam_reports WHERE user_id = ?1 AND id = ?2",
            SELECT_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![owner_id, id], map_row)
            .optional()?)
    }

    pub fn create(&self, owner_id: &str, report: &CbamReport) -> RepositoryResult<CbamReport> {
        let products_json = serde_json::to_string(&report.products)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO cbam_reports (
                id, user_id, reporting_period, facility_id, facility_name, installation_id,
                products_json, total_emissions, status, created_at, validated_at, submitted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                report.id,
                owner_id,
                report.reporting_period,
                report.facility_id,
                report.facility_name,
                report.installation_id,
                products_json,
                report.total_emissions,
                report.status.as_str(),
                format_ts(&report.created_at),
                report.validated_at.as_ref().map(format_ts),
                report.submitted_at.as_ref().map(format_ts),
            ],
        )?;
        tracing::debug!(report_id = %report.id, owner_id, "报告已写入");
        Ok(report.clone())
    }

    /// 部分更新;记录不存在 (或不属于该租户) 返回 NotFound
    pub fn update(&self, owner_id: &str, id: &str, patch: &ReportPatch) -> RepositoryResult<()> {
        let mut report = self.get(owner_id, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "CbamReport".to_string(),
            id: id.to_string(),
        })?;
        patch.apply(&mut report);
        let products_json = serde_json::to_string(&report.products)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            UPDATE cbam_reports
            SET facility_name = ?3, products_json = ?4, total_emissions = ?5, status = ?6,
                validated_at = ?7, submitted_at = ?8
            WHERE user_id = ?1 AND id = ?2
            "#,
            params![
                owner_id,
                id,
                report.facility_name,
                products_json,
                report.total_emissions,
                report.status.as_str(),
                report.validated_at.as_ref().map(format_ts),
                report.submitted_at.as_ref().map(format_ts),
            ],
        )?;
        Ok(())
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<CbamReport> {
    Ok(CbamReport {
        id: row.get(0)?,
        reporting_period: row.get(1)?,
        facility_id: row.get(2)?,
        facility_name: row.get(3)?,
        installation_id: row.get(4)?,
        products: parse_json(5, &row.get::<_, String>(5)?)?,
        total_emissions: row.get(6)?,
        status: parse_enum(7, &row.get::<_, String>(7)?)?,
        created_at: parse_ts(8, &row.get::<_, String>(8)?)?,
        validated_at: parse_opt_ts(9, row.get(9)?)?,
        submitted_at: parse_opt_ts(10, row.get(10)?)?,
    })
}
