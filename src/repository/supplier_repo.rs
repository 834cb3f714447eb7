// ==========================================
// CBAM 铝业碳排放平台 - 供应商仓储
// ==========================================
// 存储: suppliers 表,原料请求以 JSON 存于 materials_json
// 排序: 按 invited_at
// ==========================================

use crate::domain::supplier::{MaterialRequest, Supplier};
use crate::domain::types::SupplierStatus;
use crate::repository::common::{format_ts, parse_enum, parse_json, parse_opt_ts, parse_ts, ListQuery};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str =
    "id, name, email, country, status, invited_at, responded_at, materials_json";

/// 供应商部分更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub country: Option<String>,
    pub status: Option<SupplierStatus>,
    pub responded_at: Option<DateTime<Utc>>,
    pub materials: Option<Vec<MaterialRequest>>,
}

impl SupplierPatch {
    /// 状态 + 响应时间 (状态推进后的持久化补丁)
    pub fn status_of(supplier: &Supplier) -> Self {
        Self {
            status: Some(supplier.status),
            responded_at: supplier.responded_at,
            ..Self::default()
        }
    }

    pub fn apply(&self, supplier: &mut Supplier) {
        if let Some(v) = &self.name {
            supplier.name = v.clone();
        }
        if let Some(v) = &self.country {
            supplier.country = v.clone();
        }
        if let Some(v) = self.status {
            supplier.status = v;
        }
        if self.responded_at.is_some() {
            supplier.responded_at = self.responded_at;
        }
        if let Some(v) = &self.materials {
            supplier.materials = v.clone();
        }
    }
}

// ==========================================
// SupplierRepository
// ==========================================
pub struct SupplierRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SupplierRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn list(&self, query: &ListQuery) -> RepositoryResult<Vec<Supplier>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM suppliers WHERE user_id = ?1 ORDER BY invited_at {}, rowid {}",
            SELECT_COLUMNS,
            query.order.as_sql(),
            query.order.as_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![query.owner_id], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get(&self, owner_id: &str, id: &str) -> RepositoryResult<Option<Supplier>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM suppliers WHERE user_id = ?1 AND id = ?2",
            SELECT_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![owner_id, id], map_row)
            .optional()?)
    }

    pub fn create(&self, owner_id: &str, supplier: &Supplier) -> RepositoryResult<Supplier> {
        let materials_json = serde_json::to_string(&supplier.materials)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO suppliers (
                id, user_id, name, email, country, status, invited_at, responded_at, materials_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                supplier.id,
                owner_id,
                supplier.name,
                supplier.email,
                supplier.country,
                supplier.status.as_str(),
                format_ts(&supplier.invited_at),
                supplier.responded_at.as_ref().map(format_ts),
                materials_json,
            ],
        )?;
        tracing::debug!(supplier_id = %supplier.id, owner_id, "供应商已写入");
        Ok(supplier.clone())
    }

    /// 部分更新;记录不存在 (或不属于该租户) 返回 NotFound
    pub fn update(&self, owner_id: &str, id: &str, patch: &SupplierPatch) -> RepositoryResult<()> {
        let mut supplier = self.get(owner_id, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Supplier".to_string(),
            id: id.to_string(),
        })?;
        patch.apply(&mut supplier);
        let materials_json = serde_json::to_string(&supplier.materials)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            UPDATE suppliers
            SET name = ?3, country = ?4, status = ?5, responded_at = ?6, materials_json = ?7
            WHERE user_id = ?1 AND id = ?2
            "#,
            params![
                owner_id,
                id,
                supplier.name,
                supplier.country,
                supplier.status.as_str(),
                supplier.responded_at.as_ref().map(format_ts),
                materials_json,
            ],
        )?;
        Ok(())
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Supplier> {
    Ok(Supplier {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        country: row.get(3)?,
        status: parse_enum(4, &row.get::<_, String>(4)?)?,
        invited_at: parse_ts(5, &row.get::<_, String>(5)?)?,
        responded_at: parse_opt_ts(6, row.get(6)?)?,
        materials: parse_json(7, &row.get::<_, String>(7)?)?,
    })
}
