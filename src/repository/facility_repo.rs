// ==========================================
// CBAM 铝业碳排放平台 - 设施仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 所有查询按 user_id 做租户隔离
// ==========================================

use crate::domain::facility::Facility;
use crate::domain::types::{FacilityStatus, FacilityType};
use crate::repository::common::{format_ts, parse_enum, parse_ts, ListQuery};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str =
    "id, name, country, installation_id, address, facility_type, status, created_at";

/// 设施部分更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityPatch {
    pub name: Option<String>,
    pub country: Option<String>,
    pub installation_id: Option<String>,
    pub address: Option<String>,
    pub facility_type: Option<FacilityType>,
    pub status: Option<FacilityStatus>,
}

impl FacilityPatch {
    pub fn apply(&self, facility: &mut Facility) {
        if let Some(v) = &self.name {
            facility.name = v.clone();
        }
        if let Some(v) = &self.country {
            facility.country = v.clone();
        }
        if let Some(v) = &self.installation_id {
            facility.installation_id = v.clone();
        }
        if let Some(v) = &self.address {
            facility.address = v.clone();
        }
        if let Some(v) = self.facility_type {
            facility.facility_type = v;
        }
        if let Some(v) = self.status {
            facility.status = v;
        }
    }
}

// ==========================================
// FacilityRepository
// ==========================================
pub struct FacilityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FacilityRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 列出租户下的设施
    pub fn list(&self, query: &ListQuery) -> RepositoryResult<Vec<Facility>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM facilities WHERE user_id = ?1 ORDER BY created_at {}, rowid {}",
            SELECT_COLUMNS,
            query.order.as_sql(),
            query.order.as_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![query.owner_id], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get(&self, owner_id: &str, id: &str) -> RepositoryResult<Option<Facility>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM facilities WHERE user_id = ?1 AND id = ?2",
            SELECT_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![owner_id, id], map_row)
            .optional()?)
    }

    pub fn create(&self, owner_id: &str, facility: &Facility) -> RepositoryResult<Facility> {
        let conn = self.get_conn()?;
        insert(&conn, owner_id, facility)?;
        tracing::debug!(facility_id = %facility.id, owner_id, "设施已写入");
        Ok(facility.clone())
    }

    /// 部分更新;记录不存在 (或不属于该租户) 返回 NotFound
    pub fn update(&self, owner_id: &str, id: &str, patch: &FacilityPatch) -> RepositoryResult<()> {
        let mut facility = self.get(owner_id, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Facility".to_string(),
            id: id.to_string(),
        })?;
        patch.apply(&mut facility);

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            UPDATE facilities
            SET name = ?3, country = ?4, installation_id = ?5, address = ?6,
                facility_type = ?7, status = ?8
            WHERE user_id = ?1 AND id = ?2
            "#,
            params![
                owner_id,
                id,
                facility.name,
                facility.country,
                facility.installation_id,
                facility.address,
                facility.facility_type.as_str(),
                facility.status.as_str(),
            ],
        )?;
        Ok(())
    }
}

fn insert(conn: &Connection, owner_id: &str, facility: &Facility) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        INSERT INTO facilities (
            id, user_id, name, country, installation_id, address,
            facility_type, status, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            facility.id,
            owner_id,
            facility.name,
            facility.country,
            facility.installation_id,
            facility.address,
            facility.facility_type.as_str(),
            facility.status.as_str(),
            format_ts(&facility.created_at),
        ],
    )
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Facility> {
    Ok(Facility {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        installation_id: row.get(3)?,
        address: row.get(4)?,
        facility_type: parse_enum(5, &row.get::<_, String>(5)?)?,
        status: parse_enum(6, &row.get::<_, String>(6)?)?,
        created_at: parse_ts(7, &row.get::<_, String>(7)?)?,
    })
}
