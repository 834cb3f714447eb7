// ==========================================
// CBAM 铝业碳排放平台 - 设施与用户领域模型
// ==========================================

use crate::domain::types::{FacilityStatus, FacilityType, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Facility - 生产设施 (CBAM installation)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: String,
    pub name: String,
    pub country: String,
    pub installation_id: String,
    pub address: String,
    pub facility_type: FacilityType,
    pub status: FacilityStatus,
    pub created_at: DateTime<Utc>,
}

impl Facility {
    /// 名称或国家包含关键字 (不区分大小写);空关键字匹配全部
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.country.to_lowercase().contains(&term)
    }
}

/// 新建设施请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFacility {
    pub name: String,
    pub country: String,
    pub installation_id: String,
    #[serde(default)]
    pub address: String,
    pub facility_type: FacilityType,
}

// ==========================================
// Principal - 当前登录主体
// ==========================================
// 由外部认证服务提供,此处仅用其 user_id 做租户隔离
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_search() {
        let facility = Facility {
            id: "facility-1".to_string(),
            name: "Rheinwerk Smelter".to_string(),
            country: "Germany".to_string(),
            installation_id: "DE-CBAM-0007".to_string(),
            address: String::new(),
            facility_type: FacilityType::Primary,
            status: FacilityStatus::Active,
            created_at: Utc::now(),
        };
        assert!(facility.matches_search("smelter"));
        assert!(facility.matches_search(" GERM "));
        assert!(facility.matches_search(""));
        assert!(!facility.matches_search("DE-CBAM"));
        assert!(!facility.matches_search("norway"));
    }
}
