// ==========================================
// CBAM 铝业碳排放平台 - 设施管理 API
// ==========================================
// 职责: 设施登记、查询、修改
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::principal::ensure_can_write;
use crate::domain::facility::{Facility, NewFacility, Principal};
use crate::domain::types::FacilityStatus;
use crate::persistence::{PersistenceDispatcher, WriteTarget};
use crate::repository::common::{ListQuery, SortOrder};
use crate::repository::facility_repo::{FacilityPatch, FacilityRepository};

pub struct FacilityApi {
    facility_repo: Arc<FacilityRepository>,
    dispatcher: Arc<PersistenceDispatcher>,
}

impl FacilityApi {
    pub fn new(facility_repo: Arc<FacilityRepository>, dispatcher: Arc<PersistenceDispatcher>) -> Self {
        Self {
            facility_repo,
            dispatcher,
        }
    }

    /// 查询当前用户的设施 (按创建时间)
    ///
    /// # 参数
    /// - search: 按名称或国家过滤 (不区分大小写的子串匹配)
    pub fn list_facilities(
        &self,
        principal: &Principal,
        order: SortOrder,
        search: Option<&str>,
    ) -> ApiResult<Vec<Facility>> {
        let query = ListQuery::owned_by(principal.user_id.as_str()).order(order);
        let mut facilities = self.facility_repo.list(&query)?;
        if let Some(term) = search {
            facilities.retain(|f| f.matches_search(term));
        }
        Ok(facilities)
    }

    pub fn get_facility(&self, principal: &Principal, facility_id: &str) -> ApiResult<Facility> {
        self.facility_repo
            .get(&principal.user_id, facility_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Facility(id={})不存在", facility_id)))
    }

    /// 登记新设施 (状态为 active)
    ///
    /// 返回内存中的新设施;写库在后台进行
    pub fn create_facility(&self, principal: &Principal, request: NewFacility) -> ApiResult<Facility> {
        ensure_can_write(principal)?;
        if request.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("设施名称不能为空".to_string()));
        }
        if request.installation_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("CBAM 装置编号不能为空".to_string()));
        }

        let facility = Facility {
            id: format!("facility-{}", Uuid::new_v4()),
            name: request.name.trim().to_string(),
            country: request.country.trim().to_string(),
            installation_id: request.installation_id.trim().to_string(),
            address: request.address.trim().to_string(),
            facility_type: request.facility_type,
            status: FacilityStatus::Active,
            created_at: Utc::now(),
        };

        let repo = Arc::clone(&self.facility_repo);
        let owner = principal.user_id.clone();
        let record = facility.clone();
        self.dispatcher.dispatch(
            WriteTarget::new("facilities", "create", facility.id.as_str()),
            move || repo.create(&owner, &record).map(|_| ()),
        );

        tracing::info!(facility_id = %facility.id, installation_id = %facility.installation_id, "设施已登记");
        Ok(facility)
    }

    /// 修改设施 (就地更新内存对象,后台写库)
    pub fn update_facility(
        &self,
        principal: &Principal,
        facility: &mut Facility,
        patch: FacilityPatch,
    ) -> ApiResult<()> {
        ensure_can_write(principal)?;
        patch.apply(facility);

        let repo = Arc::clone(&self.facility_repo);
        let owner = principal.user_id.clone();
        let id = facility.id.clone();
        self.dispatcher.dispatch(
            WriteTarget::new("facilities", "update", facility.id.as_str()),
            move || repo.update(&owner, &id, &patch),
        );
        Ok(())
    }
}
