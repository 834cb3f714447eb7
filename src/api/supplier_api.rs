// ==========================================
// CBAM 铝业碳排放平台 - 供应商协作 API
// ==========================================
// 职责: 供应商邀请、状态推进、完成率统计
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::principal::ensure_can_write;
use crate::domain::facility::Principal;
use crate::domain::supplier::{MaterialRequest, Supplier, SupplierInvitation};
use crate::domain::types::SupplierStatus;
use crate::engine::lifecycle::SupplierInvitationLifecycle;
use crate::persistence::{PersistenceDispatcher, WriteTarget};
use crate::repository::common::{ListQuery, SortOrder};
use crate::repository::supplier_repo::{SupplierPatch, SupplierRepository};

const COLLECTION: &str = "suppliers";

/// 供应商统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSummary {
    pub total: usize,
    pub invited: usize,
    pub in_progress: usize, // pending + active
    pub completed: usize,
    pub completion_rate: f64, // completed 占比 (%)
}

impl SupplierSummary {
    pub fn of(suppliers: &[Supplier]) -> Self {
        let count = |wanted: &[SupplierStatus]| {
            suppliers.iter().filter(|s| wanted.contains(&s.status)).count()
        };
        let completed = count(&[SupplierStatus::Completed]);
        Self {
            total: suppliers.len(),
            invited: count(&[SupplierStatus::Invited]),
            in_progress: count(&[SupplierStatus::Pending, SupplierStatus::Active]),
            completed,
            completion_rate: if suppliers.is_empty() {
                0.0
            } else {
                completed as f64 / suppliers.len() as f64 * 100.0
            },
        }
    }
}

pub struct SupplierApi {
    supplier_repo: Arc<SupplierRepository>,
    dispatcher: Arc<PersistenceDispatcher>,
}

impl SupplierApi {
    pub fn new(supplier_repo: Arc<SupplierRepository>, dispatcher: Arc<PersistenceDispatcher>) -> Self {
        Self {
            supplier_repo,
            dispatcher,
        }
    }

    /// 查询当前用户的供应商 (按邀请时间)
    pub fn list_suppliers(&self, principal: &Principal, order: SortOrder) -> ApiResult<Vec<Supplier>> {
        let query = ListQuery::owned_by(principal.user_id.as_str()).order(order);
        Ok(self.supplier_repo.list(&query)?)
    }

    pub fn summary(&self, principal: &Principal) -> ApiResult<SupplierSummary> {
        let suppliers = self.list_suppliers(principal, SortOrder::Desc)?;
        Ok(SupplierSummary::of(&suppliers))
    }

    /// 邀请供应商
    ///
    /// 名称与邮箱必填;重复的原料类型只生成一条请求
    pub fn invite_supplier(&self, principal: &Principal, invitation: SupplierInvitation) -> ApiResult<Supplier> {
        ensure_can_write(principal)?;
        if invitation.supplier_name.trim().is_empty() {
            return Err(ApiError::InvalidInput(crate::i18n::t("supplier.name_required")));
        }
        if invitation.supplier_email.trim().is_empty() {
            return Err(ApiError::InvalidInput(crate::i18n::t("supplier.email_required")));
        }

        let supplier = Supplier {
            id: format!("supplier-{}", Uuid::new_v4()),
            name: invitation.supplier_name.trim().to_string(),
            email: invitation.supplier_email.trim().to_string(),
            country: String::new(),
            status: SupplierStatus::Invited,
            invited_at: Utc::now(),
            responded_at: None,
            materials: invitation
                .distinct_materials()
                .into_iter()
                .map(MaterialRequest::blank)
                .collect(),
        };

        let repo = Arc::clone(&self.supplier_repo);
        let owner = principal.user_id.clone();
        let record = supplier.clone();
        self.dispatcher.dispatch(
            WriteTarget::new(COLLECTION, "create", supplier.id.as_str()),
            move || repo.create(&owner, &record).map(|_| ()),
        );

        tracing::info!(
            supplier_id = %supplier.id,
            materials = supplier.materials.len(),
            due_date = ?invitation.due_date,
            "供应商邀请已发出"
        );
        Ok(supplier)
    }

    /// 推进供应商状态 (只进不退)
    pub fn advance_status(
        &self,
        principal: &Principal,
        supplier: &mut Supplier,
        to: SupplierStatus,
    ) -> ApiResult<()> {
        ensure_can_write(principal)?;
        SupplierInvitationLifecycle::advance(supplier, to, Utc::now())?;

        let repo = Arc::clone(&self.supplier_repo);
        let owner = principal.user_id.clone();
        let id = supplier.id.clone();
        let patch = SupplierPatch::status_of(supplier);
        self.dispatcher.dispatch(
            WriteTarget::new(COLLECTION, "update_status", supplier.id.as_str()),
            move || repo.update(&owner, &id, &patch),
        );
        Ok(())
    }
}
