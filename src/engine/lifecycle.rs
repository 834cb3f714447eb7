// ==========================================
// CBAM 铝业碳排放平台 - 状态机
// ==========================================
// 报告:   draft → validated → submitted
// 供应商: invited → pending → active → completed
// 红线: 只进不退;非法转换显式拒绝且不改变状态
// ==========================================

use crate::domain::report::CbamReport;
use crate::domain::supplier::Supplier;
use crate::domain::types::{ReportStatus, SupplierStatus};
use crate::engine::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};

// ==========================================
// ReportLifecycle - 报告生命周期
// ==========================================
pub struct ReportLifecycle;

impl ReportLifecycle {
    /// 是否允许转换
    pub fn can_transition(from: ReportStatus, to: ReportStatus) -> bool {
        matches!(
            (from, to),
            (ReportStatus::Draft, ReportStatus::Validated)
                | (ReportStatus::Validated, ReportStatus::Submitted)
        )
    }

    /// 执行转换并打时间戳
    ///
    /// # 返回
    /// - Ok(()): 状态已更新
    /// - Err(InvalidStateTransition): 状态不变
    pub fn transition(report: &mut CbamReport, to: ReportStatus, at: DateTime<Utc>) -> EngineResult<()> {
        let from = report.status;
        if !Self::can_transition(from, to) {
            tracing::warn!(report_id = %report.id, %from, %to, "报告状态转换被拒绝");
            return Err(EngineError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        report.status = to;
        match to {
            ReportStatus::Validated => report.validated_at = Some(at),
            ReportStatus::Submitted => report.submitted_at = Some(at),
            ReportStatus::Draft => {}
        }

        tracing::info!(report_id = %report.id, %from, %to, "报告状态已转换");
        Ok(())
    }

    pub fn validate(report: &mut CbamReport, at: DateTime<Utc>) -> EngineResult<()> {
        Self::transition(report, ReportStatus::Validated, at)
    }

    pub fn submit(report: &mut CbamReport, at: DateTime<Utc>) -> EngineResult<()> {
        Self::transition(report, ReportStatus::Submitted, at)
    }
}

// ==========================================
// SupplierInvitationLifecycle - 供应商邀请生命周期
// ==========================================
// 允许向前跳级 (如 invited → completed),禁止回退与原地转换
pub struct SupplierInvitationLifecycle;

impl SupplierInvitationLifecycle {
    pub fn can_transition(from: SupplierStatus, to: SupplierStatus) -> bool {
        to > from
    }

    /// 推进供应商状态
    ///
    /// 首次离开 invited 时记录 responded_at
    pub fn advance(supplier: &mut Supplier, to: SupplierStatus, at: DateTime<Utc>) -> EngineResult<()> {
        let from = supplier.status;
        if !Self::can_transition(from, to) {
            tracing::warn!(supplier_id = %supplier.id, %from, %to, "供应商状态转换被拒绝");
            return Err(EngineError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        if from == SupplierStatus::Invited && supplier.responded_at.is_none() {
            supplier.responded_at = Some(at);
        }
        supplier.status = to;

        tracing::info!(supplier_id = %supplier.id, %from, %to, "供应商状态已推进");
        Ok(())
    }
}
