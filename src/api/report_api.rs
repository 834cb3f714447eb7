// ==========================================
// CBAM 铝业碳排放平台 - CBAM 报告 API
// ==========================================
// 职责: 报告创建、产品编制、生命周期、XML 导出
// 规则: 内存中的报告先变更,写库在后台进行,写库失败不回滚
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::principal::ensure_can_write;
use crate::domain::facility::{Facility, Principal};
use crate::domain::report::{CbamProduct, CbamReport};
use crate::engine::lifecycle::ReportLifecycle;
use crate::engine::report_compiler::{ReportCompiler, ReportSummary};
use crate::engine::snapshot::EmissionsCalculator;
use crate::export::CbamXmlSerializer;
use crate::persistence::{PersistenceDispatcher, WriteTarget};
use crate::repository::common::{ListQuery, SortOrder};
use crate::repository::facility_repo::FacilityRepository;
use crate::repository::report_repo::{ReportPatch, ReportRepository};

const COLLECTION: &str = "cbam_reports";

/// 新建报告请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub reporting_period: String,
    pub facility_id: String,
    /// 缺省时取设施登记的装置编号
    #[serde(default)]
    pub installation_id: Option<String>,
}

// ==========================================
// ReportApi
// ==========================================
pub struct ReportApi {
    facility_repo: Arc<FacilityRepository>,
    report_repo: Arc<ReportRepository>,
    dispatcher: Arc<PersistenceDispatcher>,
    serializer: CbamXmlSerializer,
}

impl ReportApi {
    pub fn new(
        facility_repo: Arc<FacilityRepository>,
        report_repo: Arc<ReportRepository>,
        dispatcher: Arc<PersistenceDispatcher>,
        serializer: CbamXmlSerializer,
    ) -> Self {
        Self {
            facility_repo,
            report_repo,
            dispatcher,
            serializer,
        }
    }

    // ===== 查询 =====

    pub fn list_reports(&self, principal: &Principal, order: SortOrder) -> ApiResult<Vec<CbamReport>> {
        let query = ListQuery::owned_by(principal.user_id.as_str()).order(order);
        Ok(self.report_repo.list(&query)?)
    }

    pub fn get_report(&self, principal: &Principal, report_id: &str) -> ApiResult<CbamReport> {
        self.report_repo
            .get(&principal.user_id, report_id)?
            .ok_or_else(|| ApiError::NotFound(format!("CbamReport(id={})不存在", report_id)))
    }

    /// 报告统计 (按状态计数 + 提交完成率)
    pub fn summary(&self, principal: &Principal) -> ApiResult<ReportSummary> {
        let reports = self.list_reports(principal, SortOrder::Desc)?;
        Ok(ReportCompiler::summarize(&reports))
    }

    // ===== 编制 =====

    /// 新建草稿报告
    ///
    /// 设施名称取自设施登记;设施不存在时为 "Unknown Facility",此时必须显式给出装置编号
    ///
    /// # 参数
    /// - facility: 调用方手中的设施 (如 create_facility 的返回值);
    ///   给出时不查库,其后台写入可能尚未落库
    pub fn create_report(
        &self,
        principal: &Principal,
        request: NewReport,
        facility: Option<&Facility>,
    ) -> ApiResult<CbamReport> {
        ensure_can_write(principal)?;

        let facility = match facility {
            Some(f) if f.id == request.facility_id => Some(f.clone()),
            Some(f) => {
                return Err(ApiError::InvalidInput(format!(
                    "设施ID不一致: request={} facility={}",
                    request.facility_id, f.id
                )))
            }
            None => self.facility_repo.get(&principal.user_id, &request.facility_id)?,
        };
        if facility.is_none() {
            tracing::warn!(facility_id = %request.facility_id, "设施不存在,报告使用占位设施名称");
        }

        let installation_id = request
            .installation_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| facility.as_ref().map(|f| f.installation_id.as_str()))
            .unwrap_or_default();

        let report = ReportCompiler::create_report(
            &request.reporting_period,
            &request.facility_id,
            installation_id,
            facility.as_ref().map(|f| f.name.as_str()),
        )?;

        let repo = Arc::clone(&self.report_repo);
        let owner = principal.user_id.clone();
        let record = report.clone();
        self.dispatcher.dispatch(
            WriteTarget::new(COLLECTION, "create", report.id.as_str()),
            move || repo.create(&owner, &record).map(|_| ()),
        );
        Ok(report)
    }

    /// 加入产品
    pub fn add_product(
        &self,
        principal: &Principal,
        report: &mut CbamReport,
        product: CbamProduct,
    ) -> ApiResult<String> {
        ensure_can_write(principal)?;
        let product_id = ReportCompiler::add_product(report, product)?;
        self.persist_products(principal, report);
        Ok(product_id)
    }

    /// 以核算会话的当前快照生成产品并加入报告
    pub fn add_product_from_session(
        &self,
        principal: &Principal,
        report: &mut CbamReport,
        session: &EmissionsCalculator,
        cn_code: &str,
        product_name: &str,
    ) -> ApiResult<String> {
        let product = session.to_product(cn_code, product_name, "t");
        self.add_product(principal, report, product)
    }

    pub fn remove_product(
        &self,
        principal: &Principal,
        report: &mut CbamReport,
        product_id: &str,
    ) -> ApiResult<CbamProduct> {
        ensure_can_write(principal)?;
        let removed = ReportCompiler::remove_product(report, product_id)?;
        self.persist_products(principal, report);
        Ok(removed)
    }

    pub fn replace_product(
        &self,
        principal: &Principal,
        report: &mut CbamReport,
        product_id: &str,
        product: CbamProduct,
    ) -> ApiResult<()> {
        ensure_can_write(principal)?;
        ReportCompiler::replace_product(report, product_id, product)?;
        self.persist_products(principal, report);
        Ok(())
    }

    // ===== 生命周期 =====

    /// draft → validated
    pub fn validate_report(&self, principal: &Principal, report: &mut CbamReport) -> ApiResult<()> {
        ensure_can_write(principal)?;
        ReportLifecycle::validate(report, Utc::now())?;
        self.persist_status(principal, report);
        Ok(())
    }

    /// validated → submitted
    pub fn submit_report(&self, principal: &Principal, report: &mut CbamReport) -> ApiResult<()> {
        ensure_can_write(principal)?;
        ReportLifecycle::submit(report, Utc::now())?;
        self.persist_status(principal, report);
        Ok(())
    }

    // ===== 导出 =====

    pub fn export_xml(&self, report: &CbamReport) -> String {
        self.serializer.serialize(report)
    }

    pub fn export_file_name(&self, report: &CbamReport) -> String {
        CbamXmlSerializer::file_name(report)
    }

    /// 写出 XML 文件,返回路径
    pub fn export_to_dir(&self, report: &CbamReport, dir: &Path) -> ApiResult<PathBuf> {
        self.serializer
            .write_to_dir(report, dir)
            .map_err(|e| ApiError::ExportError(format!("{}: {}", dir.display(), e)))
    }

    // ===== 内部 =====

    fn persist_products(&self, principal: &Principal, report: &CbamReport) {
        self.dispatch_patch(principal, report, "update_products", ReportPatch::products_of(report));
    }

    fn persist_status(&self, principal: &Principal, report: &CbamReport) {
        self.dispatch_patch(principal, report, "update_status", ReportPatch::status_of(report));
    }

    fn dispatch_patch(&self, principal: &Principal, report: &CbamReport, operation: &'static str, patch: ReportPatch) {
        let repo = Arc::clone(&self.report_repo);
        let owner = principal.user_id.clone();
        let id = report.id.clone();
        self.dispatcher.dispatch(
            WriteTarget::new(COLLECTION, operation, report.id.as_str()),
            move || repo.update(&owner, &id, &patch),
        );
    }
}
