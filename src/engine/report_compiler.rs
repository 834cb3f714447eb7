// ==========================================
// CBAM 铝业碳排放平台 - 报告编制器
// ==========================================
// 职责: 报告结构装配与总量记账
// 红线: 任意产品变更后 total_emissions == Σ product.embedded_emissions
// 红线: 仅 draft 状态允许变更产品
// ==========================================

use crate::domain::report::{is_well_formed_cn_code, CbamProduct, CbamReport};
use crate::domain::types::ReportStatus;
use crate::engine::error::{EngineError, EngineResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 设施名称缺失时的占位
pub const UNKNOWN_FACILITY_NAME: &str = "Unknown Facility";

/// 报告编制器 (无状态)
pub struct ReportCompiler;

impl ReportCompiler {
    /// 新建草稿报告
    ///
    /// # 参数
    /// - period: 报告期 (如 "2024")
    /// - facility_id: 设施ID
    /// - installation_id: CBAM 装置编号
    /// - facility_name: 设施名称,缺失时使用 "Unknown Facility"
    pub fn create_report(
        period: &str,
        facility_id: &str,
        installation_id: &str,
        facility_name: Option<&str>,
    ) -> EngineResult<CbamReport> {
        require_non_empty("reporting_period", period)?;
        require_non_empty("facility_id", facility_id)?;
        require_non_empty("installation_id", installation_id)?;

        let facility_name = facility_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_FACILITY_NAME);

        let report = CbamReport {
            id: format!("cbam-{}", Uuid::new_v4()),
            reporting_period: period.trim().to_string(),
            facility_id: facility_id.trim().to_string(),
            facility_name: facility_name.to_string(),
            installation_id: installation_id.trim().to_string(),
            products: Vec::new(),
            total_emissions: 0.0,
            status: ReportStatus::Draft,
            created_at: Utc::now(),
            validated_at: None,
            submitted_at: None,
        };

        tracing::info!(
            report_id = %report.id,
            installation_id = %report.installation_id,
            period = %report.reporting_period,
            "草稿报告已创建"
        );
        Ok(report)
    }

    /// 追加产品
    ///
    /// 内含排放/比排放按直接+间接排放与产量重新推导;ID 为空时自动生成
    ///
    /// # 返回
    /// 产品ID
    pub fn add_product(report: &mut CbamReport, product: CbamProduct) -> EngineResult<String> {
        ensure_editable(report)?;
        let product = prepare_product(product)?;
        let product_id = product.id.clone();

        report.products.push(product);
        Self::recompute_total(report);

        tracing::debug!(report_id = %report.id, product_id = %product_id, total = report.total_emissions, "产品已加入报告");
        Ok(product_id)
    }

    /// 删除产品
    pub fn remove_product(report: &mut CbamReport, product_id: &str) -> EngineResult<CbamProduct> {
        ensure_editable(report)?;
        let pos = report
            .products
            .iter()
            .position(|p| p.id == product_id)
            .ok_or_else(|| EngineError::ProductNotFound {
                report_id: report.id.clone(),
                product_id: product_id.to_string(),
            })?;

        let removed = report.products.remove(pos);
        Self::recompute_total(report);
        Ok(removed)
    }

    /// 原位替换产品 (保持产品ID)
    pub fn replace_product(report: &mut CbamReport, product_id: &str, product: CbamProduct) -> EngineResult<()> {
        ensure_editable(report)?;
        let mut product = prepare_product(product)?;
        product.id = product_id.to_string();

        let slot = report
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| EngineError::ProductNotFound {
                report_id: report.id.clone(),
                product_id: product_id.to_string(),
            })?;
        *slot = product;

        Self::recompute_total(report);
        Ok(())
    }

    /// 重算报告总量
    pub fn recompute_total(report: &mut CbamReport) {
        report.total_emissions = report.products.iter().map(|p| p.embedded_emissions).sum();
    }

    /// 报告列表统计
    pub fn summarize(reports: &[CbamReport]) -> ReportSummary {
        let count = |status: ReportStatus| reports.iter().filter(|r| r.status == status).count();
        let draft = count(ReportStatus::Draft);
        let validated = count(ReportStatus::Validated);
        let submitted = count(ReportStatus::Submitted);

        let completion_rate = if reports.is_empty() {
            0.0
        } else {
            submitted as f64 / reports.len() as f64 * 100.0
        };

        ReportSummary {
            total: reports.len(),
            draft,
            validated,
            submitted,
            validated_or_submitted: validated + submitted,
            completion_rate,
        }
    }
}

/// 报告统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: usize,
    pub draft: usize,
    pub validated: usize,
    pub submitted: usize,
    pub validated_or_submitted: usize,
    pub completion_rate: f64, // 已提交占比 (%)
}

fn ensure_editable(report: &CbamReport) -> EngineResult<()> {
    if report.is_draft() {
        Ok(())
    } else {
        Err(EngineError::ReportNotEditable {
            report_id: report.id.clone(),
            status: report.status,
        })
    }
}

fn require_non_empty(field: &str, value: &str) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(EngineError::FieldValueError {
            field: field.to_string(),
            message: "不能为空".to_string(),
        });
    }
    Ok(())
}

fn prepare_product(mut product: CbamProduct) -> EngineResult<CbamProduct> {
    product.cn_code = product.cn_code.trim().to_string();
    if !is_well_formed_cn_code(&product.cn_code) {
        return Err(EngineError::FieldValueError {
            field: "cn_code".to_string(),
            message: format!("CN 编码格式应为 dddd.dd.dd: {}", product.cn_code),
        });
    }
    for (field, value) in [
        ("production_volume", product.production_volume),
        ("direct_emissions", product.direct_emissions),
        ("indirect_emissions", product.indirect_emissions),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::FieldValueError {
                field: field.to_string(),
                message: format!("必须为非负数: {}", value),
            });
        }
    }
    if product.id.trim().is_empty() {
        product.id = format!("product-{}", Uuid::new_v4());
    }
    Ok(product.normalized())
}
