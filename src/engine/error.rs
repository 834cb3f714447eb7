// ==========================================
// CBAM 铝业碳排放平台 - 引擎层错误类型
// ==========================================
// 说明: 排放核算本身不产生错误(坏数据降级处理),
//       这里只覆盖生命周期与报告结构上的显式拒绝
// ==========================================

use crate::domain::types::ReportStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("报告不可编辑: report_id={report_id}, status={status}")]
    ReportNotEditable {
        report_id: String,
        status: ReportStatus,
    },

    #[error("产品未找到: report_id={report_id}, product_id={product_id}")]
    ProductNotFound {
        report_id: String,
        product_id: String,
    },

    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// 面向用户的本地化说明
    pub fn localized_message(&self) -> String {
        match self {
            EngineError::InvalidStateTransition { from, to } => crate::i18n::t_with_args(
                "lifecycle.invalid_transition",
                &[("from", from), ("to", to)],
            ),
            EngineError::ReportNotEditable { report_id, status } => crate::i18n::t_with_args(
                "lifecycle.report_not_editable",
                &[("report_id", report_id), ("status", status.as_str())],
            ),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_transition_message() {
        let _guard = crate::i18n::tests::LOCALE_TEST_LOCK.lock().unwrap();
        crate::i18n::set_locale("en");
        let err = EngineError::ReportNotEditable {
            report_id: "cbam-1".to_string(),
            status: ReportStatus::Submitted,
        };
        assert_eq!(
            err.localized_message(),
            "Report cbam-1 is submitted and can no longer be edited"
        );
    }
}
