// ==========================================
// CBAM 铝业碳排放平台 - 合规分级
// ==========================================
// 规则 (纯函数,无滞回,不记忆历史状态):
// - specific > non_compliant_above        → NonCompliant
// - warning_above < specific <= 上限       → Warning
// - specific <= warning_above             → Compliant
// ==========================================

use crate::domain::types::ComplianceStatus;
use serde::{Deserialize, Serialize};

/// 合规阈值 (tCO2e/t)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplianceThresholds {
    pub warning_above: f64,
    pub non_compliant_above: f64,
}

impl Default for ComplianceThresholds {
    fn default() -> Self {
        Self {
            warning_above: 10.0,
            non_compliant_above: 15.0,
        }
    }
}

impl ComplianceThresholds {
    /// 构造阈值;上限低于下限时回退为缺省值
    pub fn new(warning_above: f64, non_compliant_above: f64) -> Self {
        if warning_above.is_finite()
            && non_compliant_above.is_finite()
            && warning_above <= non_compliant_above
        {
            Self {
                warning_above,
                non_compliant_above,
            }
        } else {
            tracing::warn!(
                warning_above,
                non_compliant_above,
                "合规阈值配置非法,使用缺省阈值"
            );
            Self::default()
        }
    }
}

/// 合规分级器
pub struct ComplianceClassifier;

impl ComplianceClassifier {
    /// 按缺省阈值分级
    pub fn classify(specific_emissions: f64) -> ComplianceStatus {
        Self::classify_with(specific_emissions, &ComplianceThresholds::default())
    }

    pub fn classify_with(specific_emissions: f64, thresholds: &ComplianceThresholds) -> ComplianceStatus {
        if specific_emissions > thresholds.non_compliant_above {
            ComplianceStatus::NonCompliant
        } else if specific_emissions > thresholds.warning_above {
            ComplianceStatus::Warning
        } else {
            ComplianceStatus::Compliant
        }
    }

    /// 状态说明 (随当前语言)
    pub fn describe(status: ComplianceStatus) -> String {
        match status {
            ComplianceStatus::Compliant => crate::i18n::t("compliance.compliant"),
            ComplianceStatus::Warning => crate::i18n::t("compliance.warning"),
            ComplianceStatus::NonCompliant => crate::i18n::t("compliance.non_compliant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(ComplianceClassifier::classify(10.0), ComplianceStatus::Compliant);
        assert_eq!(ComplianceClassifier::classify(10.0001), ComplianceStatus::Warning);
        assert_eq!(ComplianceClassifier::classify(15.0), ComplianceStatus::Warning);
        assert_eq!(ComplianceClassifier::classify(15.0001), ComplianceStatus::NonCompliant);
        assert_eq!(ComplianceClassifier::classify(0.0), ComplianceStatus::Compliant);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = ComplianceThresholds::new(2.0, 4.0);
        assert_eq!(ComplianceClassifier::classify_with(2.5, &thresholds), ComplianceStatus::Warning);
        assert_eq!(ComplianceClassifier::classify_with(4.5, &thresholds), ComplianceStatus::NonCompliant);
    }

    #[test]
    fn test_inverted_thresholds_fall_back() {
        assert_eq!(ComplianceThresholds::new(20.0, 5.0), ComplianceThresholds::default());
        assert_eq!(ComplianceThresholds::new(f64::NAN, 5.0), ComplianceThresholds::default());
    }

    #[test]
    fn test_describe_follows_locale() {
        let _guard = crate::i18n::tests::LOCALE_TEST_LOCK.lock().unwrap();
        crate::i18n::set_locale("en");
        assert!(ComplianceClassifier::describe(ComplianceStatus::Compliant).contains("benchmark"));
        crate::i18n::set_locale("zh-CN");
        assert!(ComplianceClassifier::describe(ComplianceStatus::Warning).contains("预警"));
        crate::i18n::set_locale("en");
    }
}
