// ==========================================
// CBAM 铝业碳排放平台 - Scope 2 间接排放计算
// ==========================================
// 公式: consumption × factor / 1000
// 注意: /1000 沿用既有数值口径以保持兼容,输入字段单位仍为 MWh,
//       该缩放不代表权威的单位语义
// ==========================================

use crate::domain::emission::Scope2Record;

/// Scope 2 计算器 (无状态)
pub struct Scope2Calculator;

impl Scope2Calculator {
    /// 计算外购电力间接排放
    ///
    /// 负数或非数值输入按 0 处理
    pub fn compute(consumption: f64, factor: f64) -> f64 {
        coerce_non_negative(consumption) * coerce_non_negative(factor) / 1000.0
    }

    pub fn compute_record(record: &Scope2Record) -> f64 {
        Self::compute(record.electricity_consumption, record.emission_factor)
    }
}

/// 非法数值归零
pub(crate) fn coerce_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
