// ==========================================
// CBAM 铝业碳排放平台 - 排放因子目录
// ==========================================
// 职责: 按活动类型查询缺省排放因子
// 红线: 查询永不失败,缺数据时降级为保守回退值
// ==========================================

use crate::domain::types::ActivityCategory;

/// 未知燃料的保守回退因子 (tCO2/单位)
pub const DEFAULT_FUEL_FALLBACK: f64 = 0.05;

/// 未知工艺的保守回退因子 (tCO2/t)
pub const DEFAULT_PROCESS_FALLBACK: f64 = 0.1;

/// 缺省排放因子表
const DEFAULT_EMISSION_FACTORS: &[(&str, f64)] = &[
    ("natural-gas", 0.0561),        // tCO2/GJ
    ("coal", 0.0946),               // tCO2/GJ
    ("fuel-oil", 0.0774),           // tCO2/GJ
    ("electricity-eu", 0.275),      // tCO2/MWh (欧盟平均)
    ("bauxite-processing", 0.15),   // tCO2/t 铝土矿
    ("alumina-production", 1.2),    // tCO2/t 氧化铝
    ("primary-aluminium", 1.8),     // tCO2/t 原铝 (仅工艺)
    ("secondary-aluminium", 0.6),   // tCO2/t 再生铝 (熔炼)
];

/// 可录入的活动类型定义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityDefinition {
    pub code: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub category: ActivityCategory,
}

const ACTIVITY_TYPES: &[ActivityDefinition] = &[
    ActivityDefinition { code: "natural-gas", label: "Natural Gas", unit: "GJ", category: ActivityCategory::Fuel },
    ActivityDefinition { code: "coal", label: "Coal", unit: "GJ", category: ActivityCategory::Fuel },
    ActivityDefinition { code: "fuel-oil", label: "Fuel Oil", unit: "GJ", category: ActivityCategory::Fuel },
    ActivityDefinition { code: "diesel", label: "Diesel", unit: "L", category: ActivityCategory::Fuel },
    ActivityDefinition { code: "lpg", label: "LPG", unit: "kg", category: ActivityCategory::Fuel },
    ActivityDefinition { code: "bauxite-processing", label: "Bauxite Processing", unit: "t", category: ActivityCategory::Process },
    ActivityDefinition { code: "alumina-production", label: "Alumina Production", unit: "t", category: ActivityCategory::Process },
    ActivityDefinition { code: "primary-aluminium", label: "Primary Aluminium Electrolysis", unit: "t", category: ActivityCategory::Process },
    ActivityDefinition { code: "secondary-aluminium", label: "Secondary Aluminium Melting", unit: "t", category: ActivityCategory::Process },
    ActivityDefinition { code: "casting", label: "Casting Operations", unit: "t", category: ActivityCategory::Process },
    ActivityDefinition { code: "rolling", label: "Rolling/Extrusion", unit: "t", category: ActivityCategory::Process },
];

// ==========================================
// EmissionFactorCatalog - 排放因子目录
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionFactorCatalog {
    fuel_fallback: f64,
    process_fallback: f64,
}

impl EmissionFactorCatalog {
    pub fn new() -> Self {
        Self {
            fuel_fallback: DEFAULT_FUEL_FALLBACK,
            process_fallback: DEFAULT_PROCESS_FALLBACK,
        }
    }

    /// 使用配置覆写的回退因子
    ///
    /// 非法值 (负数/非有限) 保留缺省回退
    pub fn with_fallbacks(fuel_fallback: f64, process_fallback: f64) -> Self {
        let sanitize = |v: f64, default: f64| {
            if v.is_finite() && v >= 0.0 {
                v
            } else {
                default
            }
        };
        Self {
            fuel_fallback: sanitize(fuel_fallback, DEFAULT_FUEL_FALLBACK),
            process_fallback: sanitize(process_fallback, DEFAULT_PROCESS_FALLBACK),
        }
    }

    /// 查询排放因子
    ///
    /// # 参数
    /// - category: 活动类别,决定回退值
    /// - activity_type: 活动类型代码
    ///
    /// # 返回
    /// 缺省因子;表中不存在时返回该类别的回退因子
    pub fn lookup(&self, category: ActivityCategory, activity_type: &str) -> f64 {
        match Self::default_factor(activity_type) {
            Some(factor) => factor,
            None => {
                tracing::debug!(
                    activity_type,
                    category = category.as_str(),
                    "无缺省排放因子,使用回退值"
                );
                self.fallback(category)
            }
        }
    }

    /// 仅查表,不回退
    pub fn default_factor(activity_type: &str) -> Option<f64> {
        DEFAULT_EMISSION_FACTORS
            .iter()
            .find(|(code, _)| *code == activity_type)
            .map(|(_, factor)| *factor)
    }

    pub fn fallback(&self, category: ActivityCategory) -> f64 {
        match category {
            ActivityCategory::Fuel => self.fuel_fallback,
            ActivityCategory::Process => self.process_fallback,
        }
    }

    /// 查询可录入的活动类型 (类别必须匹配)
    pub fn activity(category: ActivityCategory, activity_type: &str) -> Option<&'static ActivityDefinition> {
        ACTIVITY_TYPES
            .iter()
            .find(|a| a.category == category && a.code == activity_type)
    }

    /// 某类别下的全部活动类型
    pub fn activities(category: ActivityCategory) -> impl Iterator<Item = &'static ActivityDefinition> {
        ACTIVITY_TYPES.iter().filter(move |a| a.category == category)
    }
}

impl Default for EmissionFactorCatalog {
    fn default() -> Self {
        Self::new()
    }
}
