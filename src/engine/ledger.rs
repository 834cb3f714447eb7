// ==========================================
// CBAM 铝业碳排放平台 - Scope 1 活动数据台账
// ==========================================
// 职责: 燃料燃烧 / 工艺排放两条有序序列的增删替换
// 红线: 非法输入静默丢弃(界面行为一致),但对内给出拒绝原因
// 红线: 排放因子在录入时快照,之后不再重新查表
// ==========================================

use crate::domain::emission::EmissionEntry;
use crate::domain::types::{ActivityCategory, EntrySource};
use crate::engine::factor_catalog::EmissionFactorCatalog;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==========================================
// 录入结果
// ==========================================

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    EmptyType,           // 未选择活动类型
    UnknownActivityType, // 活动类型不在该类别目录中
    NonPositiveQuantity, // 活动量 <= 0 或非数值
    EntryNotFound,       // 替换目标不存在
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::EmptyType => write!(f, "EMPTY_TYPE"),
            RejectReason::UnknownActivityType => write!(f, "UNKNOWN_ACTIVITY_TYPE"),
            RejectReason::NonPositiveQuantity => write!(f, "NON_POSITIVE_QUANTITY"),
            RejectReason::EntryNotFound => write!(f, "ENTRY_NOT_FOUND"),
        }
    }
}

/// 录入结果: 接受(返回条目ID) 或 拒绝(附原因)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Accepted(String),
    Rejected(RejectReason),
}

impl AddOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AddOutcome::Accepted(_))
    }

    pub fn entry_id(&self) -> Option<&str> {
        match self {
            AddOutcome::Accepted(id) => Some(id),
            AddOutcome::Rejected(_) => None,
        }
    }
}

// ==========================================
// EmissionLedger - Scope 1 台账
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionLedger {
    fuel_combustion: Vec<EmissionEntry>,
    process_emissions: Vec<EmissionEntry>,
    #[serde(skip)]
    catalog: EmissionFactorCatalog,
}

impl EmissionLedger {
    pub fn new() -> Self {
        Self::with_catalog(EmissionFactorCatalog::new())
    }

    pub fn with_catalog(catalog: EmissionFactorCatalog) -> Self {
        Self {
            fuel_combustion: Vec::new(),
            process_emissions: Vec::new(),
            catalog,
        }
    }

    pub fn fuel_combustion(&self) -> &[EmissionEntry] {
        &self.fuel_combustion
    }

    pub fn process_emissions(&self) -> &[EmissionEntry] {
        &self.process_emissions
    }

    /// 按录入顺序遍历全部条目 (先燃料后工艺)
    pub fn entries(&self) -> impl Iterator<Item = &EmissionEntry> {
        self.fuel_combustion.iter().chain(self.process_emissions.iter())
    }

    pub fn len(&self) -> usize {
        self.fuel_combustion.len() + self.process_emissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, entry_id: &str) -> Option<&EmissionEntry> {
        self.entries().find(|e| e.id == entry_id)
    }

    /// 录入活动数据
    ///
    /// # 参数
    /// - category: 燃料 / 工艺
    /// - activity_type: 活动类型代码
    /// - quantity: 活动量
    /// - provenance: 数据来源
    ///
    /// # 返回
    /// - Accepted(entry_id): 已追加到对应序列末尾
    /// - Rejected(reason): 台账不变
    pub fn add(
        &mut self,
        category: ActivityCategory,
        activity_type: &str,
        quantity: f64,
        provenance: EntrySource,
    ) -> AddOutcome {
        let activity_type = activity_type.trim();
        if activity_type.is_empty() {
            return self.reject(category, activity_type, RejectReason::EmptyType);
        }
        if !is_positive_quantity(quantity) {
            return self.reject(category, activity_type, RejectReason::NonPositiveQuantity);
        }
        let Some(definition) = EmissionFactorCatalog::activity(category, activity_type) else {
            return self.reject(category, activity_type, RejectReason::UnknownActivityType);
        };

        let entry = EmissionEntry {
            id: format!("{}-{}", category.as_str(), Uuid::new_v4()),
            category,
            activity_type: definition.code.to_string(),
            name: definition.label.to_string(),
            quantity,
            unit: definition.unit.to_string(),
            emission_factor: self.catalog.lookup(category, definition.code),
            provenance,
        };
        let entry_id = entry.id.clone();

        tracing::debug!(
            entry_id = %entry_id,
            activity_type = definition.code,
            quantity,
            emission_factor = entry.emission_factor,
            "活动数据已录入"
        );

        self.sequence_mut(category).push(entry);
        AddOutcome::Accepted(entry_id)
    }

    /// 按ID删除条目
    ///
    /// # 返回
    /// - true: 已删除
    /// - false: 条目不存在 (无操作)
    pub fn remove(&mut self, entry_id: &str) -> bool {
        for sequence in [&mut self.fuel_combustion, &mut self.process_emissions] {
            if let Some(pos) = sequence.iter().position(|e| e.id == entry_id) {
                sequence.remove(pos);
                return true;
            }
        }
        false
    }

    /// 替换条目: 同活动类型,新活动量/来源,排放因子重新快照
    ///
    /// 新条目占据原位置,获得新ID
    pub fn replace(&mut self, entry_id: &str, quantity: f64, provenance: EntrySource) -> AddOutcome {
        let Some(existing) = self.get(entry_id).cloned() else {
            return AddOutcome::Rejected(RejectReason::EntryNotFound);
        };
        if !is_positive_quantity(quantity) {
            return self.reject(
                existing.category,
                &existing.activity_type,
                RejectReason::NonPositiveQuantity,
            );
        }

        let replacement = EmissionEntry {
            id: format!("{}-{}", existing.category.as_str(), Uuid::new_v4()),
            quantity,
            provenance,
            emission_factor: self
                .catalog
                .lookup(existing.category, &existing.activity_type),
            ..existing
        };
        let new_id = replacement.id.clone();

        let sequence = self.sequence_mut(replacement.category);
        if let Some(slot) = sequence.iter_mut().find(|e| e.id == entry_id) {
            *slot = replacement;
        }
        AddOutcome::Accepted(new_id)
    }

    fn sequence_mut(&mut self, category: ActivityCategory) -> &mut Vec<EmissionEntry> {
        match category {
            ActivityCategory::Fuel => &mut self.fuel_combustion,
            ActivityCategory::Process => &mut self.process_emissions,
        }
    }

    fn reject(&self, category: ActivityCategory, activity_type: &str, reason: RejectReason) -> AddOutcome {
        tracing::warn!(
            category = category.as_str(),
            activity_type,
            reason = %reason,
            "活动数据被丢弃"
        );
        AddOutcome::Rejected(reason)
    }
}

fn is_positive_quantity(quantity: f64) -> bool {
    quantity.is_finite() && quantity > 0.0
}
