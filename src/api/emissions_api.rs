// ==========================================
// CBAM 铝业碳排放平台 - 排放核算 API
// ==========================================
// 职责: 按配置创建核算会话、活动数据导入、合规说明
// 说明: 核算会话为纯内存状态,不落库
// ==========================================

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::config::EngineSettings;
use crate::domain::emission::EmissionsSnapshot;
use crate::domain::types::{ActivityCategory, ComplianceStatus};
use crate::engine::compliance::ComplianceClassifier;
use crate::engine::factor_catalog::{ActivityDefinition, EmissionFactorCatalog};
use crate::engine::snapshot::EmissionsCalculator;
use crate::importer::activity_csv::{ActivityCsvImporter, ActivityImportReport};

/// 快照 + 合规说明 (前端展示用)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotView {
    pub snapshot: EmissionsSnapshot,
    pub compliance_message: String,
}

pub struct EmissionsApi {
    settings: EngineSettings,
}

impl EmissionsApi {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// 新建核算会话
    pub fn new_session(&self) -> EmissionsCalculator {
        self.settings.new_calculator()
    }

    /// 可选活动类型 (下拉框)
    pub fn activity_options(&self, category: ActivityCategory) -> Vec<&'static ActivityDefinition> {
        EmissionFactorCatalog::activities(category).collect()
    }

    /// 从 CSV 导入活动数据到会话
    pub fn import_activity_csv(
        &self,
        path: &Path,
        session: &mut EmissionsCalculator,
    ) -> ApiResult<ActivityImportReport> {
        Ok(ActivityCsvImporter::import_file(path, session)?)
    }

    pub fn describe_status(&self, status: ComplianceStatus) -> String {
        ComplianceClassifier::describe(status)
    }

    pub fn snapshot_view(&self, session: &EmissionsCalculator) -> SnapshotView {
        let snapshot = session.snapshot().clone();
        let compliance_message = self.describe_status(snapshot.compliance_status);
        SnapshotView {
            snapshot,
            compliance_message,
        }
    }
}
