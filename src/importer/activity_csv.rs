// ==========================================
// CBAM 铝业碳排放平台 - 活动数据 CSV 导入
// ==========================================
// 格式: category,type,quantity[,source]
//   category: fuel / process
//   quantity: 非数值按 0 处理 (随后被台账拒绝)
//   source:   measured / calculated / default,缺省为 calculated
// ==========================================

use crate::domain::types::{ActivityCategory, EntrySource};
use crate::engine::ledger::{AddOutcome, RejectReason};
use crate::engine::snapshot::EmissionsCalculator;
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 3] = ["category", "type", "quantity"];

/// 单行拒绝原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind", content = "detail")]
pub enum RowRejection {
    UnknownCategory(String),
    Ledger(RejectReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRow {
    pub row: usize, // 数据行号 (从 1 开始,不含表头)
    pub reason: RowRejection,
}

/// 导入结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityImportReport {
    pub accepted_entry_ids: Vec<String>,
    pub rejected: Vec<RejectedRow>,
}

impl ActivityImportReport {
    pub fn accepted_count(&self) -> usize {
        self.accepted_entry_ids.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// 活动数据导入器
pub struct ActivityCsvImporter;

impl ActivityCsvImporter {
    /// 从文件导入
    pub fn import_file(path: &Path, calculator: &mut EmissionsCalculator) -> ImportResult<ActivityImportReport> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => {}
            other => {
                return Err(ImportError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ))
            }
        }

        let file = File::open(path)?;
        let report = Self::import_reader(file, calculator)?;
        tracing::info!(
            path = %path.display(),
            accepted = report.accepted_count(),
            rejected = report.rejected_count(),
            "活动数据导入完成"
        );
        Ok(report)
    }

    /// 从任意读取源导入,逐行写入核算会话 (每行触发一次重算)
    pub fn import_reader<R: Read>(reader: R, calculator: &mut EmissionsCalculator) -> ImportResult<ActivityImportReport> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ImportError::MissingColumn(column.to_string()));
            }
        }
        let column = |name: &str| headers.iter().position(|h| h == name);
        let (category_idx, type_idx, quantity_idx) = (
            column("category").unwrap_or(0),
            column("type").unwrap_or(1),
            column("quantity").unwrap_or(2),
        );
        let source_idx = column("source");

        let mut report = ActivityImportReport::default();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let row = idx + 1;
            if record.iter().all(|v| v.is_empty()) {
                continue;
            }

            let raw_category = record.get(category_idx).unwrap_or_default();
            let Ok(category) = raw_category.parse::<ActivityCategory>() else {
                tracing::warn!(row, category = raw_category, "未知活动类别,跳过");
                report.rejected.push(RejectedRow {
                    row,
                    reason: RowRejection::UnknownCategory(raw_category.to_string()),
                });
                continue;
            };

            let activity_type = record.get(type_idx).unwrap_or_default();
            let quantity = record
                .get(quantity_idx)
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(0.0);
            let source = source_idx
                .and_then(|i| record.get(i))
                .and_then(|v| v.parse::<EntrySource>().ok())
                .unwrap_or(EntrySource::Calculated);

            match calculator.add_entry(category, activity_type, quantity, source) {
                AddOutcome::Accepted(id) => report.accepted_entry_ids.push(id),
                AddOutcome::Rejected(reason) => report.rejected.push(RejectedRow {
                    row,
                    reason: RowRejection::Ledger(reason),
                }),
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_mixed_rows() {
        let csv = "\
category,type,quantity,source
fuel,natural-gas,100,calculated
process,primary-aluminium,10,measured
fuel,coal,abc,measured
steam,boiler,5,
process,casting,2
";
        let mut calc = EmissionsCalculator::new();
        let report = ActivityCsvImporter::import_reader(csv.as_bytes(), &mut calc).unwrap();

        assert_eq!(report.accepted_count(), 3);
        assert_eq!(report.rejected_count(), 2);
        assert_eq!(
            report.rejected[0],
            RejectedRow {
                row: 3,
                reason: RowRejection::Ledger(RejectReason::NonPositiveQuantity)
            }
        );
        assert_eq!(
            report.rejected[1].reason,
            RowRejection::UnknownCategory("steam".to_string())
        );

        let expected = 100.0 * 0.0561 + 10.0 * 1.8 + 2.0 * 0.1;
        assert!((calc.snapshot().scope1_total - expected).abs() < 1e-9);
        assert_eq!(calc.ledger().process_emissions()[1].provenance, EntrySource::Calculated);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let csv = "category,type\nfuel,coal\n";
        let mut calc = EmissionsCalculator::new();
        let err = ActivityCsvImporter::import_reader(csv.as_bytes(), &mut calc).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(c) if c == "quantity"));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.xlsx");
        std::fs::write(&path, b"").unwrap();
        let mut calc = EmissionsCalculator::new();
        assert!(matches!(
            ActivityCsvImporter::import_file(&path, &mut calc),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }
}
