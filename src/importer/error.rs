// ==========================================
// CBAM 铝业碳排放平台 - 活动数据导入错误类型
// ==========================================
// 说明: 只有文件级问题会报错;单行坏数据按拒绝行统计,不中断导入
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(#[from] csv::Error),

    #[error("缺少必需列: {0}")]
    MissingColumn(String),
}

pub type ImportResult<T> = Result<T, ImportError>;
