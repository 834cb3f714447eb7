// ==========================================
// CBAM 铝业碳排放平台 - 命令行入口
// ==========================================
// 用法: cbam-aluminium [db_path] [user_id] [report_id] [out_dir]
// - 不给 report_id: 列出该用户的报告与统计
// - 给出 report_id: 导出该报告的 CBAM XML 到 out_dir (缺省当前目录)
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cbam_aluminium::api::StaticPrincipalProvider;
use cbam_aluminium::app::{get_default_db_path, AppState};
use cbam_aluminium::domain::facility::Principal;
use cbam_aluminium::domain::types::UserRole;
use cbam_aluminium::repository::SortOrder;

const DEFAULT_USER_ID: &str = "local";

#[tokio::main]
async fn main() -> Result<()> {
    cbam_aluminium::logging::init();
    cbam_aluminium::i18n::init_from_env();

    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(get_default_db_path);
    let user_id = args.next().unwrap_or_else(|| DEFAULT_USER_ID.to_string());
    let report_id = args.next();
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));

    tracing::info!("==================================================");
    tracing::info!("{} v{}", cbam_aluminium::APP_NAME, cbam_aluminium::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let principal = Principal {
        user_id: user_id.clone(),
        email: format!("{}@localhost", user_id),
        display_name: None,
        role: UserRole::Viewer,
    };
    let state = AppState::new(db_path, Arc::new(StaticPrincipalProvider::new(principal)))
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;
    let principal = state.current_principal().await?;

    match report_id {
        None => {
            let reports = state.report_api.list_reports(&principal, SortOrder::Desc)?;
            for report in &reports {
                println!(
                    "{}\t{}\t{}\t{}\t{:.3} tCO2e\t{} products",
                    report.id,
                    report.reporting_period,
                    report.installation_id,
                    report.status,
                    report.total_emissions,
                    report.products.len()
                );
            }
            let summary = state.report_api.summary(&principal)?;
            println!(
                "total={} draft={} validated={} submitted={} completion={:.1}%",
                summary.total, summary.draft, summary.validated, summary.submitted, summary.completion_rate
            );
        }
        Some(report_id) => {
            let report = state
                .report_api
                .get_report(&principal, &report_id)
                .with_context(|| format!("读取报告失败: {}", report_id))?;
            let path = state.report_api.export_to_dir(&report, &out_dir)?;
            println!("{}", path.display());
        }
    }

    state.flush().await;
    Ok(())
}
