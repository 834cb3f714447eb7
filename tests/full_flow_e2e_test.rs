// ==========================================
// 端到端测试: 设施 → 核算 → 报告 → 导出 → 供应商
// ==========================================

mod test_helpers;

use cbam_aluminium::api::{ApiError, NewReport};
use cbam_aluminium::domain::facility::NewFacility;
use cbam_aluminium::domain::supplier::{MaterialType, SupplierInvitation};
use cbam_aluminium::domain::types::{
    ComplianceStatus, EntrySource, FacilityType, ReportStatus, SupplierStatus,
};
use cbam_aluminium::export::CbamXmlSerializer;
use cbam_aluminium::logging;
use cbam_aluminium::repository::SortOrder;

#[tokio::test]
async fn test_report_flow_from_session_to_xml() {
    logging::init_test();
    let (_temp_file, state) = test_helpers::create_test_state("alice");
    let principal = state.current_principal().await.unwrap();

    // ===== 设施 =====
    let facility = state.facility_api.create_facility(&principal, rheinwerk()).unwrap();

    // ===== 核算会话 =====
    let mut session = state.emissions_api.new_session();
    session.add_fuel("natural-gas", 100.0, EntrySource::Calculated);
    session.set_production_volume(50.0);
    let view = state.emissions_api.snapshot_view(&session);
    assert!((view.snapshot.total_emissions - 5.61).abs() < 1e-9);
    assert!((view.snapshot.specific_emissions - 0.1122).abs() < 1e-9);
    assert_eq!(view.snapshot.compliance_status, ComplianceStatus::Compliant);

    // ===== 报告 =====
    let mut report = state
        .report_api
        .create_report(
            &principal,
            NewReport {
                reporting_period: "2025".to_string(),
                facility_id: facility.id.clone(),
                installation_id: None,
            },
            Some(&facility),
        )
        .unwrap();
    assert_eq!(report.facility_name, "Rheinwerk Smelter");
    assert_eq!(report.installation_id, "DE-CBAM-0007");

    state
        .report_api
        .add_product_from_session(&principal, &mut report, &session, "7601.10.00", "Primary ingot")
        .unwrap();
    assert!((report.total_emissions - 5.61).abs() < 1e-9);

    state.report_api.validate_report(&principal, &mut report).unwrap();
    state.report_api.submit_report(&principal, &mut report).unwrap();
    assert_eq!(report.status, ReportStatus::Submitted);

    let rejected = state.report_api.add_product(
        &principal,
        &mut report,
        test_helpers::product("7601.20.20", "Billet", 5.0, 1.0, 0.0),
    );
    assert!(matches!(rejected, Err(ApiError::ReportNotEditable(_))));
    assert_eq!(report.products.len(), 1);

    // ===== 导出 =====
    let out_dir = tempfile::tempdir().unwrap();
    let path = state.report_api.export_to_dir(&report, out_dir.path()).unwrap();
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some(CbamXmlSerializer::file_name(&report).as_str())
    );
    let xml = std::fs::read_to_string(&path).unwrap();
    assert!(xml.contains("<ReportStatus>submitted</ReportStatus>"));
    assert!(xml.contains("<TotalEmissions unit=\"tCO2e\">5.610</TotalEmissions>"));
    assert!(xml.contains("<SpecificEmissions unit=\"tCO2e/t\">0.112200</SpecificEmissions>"));
    assert!(xml.contains("<EmissionFactor type=\"fuel\" source=\"calculated\">"));

    // ===== 重新加载 =====
    state.flush().await;
    assert!(state.persistence_failures().is_empty());

    let stored = state.report_api.get_report(&principal, &report.id).unwrap();
    assert_eq!(stored.status, ReportStatus::Submitted);
    assert_eq!(stored.products, report.products);
    assert_eq!(stored.total_emissions, report.total_emissions);
    assert!(stored.validated_at.is_some());
    assert!(stored.submitted_at.is_some());

    let summary = state.report_api.summary(&principal).unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.submitted, 1);
    assert_eq!(summary.completion_rate, 100.0);

    // 其他租户不可见
    let other = test_helpers::principal("bob", cbam_aluminium::domain::types::UserRole::Operator);
    assert!(matches!(
        state.report_api.get_report(&other, &report.id),
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_report_for_unknown_facility_uses_placeholder() {
    let (_temp_file, state) = test_helpers::create_test_state("alice");
    let principal = state.current_principal().await.unwrap();

    let report = state
        .report_api
        .create_report(
            &principal,
            NewReport {
                reporting_period: "2025".to_string(),
                facility_id: "facility-missing".to_string(),
                installation_id: Some("EU-CBAM-9999".to_string()),
            },
            None,
        )
        .unwrap();
    assert_eq!(report.facility_name, "Unknown Facility");

    // 既无设施也无装置编号时拒绝
    let result = state.report_api.create_report(
        &principal,
        NewReport {
            reporting_period: "2025".to_string(),
            facility_id: "facility-missing".to_string(),
            installation_id: None,
        },
        None,
    );
    assert!(result.is_err());
}

fn rheinwerk() -> NewFacility {
    NewFacility {
        name: "Rheinwerk Smelter".to_string(),
        country: "DE".to_string(),
        installation_id: "DE-CBAM-0007".to_string(),
        address: String::new(),
        facility_type: FacilityType::Primary,
    }
}

#[tokio::test]
async fn test_report_right_after_facility_keeps_identity() {
    let (_temp_file, state) = test_helpers::create_test_state("alice");
    let principal = state.current_principal().await.unwrap();

    // 设施写入仍在后台,不 flush
    let facility = state.facility_api.create_facility(&principal, rheinwerk()).unwrap();
    let report = state
        .report_api
        .create_report(
            &principal,
            NewReport {
                reporting_period: "2025".to_string(),
                facility_id: facility.id.clone(),
                installation_id: None,
            },
            Some(&facility),
        )
        .unwrap();

    assert_eq!(report.facility_name, "Rheinwerk Smelter");
    assert_eq!(report.installation_id, "DE-CBAM-0007");
    let xml = state.report_api.export_xml(&report);
    assert!(xml.contains("<FacilityName>Rheinwerk Smelter</FacilityName>"));

    state.flush().await;
    assert!(state.persistence_failures().is_empty());
    let stored = state.report_api.get_report(&principal, &report.id).unwrap();
    assert_eq!(stored.facility_name, "Rheinwerk Smelter");
}

#[tokio::test]
async fn test_report_resolves_persisted_facility_by_id() {
    let (_temp_file, state) = test_helpers::create_test_state("alice");
    let principal = state.current_principal().await.unwrap();

    let facility = state.facility_api.create_facility(&principal, rheinwerk()).unwrap();
    state.flush().await;

    let report = state
        .report_api
        .create_report(
            &principal,
            NewReport {
                reporting_period: "2025".to_string(),
                facility_id: facility.id.clone(),
                installation_id: None,
            },
            None,
        )
        .unwrap();
    assert_eq!(report.facility_name, "Rheinwerk Smelter");

    // 传入的设施与请求不一致时拒绝
    let mismatch = state.report_api.create_report(
        &principal,
        NewReport {
            reporting_period: "2025".to_string(),
            facility_id: "facility-other".to_string(),
            installation_id: None,
        },
        Some(&facility),
    );
    assert!(matches!(mismatch, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_csv_import_feeds_session() {
    let (_temp_file, state) = test_helpers::create_test_state("alice");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("activity.csv");
    std::fs::write(
        &path,
        "category,type,quantity,source\nfuel,natural-gas,100,measured\nprocess,primary-aluminium,10,calculated\nfuel,coal,-3,measured\n",
    )
    .unwrap();

    let mut session = state.emissions_api.new_session();
    let report = state
        .emissions_api
        .import_activity_csv(&path, &mut session)
        .unwrap();
    assert_eq!(report.accepted_count(), 2);
    assert_eq!(report.rejected_count(), 1);
    assert!((session.snapshot().scope1_total - (5.61 + 18.0)).abs() < 1e-9);

    let missing = state
        .emissions_api
        .import_activity_csv(&dir.path().join("missing.csv"), &mut session);
    assert!(matches!(missing, Err(ApiError::ImportError(_))));
}

#[tokio::test]
async fn test_supplier_invitation_flow() {
    let (_temp_file, state) = test_helpers::create_test_state("alice");
    let principal = state.current_principal().await.unwrap();

    let mut supplier = state
        .supplier_api
        .invite_supplier(
            &principal,
            SupplierInvitation {
                supplier_name: "  Nordic Alumina AS ".to_string(),
                supplier_email: "cbam@nordic.example".to_string(),
                materials: vec![MaterialType::Alumina, MaterialType::Alumina, MaterialType::Bauxite],
                message: "Please share 2025 embedded emissions".to_string(),
                due_date: None,
            },
        )
        .unwrap();
    assert_eq!(supplier.name, "Nordic Alumina AS");
    assert_eq!(supplier.materials.len(), 2);
    state.flush().await;

    state
        .supplier_api
        .advance_status(&principal, &mut supplier, SupplierStatus::Active)
        .unwrap();
    let responded_at = supplier.responded_at;
    assert!(responded_at.is_some());

    // 回退被拒绝,状态不变
    let back = state
        .supplier_api
        .advance_status(&principal, &mut supplier, SupplierStatus::Pending);
    assert!(matches!(back, Err(ApiError::InvalidStateTransition { .. })));
    assert_eq!(supplier.status, SupplierStatus::Active);

    state
        .supplier_api
        .advance_status(&principal, &mut supplier, SupplierStatus::Completed)
        .unwrap();
    assert_eq!(supplier.responded_at, responded_at);
    state.flush().await;

    let stored = state
        .supplier_api
        .list_suppliers(&principal, SortOrder::Asc)
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, SupplierStatus::Completed);
    assert_eq!(stored[0].materials, supplier.materials);

    let summary = state.supplier_api.summary(&principal).unwrap();
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.completion_rate, 100.0);

    let missing_email = state.supplier_api.invite_supplier(
        &principal,
        SupplierInvitation {
            supplier_name: "No Mail Ltd".to_string(),
            supplier_email: " ".to_string(),
            materials: vec![],
            message: String::new(),
            due_date: None,
        },
    );
    assert!(matches!(missing_email, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_facility_search() {
    let (_temp_file, state) = test_helpers::create_test_state("alice");
    let principal = state.current_principal().await.unwrap();

    state.facility_api.create_facility(&principal, rheinwerk()).unwrap();
    state
        .facility_api
        .create_facility(
            &principal,
            NewFacility {
                name: "Fjord Remelt".to_string(),
                country: "NO".to_string(),
                installation_id: "NO-CBAM-0002".to_string(),
                address: String::new(),
                facility_type: FacilityType::Secondary,
            },
        )
        .unwrap();
    state.flush().await;

    let all = state
        .facility_api
        .list_facilities(&principal, SortOrder::Asc, None)
        .unwrap();
    assert_eq!(all.len(), 2);

    let smelters = state
        .facility_api
        .list_facilities(&principal, SortOrder::Asc, Some("SMELTER"))
        .unwrap();
    assert_eq!(smelters.len(), 1);
    assert_eq!(smelters[0].name, "Rheinwerk Smelter");

    let norway = state
        .facility_api
        .list_facilities(&principal, SortOrder::Asc, Some("no"))
        .unwrap();
    assert_eq!(norway.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["Fjord Remelt"]);
}
