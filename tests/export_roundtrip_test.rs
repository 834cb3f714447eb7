// ==========================================
// CBAM XML 导出回读测试
// ==========================================
// 测试目标: 标准 XML 解析器可读回装置编号、报告期、CN 编码及转义文本
// ==========================================

mod test_helpers;

use cbam_aluminium::domain::report::{CbamReport, EmissionFactorRecord};
use cbam_aluminium::domain::types::{EntrySource, FactorType};
use cbam_aluminium::engine::ReportCompiler;
use cbam_aluminium::export::CbamXmlSerializer;
use chrono::{TimeZone, Utc};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashMap;

/// 解析结果: 元素路径 → 文本列表
fn parse_texts(xml: &str) -> HashMap<String, Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut texts: HashMap<String, Vec<String>> = HashMap::new();
    loop {
        match reader.read_event().expect("XML 解析失败") {
            Event::Start(e) => {
                path.push(String::from_utf8(e.name().as_ref().to_vec()).unwrap());
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(t) => {
                let text = t.unescape().expect("转义解析失败").into_owned();
                texts.entry(path.join("/")).or_default().push(text);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    assert!(path.is_empty(), "元素未闭合: {:?}", path);
    texts
}

fn sample_report() -> CbamReport {
    let mut report = ReportCompiler::create_report(
        "2025",
        "facility-1",
        "DE-CBAM-<7>&'x'",
        Some("Hütte \"Nord\" & Söhne <GmbH>"),
    )
    .unwrap();

    let mut ingot = test_helpers::product("7601.10.00", "Ingot & Billet", 120.0, 30.5, 4.25);
    ingot.emission_factors.push(EmissionFactorRecord {
        factor_type: FactorType::Process,
        source: EntrySource::Measured,
        value: 1.8,
        unit: "tCO2/t".to_string(),
        documentation: Some("Cell line <A> & 'B'".to_string()),
    });
    ReportCompiler::add_product(&mut report, ingot).unwrap();
    ReportCompiler::add_product(
        &mut report,
        test_helpers::product("7606.12.10", "Coil", 40.0, 8.0, 2.0),
    )
    .unwrap();
    report
}

#[test]
fn test_parser_recovers_identity_fields() {
    let report = sample_report();
    let at = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
    let xml = CbamXmlSerializer::default().serialize_at(&report, at);

    let texts = parse_texts(&xml);
    assert_eq!(
        texts["CBAMReport/Installation/InstallationID"],
        vec![report.installation_id.clone()]
    );
    assert_eq!(texts["CBAMReport/ReportHeader/ReportingPeriod"], vec!["2025".to_string()]);
    assert_eq!(
        texts["CBAMReport/Products/Product/CNCode"],
        vec!["7601.10.00".to_string(), "7606.12.10".to_string()]
    );
}

#[test]
fn test_parser_recovers_escaped_free_text() {
    let report = sample_report();
    let xml = CbamXmlSerializer::default().serialize(&report);

    let texts = parse_texts(&xml);
    assert_eq!(
        texts["CBAMReport/Installation/FacilityName"],
        vec!["Hütte \"Nord\" & Söhne <GmbH>".to_string()]
    );
    assert_eq!(
        texts["CBAMReport/Products/Product/EmissionFactors/EmissionFactor/Documentation"],
        vec!["Cell line <A> & 'B'".to_string()]
    );
    assert_eq!(
        texts["CBAMReport/Products/Product/ProductName"],
        vec!["Ingot & Billet".to_string(), "Coil".to_string()]
    );
}

#[test]
fn test_totals_rendered_at_fixed_precision() {
    let report = sample_report();
    let texts = parse_texts(&CbamXmlSerializer::default().serialize(&report));

    assert_eq!(texts["CBAMReport/Installation/TotalEmissions"], vec!["44.750".to_string()]);
    assert_eq!(
        texts["CBAMReport/Products/Product/SpecificEmissions"],
        vec!["0.289583".to_string(), "0.250000".to_string()]
    );
    assert_eq!(
        texts["CBAMReport/Products/Product/ProductionVolume"],
        vec!["120".to_string(), "40".to_string()]
    );
}

#[test]
fn test_write_to_dir_uses_standard_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut report = sample_report();
    report.installation_id = "EU-CBAM-0042".to_string();

    let path = CbamXmlSerializer::default().write_to_dir(&report, dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "CBAM_Report_EU-CBAM-0042_2025.xml");

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
}

#[test]
fn test_control_characters_keep_document_well_formed() {
    let mut report = sample_report();
    report.facility_name = "Smelter\u{1}A\r\nNord".to_string();
    report.products[0].product_name = "Ingot\u{B}\tT1".to_string();
    let xml = CbamXmlSerializer::default().serialize(&report);

    // XML 1.0 Char: #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
    let offending: Vec<char> = xml
        .chars()
        .filter(|c| {
            !matches!(
                c,
                '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
            )
        })
        .collect();
    assert!(offending.is_empty(), "非法字符: {:?}", offending);
    assert!(!xml.contains('\r'));

    let texts = parse_texts(&xml);
    assert_eq!(
        texts["CBAMReport/Installation/FacilityName"],
        vec!["Smelter\u{FFFD}A\r\nNord".to_string()]
    );
    assert_eq!(
        texts["CBAMReport/Products/Product/ProductName"][0],
        "Ingot\u{FFFD}\tT1"
    );
}
