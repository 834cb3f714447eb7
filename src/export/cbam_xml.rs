// ==========================================
// CBAM 铝业碳排放平台 - CBAM XML 导出
// ==========================================
// 依据: CBAM 报告导出格式 (xmlns http://ec.europa.eu/cbam/2024, version 1.0)
// 红线: 相同报告内容输出逐字节一致 (生成时间除外)
// 红线: 所有文本与属性值做 XML 转义,保证可被标准解析器读回
//       XML 1.0 不允许的字符 (如 U+0001) 替换为 U+FFFD
// ==========================================
// 精度: TotalEmissions / Direct / Indirect / Embedded 保留 3 位
//       SpecificEmissions 保留 6 位
//       ProductionVolume / 因子 Value 使用最短往返表示
// ==========================================

use crate::domain::report::{CbamProduct, CbamReport, EmissionFactorRecord};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CBAM_NAMESPACE: &str = "http://ec.europa.eu/cbam/2024";
pub const CBAM_SCHEMA_VERSION: &str = "1.0";

// ==========================================
// CbamXmlSerializer - 导出文档生成器
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbamXmlSerializer {
    generated_by: String,
}

impl CbamXmlSerializer {
    /// # 参数
    /// - generated_by: 写入 Verification/GeneratedBy 的平台名称
    pub fn new(generated_by: impl Into<String>) -> Self {
        Self {
            generated_by: generated_by.into(),
        }
    }

    /// 以当前时间生成文档
    pub fn serialize(&self, report: &CbamReport) -> String {
        self.serialize_at(report, Utc::now())
    }

    /// 以指定生成时间生成文档
    ///
    /// SubmissionDate 与 GeneratedAt 均取自 `generated_at`
    pub fn serialize_at(&self, report: &CbamReport, generated_at: DateTime<Utc>) -> String {
        let mut out = String::with_capacity(1024 + report.products.len() * 768);

        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            out,
            "<CBAMReport xmlns=\"{}\" version=\"{}\">",
            CBAM_NAMESPACE, CBAM_SCHEMA_VERSION
        );

        // ReportHeader
        out.push_str("  <ReportHeader>\n");
        element(&mut out, 4, "ReportingPeriod", None, &escape(&report.reporting_period));
        element(
            &mut out,
            4,
            "SubmissionDate",
            None,
            &generated_at.format("%Y-%m-%d").to_string(),
        );
        element(&mut out, 4, "ReportStatus", None, report.status.as_str());
        out.push_str("  </ReportHeader>\n");

        // Installation
        out.push_str("  <Installation>\n");
        element(&mut out, 4, "InstallationID", None, &escape(&report.installation_id));
        element(&mut out, 4, "FacilityName", None, &escape(&report.facility_name));
        element(
            &mut out,
            4,
            "TotalEmissions",
            Some(("unit", "tCO2e")),
            &format!("{:.3}", report.total_emissions),
        );
        out.push_str("  </Installation>\n");

        // Products
        out.push_str("  <Products>\n");
        for product in &report.products {
            write_product(&mut out, product);
        }
        out.push_str("  </Products>\n");

        // Verification
        out.push_str("  <Verification>\n");
        element(&mut out, 4, "VerificationStatus", None, "pending");
        element(&mut out, 4, "GeneratedBy", None, &escape(&self.generated_by));
        element(
            &mut out,
            4,
            "GeneratedAt",
            None,
            &generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        out.push_str("  </Verification>\n");

        out.push_str("</CBAMReport>\n");
        out
    }

    /// 导出文件名: CBAM_Report_{installationId}_{reportingPeriod}.xml
    pub fn file_name(report: &CbamReport) -> String {
        format!(
            "CBAM_Report_{}_{}.xml",
            sanitize_file_component(&report.installation_id),
            sanitize_file_component(&report.reporting_period)
        )
    }

    /// 写入目录,返回文件路径
    pub fn write_to_dir(&self, report: &CbamReport, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::file_name(report));
        fs::write(&path, self.serialize(report))?;
        tracing::info!(report_id = %report.id, path = %path.display(), "CBAM 报告已导出");
        Ok(path)
    }
}

impl Default for CbamXmlSerializer {
    fn default() -> Self {
        Self::new(crate::APP_NAME)
    }
}

fn write_product(out: &mut String, product: &CbamProduct) {
    out.push_str("    <Product>\n");
    element(out, 6, "CNCode", None, &escape(&product.cn_code));
    element(out, 6, "ProductName", None, &escape(&product.product_name));
    element(
        out,
        6,
        "ProductionVolume",
        Some(("unit", &escape_attr(&product.unit))),
        &product.production_volume.to_string(),
    );
    element(
        out,
        6,
        "DirectEmissions",
        Some(("unit", "tCO2e")),
        &format!("{:.3}", product.direct_emissions),
    );
    element(
        out,
        6,
        "IndirectEmissions",
        Some(("unit", "tCO2e")),
        &format!("{:.3}", product.indirect_emissions),
    );
    element(
        out,
        6,
        "EmbeddedEmissions",
        Some(("unit", "tCO2e")),
        &format!("{:.3}", product.embedded_emissions),
    );
    element(
        out,
        6,
        "SpecificEmissions",
        Some(("unit", "tCO2e/t")),
        &format!("{:.6}", product.specific_emissions),
    );

    out.push_str("      <EmissionFactors>\n");
    for factor in &product.emission_factors {
        write_factor(out, factor);
    }
    out.push_str("      </EmissionFactors>\n");
    out.push_str("    </Product>\n");
}

fn write_factor(out: &mut String, factor: &EmissionFactorRecord) {
    let _ = writeln!(
        out,
        "        <EmissionFactor type=\"{}\" source=\"{}\">",
        factor.factor_type.as_str(),
        factor.source.as_str()
    );
    element(
        out,
        10,
        "Value",
        Some(("unit", &escape_attr(&factor.unit))),
        &factor.value.to_string(),
    );
    if let Some(doc) = factor.documentation.as_deref().filter(|d| !d.is_empty()) {
        element(out, 10, "Documentation", None, &escape(doc));
    }
    out.push_str("        </EmissionFactor>\n");
}

/// 写一个单行元素;value 与属性值须已转义
fn element(out: &mut String, indent: usize, name: &str, attr: Option<(&str, &str)>, value: &str) {
    out.extend(std::iter::repeat(' ').take(indent));
    match attr {
        Some((key, attr_value)) => {
            let _ = writeln!(out, "<{name} {key}=\"{attr_value}\">{value}</{name}>");
        }
        None => {
            let _ = writeln!(out, "<{name}>{value}</{name}>");
        }
    }
}

/// 文本转义: & < > " ' 与 \r
pub fn escape(raw: &str) -> String {
    escape_with(raw, false)
}

/// 属性值转义: 另将 \t \n 写为字符引用,避免属性值归一化
pub fn escape_attr(raw: &str) -> String {
    escape_with(raw, true)
}

fn escape_with(raw: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // 解析器会把裸 \r 归一化为 \n
            '\r' => escaped.push_str("&#xD;"),
            '\t' if in_attribute => escaped.push_str("&#x9;"),
            '\n' if in_attribute => escaped.push_str("&#xA;"),
            c if is_xml_char(c) => escaped.push(c),
            _ => escaped.push(char::REPLACEMENT_CHARACTER),
        }
    }
    escaped
}

/// XML 1.0 Char 产生式
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// 文件名中去掉路径分隔符
fn sanitize_file_component(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EntrySource, FactorType, ReportStatus};
    use chrono::TimeZone;

    fn sample_report() -> CbamReport {
        CbamReport {
            id: "cbam-1".to_string(),
            reporting_period: "2024".to_string(),
            facility_id: "fac-1".to_string(),
            facility_name: "Smelter & Rolling <North>".to_string(),
            installation_id: "EU-CBAM-0001".to_string(),
            products: vec![CbamProduct {
                id: "p1".to_string(),
                cn_code: "7601.10.00".to_string(),
                product_name: "Primary ingot".to_string(),
                production_volume: 50.0,
                unit: "t".to_string(),
                direct_emissions: 5.61,
                indirect_emissions: 0.275,
                embedded_emissions: 5.885,
                specific_emissions: 0.1177,
                emission_factors: vec![
                    EmissionFactorRecord {
                        factor_type: FactorType::Fuel,
                        source: EntrySource::Calculated,
                        value: 0.0561,
                        unit: "tCO2/GJ".to_string(),
                        documentation: Some("Meter \"A\" readings".to_string()),
                    },
                    EmissionFactorRecord {
                        factor_type: FactorType::Electricity,
                        source: EntrySource::Default,
                        value: 0.275,
                        unit: "tCO2/MWh".to_string(),
                        documentation: None,
                    },
                ],
            }],
            total_emissions: 5.885,
            status: ReportStatus::Validated,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            validated_at: None,
            submitted_at: None,
        }
    }

    #[test]
    fn test_document_structure_and_precision() {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let xml = CbamXmlSerializer::default().serialize_at(&sample_report(), at);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<CBAMReport xmlns=\"http://ec.europa.eu/cbam/2024\" version=\"1.0\">"));
        assert!(xml.contains("<SubmissionDate>2024-05-06</SubmissionDate>"));
        assert!(xml.contains("<ReportStatus>validated</ReportStatus>"));
        assert!(xml.contains("<TotalEmissions unit=\"tCO2e\">5.885</TotalEmissions>"));
        assert!(xml.contains("<ProductionVolume unit=\"t\">50</ProductionVolume>"));
        assert!(xml.contains("<IndirectEmissions unit=\"tCO2e\">0.275</IndirectEmissions>"));
        assert!(xml.contains("<SpecificEmissions unit=\"tCO2e/t\">0.117700</SpecificEmissions>"));
        assert!(xml.contains("<EmissionFactor type=\"fuel\" source=\"calculated\">"));
        assert!(xml.contains("<Value unit=\"tCO2/GJ\">0.0561</Value>"));
        assert!(xml.contains("<VerificationStatus>pending</VerificationStatus>"));
        assert!(xml.contains("<GeneratedBy>CBAM Aluminium Emissions Platform</GeneratedBy>"));
        assert!(xml.contains("<GeneratedAt>2024-05-06T07:08:09.000Z</GeneratedAt>"));
        assert_eq!(xml.matches("<Documentation>").count(), 1);
    }

    #[test]
    fn test_free_text_is_escaped() {
        let xml = CbamXmlSerializer::default().serialize(&sample_report());
        assert!(xml.contains("<FacilityName>Smelter &amp; Rolling &lt;North&gt;</FacilityName>"));
        assert!(xml.contains("<Documentation>Meter &quot;A&quot; readings</Documentation>"));
        assert_eq!(escape("it's"), "it&apos;s");
    }

    #[test]
    fn test_disallowed_characters_are_replaced() {
        assert_eq!(escape("Smelter\u{1}A"), "Smelter\u{FFFD}A");
        assert_eq!(escape("a\u{FFFE}\u{1F}b"), "a\u{FFFD}\u{FFFD}b");
        assert_eq!(escape("line1\r\nline2\tx"), "line1&#xD;\nline2\tx");
        assert_eq!(escape_attr("t\tn\nr\r"), "t&#x9;n&#xA;r&#xD;");
        assert_eq!(escape("Hütte 🏭"), "Hütte 🏭");

        let mut report = sample_report();
        report.facility_name = "Smelter\u{1}A".to_string();
        let xml = CbamXmlSerializer::default().serialize(&report);
        assert!(xml.contains("<FacilityName>Smelter\u{FFFD}A</FacilityName>"));
        assert!(!xml.chars().any(|c| !is_xml_char(c)));
    }

    #[test]
    fn test_deterministic_for_fixed_instant() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let serializer = CbamXmlSerializer::default();
        assert_eq!(
            serializer.serialize_at(&sample_report(), at),
            serializer.serialize_at(&sample_report(), at)
        );
    }

    #[test]
    fn test_file_name() {
        let mut report = sample_report();
        assert_eq!(CbamXmlSerializer::file_name(&report), "CBAM_Report_EU-CBAM-0001_2024.xml");
        report.installation_id = "EU/7".to_string();
        assert_eq!(CbamXmlSerializer::file_name(&report), "CBAM_Report_EU_7_2024.xml");
    }
}
