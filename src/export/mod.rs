// ==========================================
// CBAM 铝业碳排放平台 - 导出层
// ==========================================

pub mod cbam_xml;

pub use cbam_xml::{escape, escape_attr, CbamXmlSerializer, CBAM_NAMESPACE, CBAM_SCHEMA_VERSION};
