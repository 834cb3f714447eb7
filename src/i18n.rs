// ==========================================
// CBAM 铝业碳排放平台 - 国际化
// ==========================================
// 语言: en (缺省) / zh-CN
// 文案: locales/*.yml (合规说明、状态转换拒绝、供应商与导入错误)
// 注意: rust_i18n::i18n! 宏在 lib.rs 中初始化
// ==========================================

/// 支持的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "zh-CN"];

/// 启动时读取的语言环境变量
pub const LOCALE_ENV: &str = "CBAM_LOCALE";

pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 归一化语言代码
///
/// "zh" / "zh_CN" / "zh-cn" → "zh-CN";"en-US" / "EN" → "en";其他返回 None
pub fn normalize_locale(raw: &str) -> Option<&'static str> {
    let lower = raw.trim().to_lowercase().replace('_', "-");
    let primary = lower.split('-').next().unwrap_or_default();
    match primary {
        "en" => Some("en"),
        "zh" => Some("zh-CN"),
        _ => None,
    }
}

/// 切换语言
///
/// 不支持的语言保持当前设置并返回 false
pub fn set_locale(locale: &str) -> bool {
    match normalize_locale(locale) {
        Some(normalized) => {
            rust_i18n::set_locale(normalized);
            true
        }
        None => {
            tracing::warn!(locale, supported = ?SUPPORTED_LOCALES, "不支持的语言,保持当前设置");
            false
        }
    }
}

/// 按 CBAM_LOCALE 初始化语言 (未设置时保持缺省)
pub fn init_from_env() {
    if let Ok(raw) = std::env::var(LOCALE_ENV) {
        set_locale(&raw);
    }
}

/// # 示例
/// ```no_run
/// use cbam_aluminium::i18n::t;
/// let msg = t("compliance.compliant");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 带 %{name} 占位符的翻译
///
/// # 示例
/// ```no_run
/// use cbam_aluminium::i18n::t_with_args;
/// let msg = t_with_args("lifecycle.invalid_transition", &[("from", "submitted"), ("to", "draft")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(rust_i18n::t!(key).to_string(), |text, (name, value)| {
            text.replace(&format!("%{{{}}}", name), value)
        })
}
