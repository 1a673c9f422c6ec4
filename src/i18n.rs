// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）和英文
// 文案: 告警摘要 / 断货预测 / 问答回复 / 文本报告 / CLI
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use hospital_stock::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use hospital_stock::i18n::t_with_args;
/// let msg = t_with_args("alert.critical_count", &[("count", "3")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 计数文案(告警、报告、问答汇总共用 `%{count}` 占位符)
///
/// # 示例
/// ```no_run
/// use hospital_stock::i18n::t_count;
/// let msg = t_count("report.critical", 8);
/// ```
pub fn t_count(key: &str, count: impl std::fmt::Display) -> String {
    t_with_args(key, &[("count", count.to_string().as_str())])
}
