// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 界面消息跟随全局 locale; 单证标签按单证语言显式取值
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
/// - locale: 语言代码（"en" 或 "ar"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 按运行配置应用界面语言 (启动时调用一次)
pub fn apply_settings(settings: &crate::config::Settings) {
    set_locale(&settings.default_locale);
}

/// 翻译消息（无参数，跟随全局 locale）
///
/// # 示例
/// ```no_run
/// use export_docs::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数，跟随全局 locale）
///
/// # 示例
/// ```no_run
/// use export_docs::i18n::t_with_args;
/// let msg = t_with_args("msg.doc.in_flight", &[("doc_type", "CI")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 按指定语言取单证标签 (不改动全局 locale)
///
/// 阿拉伯语单证在英文界面下生成时,标签仍须取阿文
pub fn label(key: &str, locale: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 按指定语言取单证标签 (带参数)
pub fn label_with_args(key: &str, locale: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key, locale = locale).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
