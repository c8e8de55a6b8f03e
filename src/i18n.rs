// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 引擎内部一律使用 t_in (显式语言), 不依赖全局 locale
// ==========================================

/// 翻译消息（带参数，显式指定语言）
///
/// # 示例
/// ```no_run
/// use programme_engine::i18n::t_in;
/// let msg = t_in("zh-CN", "critical_path.risk.delayed", &[("name", "Roof")]);
/// ```
pub fn t_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    fill(rust_i18n::t!(key, locale = locale).to_string(), args)
}

fn fill(mut message: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        message = message.replace(&placeholder, v);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_locale() {
        let en = t_in("en", "critical_path.suggestion.buffer", &[("name", "Roof")]);
        assert_eq!(en, "Add buffer after 'Roof'.");

        let zh = t_in("zh-CN", "critical_path.suggestion.buffer", &[("name", "屋面")]);
        assert_eq!(zh, "在「屋面」之后增加缓冲时间。");
    }

    #[test]
    fn test_unknown_locale_falls_back_to_english() {
        let msg = t_in("fr", "validation.self_dependency", &[("name", "Roof")]);
        assert_eq!(msg, "'Roof' cannot depend on itself.");
    }
}
