// ==========================================
// CAERS Core - Message Localization
// ==========================================
// Validation entries carry a message key plus positional
// arguments; text lives in locales/*.yml and is rendered
// only when a caller asks for it
// ==========================================

/// Active locale
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Switch the active locale. Only "en" ships with the crate;
/// unknown locales fall back to it.
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// Translate a key with no arguments. Unknown keys render as the key itself.
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// Translate a key, substituting named `%{name}` placeholders
///
/// # Example
/// ```no_run
/// use caers_core::i18n::t_with_args;
/// let msg = t_with_args("emission.totalEmissions.tolerance", &[("0", "5"), ("1", "100")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |text, (name, value)| fill(text, name, value))
}

/// Translate a key whose placeholders are positional: `%{0}`, `%{1}`, ...
pub fn t_positional<S: AsRef<str>>(key: &str, args: &[S]) -> String {
    args.iter()
        .enumerate()
        .fold(t(key), |text, (i, value)| fill(text, &i.to_string(), value.as_ref()))
}

fn fill(text: String, name: &str, value: &str) -> String {
    text.replace(&format!("%{{{}}}", name), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // locale is process-global and tests run in parallel
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let msg = t("emission.totalEmissions.range");
        assert_eq!(msg, "Total Emissions must be greater than or equal to 0.");
    }

    #[test]
    fn test_named_and_positional_agree() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let named = t_with_args("emission.totalEmissions.tolerance", &[("0", "5.00"), ("1", "100")]);
        let positional = t_positional("emission.totalEmissions.tolerance", &["5.00", "100"]);
        assert_eq!(named, positional);
        assert!(positional.contains("5.00%"));
        assert!(positional.contains("100"));
        assert!(!positional.contains("%{"));
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(t("no.such.key"), "no.such.key");
        assert_eq!(t_positional::<&str>("no.such.key", &[]), "no.such.key");
    }
}
