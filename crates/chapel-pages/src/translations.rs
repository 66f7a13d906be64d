//! Translation overlay and language resolution
//!
//! Every block may carry `translations[lang][field]`. When a page renders
//! in `lang`, a non-empty translated value replaces the base value for that
//! render only; base props are never rewritten by switching languages.

use std::collections::BTreeMap;

/// `lang -> field -> text`
pub type Translations = BTreeMap<String, BTreeMap<String, String>>;

/// Look up the overlay value for `field` in `lang`
pub fn overlay<'a>(translations: &'a Translations, lang: Option<&str>, field: &str) -> Option<&'a str> {
    let lang = lang?;
    translations
        .get(lang)
        .and_then(|fields| fields.get(field))
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Pick the language to render in
///
/// Order: the user's chosen language, then each browser language (exact
/// tag first, then its primary subtag, so `pt-BR` can fall back to `pt`),
/// then the site default, then whatever is available first. Matching is
/// case-insensitive and the returned value is spelled as in `available`.
pub fn resolve_language(
    available: &[String],
    user: Option<&str>,
    browser: &[&str],
    default: &str,
) -> Option<String> {
    let find = |wanted: &str| {
        available
            .iter()
            .find(|lang| lang.eq_ignore_ascii_case(wanted))
            .cloned()
    };
    let primary = |tag: &str| tag.split(['-', '_']).next().unwrap_or(tag).to_string();

    if let Some(found) = user.filter(|u| !u.is_empty()).and_then(find) {
        return Some(found);
    }
    for &tag in browser {
        if let Some(found) = find(tag).or_else(|| find(primary(tag).as_str())) {
            return Some(found);
        }
    }
    find(default).or_else(|| available.first().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_user_language_wins() {
        let available = langs(&["en", "es", "ko"]);
        assert_eq!(resolve_language(&available, Some("ko"), &["es"], "en").as_deref(), Some("ko"));
    }

    #[test]
    fn test_browser_language_with_primary_subtag() {
        let available = langs(&["en", "pt"]);
        assert_eq!(resolve_language(&available, Some("fr"), &["pt-BR", "en"], "en").as_deref(), Some("pt"));
        assert_eq!(resolve_language(&available, None, &["EN-us"], "pt").as_deref(), Some("en"));
    }

    #[test]
    fn test_default_then_first_available() {
        let available = langs(&["es", "ko"]);
        assert_eq!(resolve_language(&available, None, &["de"], "ko").as_deref(), Some("ko"));
        assert_eq!(resolve_language(&available, None, &[], "en").as_deref(), Some("es"));
        assert_eq!(resolve_language(&[], Some("en"), &["en"], "en"), None);
    }

    #[test]
    fn test_overlay_ignores_blank_values() {
        let mut translations = Translations::new();
        translations
            .entry("es".into())
            .or_default()
            .insert("title".into(), "Bienvenidos".into());
        translations.entry("es".into()).or_default().insert("subtitle".into(), "  ".into());

        assert_eq!(overlay(&translations, Some("es"), "title"), Some("Bienvenidos"));
        assert_eq!(overlay(&translations, Some("es"), "subtitle"), None);
        assert_eq!(overlay(&translations, Some("ko"), "title"), None);
        assert_eq!(overlay(&translations, None, "title"), None);
    }
}
