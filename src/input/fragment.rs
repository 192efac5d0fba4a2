//! JSON translation file loading

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use serde_json::Value;
use thiserror::Error;

use crate::fragment::{
    Origin,
    TranslationFragment,
};
use crate::tree::TranslationTree;

/// ISO 639 primary language subtags accepted as locale names.
static LANGUAGE_CODES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    "aa ab ae af ak am an ar as av ay az ba be bg bh bi bm bn bo br bs ca ce ch co cr cs cu cv \
     cy da de dv dz ee el en eo es et eu fa ff fi fj fo fr fy ga gd gl gn gu gv ha he hi ho hr \
     ht hu hy hz ia id ie ig ii ik io is it iu ja jv ka kg ki kj kk kl km kn ko kr ks ku kv kw \
     ky la lb lg li ln lo lt lu lv mg mh mi mk ml mn mr ms mt my na nb nd ne ng nl nn no nr nv \
     ny oc oj om or os pa pi pl ps pt qu rm rn ro ru rw sa sc sd se sg si sk sl sm sn so sq sr \
     ss st su sv sw ta te tg th ti tk tl tn to tr ts tt tw ty ug uk ur uz ve vi vo wa wo xh yi \
     yo za zh zu fil kok syr yue"
        .split_whitespace()
        .collect()
});

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read translation file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Translation file root must be an object: {0}")]
    NotAnObject(String),
}

/// How a file's locale is inferred from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocaleDetection {
    /// `locales/en.json` and `locales/en/common.json` are wrapped under `"en"`
    /// unless the file already has that locale as a top-level key.
    #[default]
    FileName,
    /// Use the parsed root as is.
    Disabled,
}

/// Whether `name` looks like a locale tag such as `en`, `pt-BR`, `zh_Hant` or `es-419`.
fn is_locale_name(name: &str) -> bool {
    let mut subtags = name.split(['-', '_']);
    let Some(language) = subtags.next() else {
        return false;
    };
    if !LANGUAGE_CODES.contains(language.to_ascii_lowercase().as_str()) {
        return false;
    }

    subtags.all(|subtag| {
        let alpha = subtag.chars().all(|c| c.is_ascii_alphabetic());
        let digits = subtag.chars().all(|c| c.is_ascii_digit());
        matches!((subtag.len(), alpha, digits), (2 | 4, true, _) | (3, _, true))
    })
}

/// Detect the locale from the file stem, then from the parent directory name.
///
/// # Examples
/// - `locales/en.json` → `en`
/// - `locales/pt-BR/common.json` → `pt-BR`
/// - `locales/common.json` → `None`
fn detect_locale_from_path(file_path: &Path) -> Option<String> {
    let stem = file_path.file_stem().map(|s| s.to_string_lossy());
    let parent = file_path.parent().and_then(Path::file_name).map(|s| s.to_string_lossy());

    [stem, parent].into_iter().flatten().find(|name| is_locale_name(name)).map(|name| name.into_owned())
}

/// Parse the contents of a translation file.
///
/// The fragment's origin is the file path, so a later reload of the same file
/// replaces this fragment.
pub fn parse_fragment(
    text: &str,
    file_path: &Path,
    detection: LocaleDetection,
) -> Result<TranslationFragment, LoadError> {
    let json: Value = serde_json::from_str(text)?;
    if !json.is_object() {
        return Err(LoadError::NotAnObject(file_path.display().to_string()));
    }

    let mut tree = TranslationTree::from_json(&json);

    if detection == LocaleDetection::FileName
        && let Some(locale) = detect_locale_from_path(file_path)
        && !tree.contains_key(&locale)
    {
        tracing::debug!(path = %file_path.display(), %locale, "Wrapping translation file under locale");
        let mut wrapped = TranslationTree::new();
        wrapped.insert(locale, tree);
        tree = wrapped;
    }

    Ok(TranslationFragment::new(tree, Some(Origin::from_path(file_path))))
}

/// Load a translation file from disk.
pub fn load_fragment_file(
    file_path: &Path,
    detection: LocaleDetection,
) -> Result<TranslationFragment, LoadError> {
    let content = std::fs::read_to_string(file_path)?;
    parse_fragment(&content, file_path, detection)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    #[case("en", true)]
    #[case("de", true)]
    #[case("EN", true)]
    #[case("pt-BR", true)]
    #[case("en_US", true)]
    #[case("zh-Hant", true)]
    #[case("es-419", true)]
    #[case("sr-Latn-RS", true)]
    #[case("common", false)]
    #[case("app", false)]
    #[case("en-trans", false)]
    #[case("", false)]
    fn test_is_locale_name(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_locale_name(name), expected);
    }

    #[rstest]
    #[case("/ws/locales/en.json", Some("en"))]
    #[case("/ws/locales/ja-JP.json", Some("ja-JP"))]
    #[case("/ws/locales/de/common.json", Some("de"))]
    #[case("/ws/locales/en/ja.json", Some("ja"))]
    #[case("/ws/locales/common.json", None)]
    #[case("/en/locales/common.json", None)]
    fn test_detect_locale_from_path(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(detect_locale_from_path(Path::new(path)).as_deref(), expected);
    }

    #[googletest::test]
    fn parse_wraps_file_under_detected_locale() {
        let fragment =
            parse_fragment(r#"{"hello": "Hello"}"#, Path::new("/ws/locales/en.json"), LocaleDetection::FileName)
                .unwrap();

        expect_that!(fragment.tree, eq(&TranslationTree::from_json(&json!({"en": {"hello": "Hello"}}))));
        expect_that!(fragment.origin, some(eq(&Origin::new("/ws/locales/en.json"))));
    }

    #[googletest::test]
    fn parse_keeps_root_that_already_has_locale() {
        let fragment = parse_fragment(
            r#"{"en": {"hello": "Hello"}}"#,
            Path::new("/ws/config/locales/en.json"),
            LocaleDetection::FileName,
        )
        .unwrap();

        expect_that!(fragment.tree, eq(&TranslationTree::from_json(&json!({"en": {"hello": "Hello"}}))));
    }

    #[googletest::test]
    fn parse_without_detection_keeps_root() {
        let fragment =
            parse_fragment(r#"{"hello": "Hello"}"#, Path::new("/ws/locales/en.json"), LocaleDetection::Disabled)
                .unwrap();

        expect_that!(fragment.tree, eq(&TranslationTree::from_json(&json!({"hello": "Hello"}))));
    }

    #[rstest]
    #[case::array("[1, 2]")]
    #[case::string(r#""text""#)]
    fn parse_rejects_non_object_root(#[case] text: &str) {
        let result = parse_fragment(text, Path::new("/ws/locales/en.json"), LocaleDetection::FileName);

        assert!(matches!(result, Err(LoadError::NotAnObject(_))));
    }

    #[rstest]
    fn parse_rejects_invalid_json() {
        let result = parse_fragment("{ invalid", Path::new("/ws/locales/en.json"), LocaleDetection::FileName);

        assert!(matches!(result, Err(LoadError::Parse(_))));
    }

    #[rstest]
    fn load_fragment_file_reads_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("de.json");
        fs::write(&path, r#"{"greeting": {"hello": "Hallo"}}"#).unwrap();

        let fragment = load_fragment_file(&path, LocaleDetection::FileName).unwrap();

        assert!(fragment.tree.contains_key("de"));
        assert_eq!(fragment.origin, Some(Origin::from_path(&path)));
    }

    #[rstest]
    fn load_fragment_file_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_fragment_file(&temp_dir.path().join("en.json"), LocaleDetection::FileName);

        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
