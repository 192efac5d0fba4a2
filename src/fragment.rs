//! Translation fragments and the identity of the source that produced them.

use std::fmt;
use std::path::Path;

use crate::tree::TranslationTree;

/// Opaque identity of a fragment's source, compared by value.
///
/// Built from a path, separators are normalized to `/` so the same file
/// reported with different separators is recognized as one origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Origin(String);

impl Origin {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().replace('\\', "/"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Origin {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<&Path> for Origin {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

/// A partial tree plus the source it came from.
///
/// Fragments without an origin are anonymous: they are only ever appended,
/// never replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationFragment {
    pub tree: TranslationTree,
    pub origin: Option<Origin>,
}

impl TranslationFragment {
    #[must_use]
    pub const fn new(tree: TranslationTree, origin: Option<Origin>) -> Self {
        Self { tree, origin }
    }

    #[must_use]
    pub const fn anonymous(tree: TranslationTree) -> Self {
        Self { tree, origin: None }
    }

    /// Whether this fragment came from `origin`. Anonymous fragments never match.
    #[must_use]
    pub fn is_from(&self, origin: &Origin) -> bool {
        self.origin.as_ref() == Some(origin)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/ws/locales/en.json", "/ws/locales/en.json")]
    #[case("C:\\ws\\locales\\en.json", "C:/ws/locales/en.json")]
    fn origin_from_path_normalizes_separators(#[case] path: &str, #[case] expected: &str) {
        assert_that!(Origin::from_path(&PathBuf::from(path)).as_str(), eq(expected));
    }

    #[googletest::test]
    fn anonymous_fragment_matches_no_origin() {
        let fragment = TranslationFragment::anonymous(TranslationTree::new());

        expect_that!(fragment.is_from(&Origin::new("f1.json")), eq(false));
    }

    #[googletest::test]
    fn fragment_matches_its_own_origin() {
        let fragment = TranslationFragment::new(TranslationTree::new(), Some("f1.json".into()));

        expect_that!(fragment.is_from(&Origin::new("f1.json")), eq(true));
        expect_that!(fragment.is_from(&Origin::new("f2.json")), eq(false));
    }
}
