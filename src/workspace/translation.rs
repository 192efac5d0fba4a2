//! Per-workspace merged translation view and key resolution.

use std::fmt;
use std::sync::Arc;

use crate::config::I18nSettings;
use crate::fragment::{
    Origin,
    TranslationFragment,
};
use crate::lookup::{
    FlatteningGenerator,
    LookupIndex,
    LookupIndexGenerator,
};
use crate::tree::{
    TranslationNode,
    TranslationTree,
    deep_merge,
};

/// Where a key walk ended up.
#[derive(Debug, Clone, Copy)]
enum Found<'a> {
    Leaf(&'a str),
    Subtree(&'a TranslationTree),
}

impl<'a> From<&'a TranslationNode> for Found<'a> {
    fn from(node: &'a TranslationNode) -> Self {
        match node {
            TranslationNode::Leaf(value) => Self::Leaf(value),
            TranslationNode::Branch(tree) => Self::Subtree(tree),
        }
    }
}

/// Translation state of one workspace folder.
///
/// Holds the registered fragments in order, the tree obtained by deep-merging
/// them, and the lookup index generated from that tree. The two derived caches
/// are rebuilt together after every mutation and are never patched in place.
pub struct WorkspaceTranslation {
    /// 登録順のフラグメント
    parts: Vec<TranslationFragment>,
    /// 全フラグメントのマージ結果
    merged: TranslationTree,
    /// `merged` から生成したインデックス
    lookup_index: LookupIndex,
    /// キーのセパレータ
    separator: String,
    /// 翻訳が空の場合のフォールバックロケール
    default_locale: String,
    /// インデックス生成器
    generator: Arc<dyn LookupIndexGenerator>,
}

impl WorkspaceTranslation {
    #[must_use]
    pub fn new() -> Self {
        Self::from_settings(&I18nSettings::default())
    }

    /// Creates an empty workspace using the separator and default locale from `settings`.
    #[must_use]
    pub fn from_settings(settings: &I18nSettings) -> Self {
        Self {
            parts: Vec::new(),
            merged: TranslationTree::new(),
            lookup_index: LookupIndex::new(),
            separator: settings.key_separator.clone(),
            default_locale: settings.default_locale.clone(),
            generator: Arc::new(FlatteningGenerator::new(settings.key_separator.clone())),
        }
    }

    /// Replaces the lookup index generator and regenerates the index.
    #[must_use]
    pub fn with_generator(mut self, generator: impl LookupIndexGenerator + 'static) -> Self {
        self.generator = Arc::new(generator);
        self.rebuild();
        self
    }

    /// Registers a fragment and rebuilds the merged view.
    ///
    /// A fragment with an origin replaces any fragment previously registered
    /// for that origin; the new one is appended after the remaining parts.
    /// Anonymous fragments are always appended.
    pub fn merge_fragment(&mut self, tree: TranslationTree, origin: Option<Origin>) {
        if let Some(origin) = &origin {
            self.parts.retain(|part| !part.is_from(origin));
        }
        self.parts.push(TranslationFragment::new(tree, origin));
        self.rebuild();

        tracing::debug!(
            parts = self.parts.len(),
            index_size = self.lookup_index.len(),
            "Merged translation fragment"
        );
    }

    pub fn merge(&mut self, fragment: TranslationFragment) {
        self.merge_fragment(fragment.tree, fragment.origin);
    }

    /// Drops the fragment registered for `origin`.
    ///
    /// Returns `false` and leaves the caches untouched when nothing was registered for it.
    pub fn remove_fragment(&mut self, origin: &Origin) -> bool {
        let before = self.parts.len();
        self.parts.retain(|part| !part.is_from(origin));
        if self.parts.len() == before {
            return false;
        }

        self.rebuild();
        tracing::debug!(%origin, parts = self.parts.len(), "Removed translation fragment");
        true
    }

    fn rebuild(&mut self) {
        let mut merged = TranslationTree::new();
        for part in &self.parts {
            deep_merge(&mut merged, &part.tree);
        }
        let lookup_index = self.generator.generate(&merged);

        self.merged = merged;
        self.lookup_index = lookup_index;
    }

    /// Resolves a dotted key in `locale`.
    ///
    /// Returns the leaf value when the key names one. When it names a subtree,
    /// returns its immediate leaf children as `"<key>: <value>"` lines, which
    /// covers keys whose last segment is filled in at runtime. Returns `None`
    /// for an empty key or a path that does not exist.
    #[must_use]
    pub fn resolve(&self, key: &str, locale: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }

        let key_parts = self.key_parts(key, locale);
        let full_key = key_parts.join(&self.separator);

        if let Some(value) = self.lookup_index.get(&full_key) {
            tracing::debug!(key, %full_key, value, "Resolved from lookup index");
            return Some(value.to_string());
        }

        let result = self.traverse(&key_parts).map(|found| match found {
            Found::Leaf(value) => value.to_string(),
            Found::Subtree(tree) => format_subtree(tree),
        });
        tracing::debug!(key, %full_key, ?result, "Resolved by traversal");

        result
    }

    fn key_parts<'a>(&self, key: &'a str, locale: &'a str) -> Vec<&'a str> {
        std::iter::once(locale)
            .chain(key.split(self.separator.as_str()))
            .filter(|part| !part.is_empty())
            .collect()
    }

    fn traverse(&self, key_parts: &[&str]) -> Option<Found<'_>> {
        let mut cursor = Found::Subtree(&self.merged);
        for part in key_parts {
            cursor = match cursor {
                Found::Subtree(tree) => tree.get(part)?.into(),
                Found::Leaf(_) => return None,
            };
        }
        Some(cursor)
    }

    /// Index value for an already fully qualified key.
    #[must_use]
    pub fn lookup_raw(&self, key: &str) -> Option<&str> {
        self.lookup_index.get(key)
    }

    #[must_use]
    pub fn has_locale(&self, locale: &str) -> bool {
        self.merged.contains_key(locale)
    }

    /// First top-level key of the merged view, or the configured default locale.
    #[must_use]
    pub fn fallback_locale(&self) -> &str {
        self.merged.keys().next().unwrap_or(self.default_locale.as_str())
    }

    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        self.merged.keys().collect()
    }

    #[must_use]
    pub fn keys_starting_with(&self, prefix: &str) -> Vec<&str> {
        self.lookup_index.keys_starting_with(prefix)
    }

    #[must_use]
    pub const fn merged_view(&self) -> &TranslationTree {
        &self.merged
    }

    #[must_use]
    pub const fn lookup_index(&self) -> &LookupIndex {
        &self.lookup_index
    }

    #[must_use]
    pub fn parts(&self) -> &[TranslationFragment] {
        &self.parts
    }

    pub fn origins(&self) -> impl Iterator<Item = &Origin> {
        self.parts.iter().filter_map(|part| part.origin.as_ref())
    }

    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }
}

impl Default for WorkspaceTranslation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WorkspaceTranslation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceTranslation")
            .field("parts", &self.parts.len())
            .field("locales", &self.locales())
            .field("lookup_index", &self.lookup_index.len())
            .field("separator", &self.separator)
            .field("default_locale", &self.default_locale)
            .field("generator", &"<dyn LookupIndexGenerator>")
            .finish()
    }
}

/// Lists the leaf children of a subtree, one `key: value` per line.
/// Nested branches are skipped.
fn format_subtree(tree: &TranslationTree) -> String {
    tree.iter()
        .filter_map(|(key, node)| node.as_leaf().map(|value| format!("{key}: {value}")))
        .collect::<Vec<_>>()
        .join("\n")
}
