//! Flat lookup index derived from a translation tree.

use indexmap::IndexMap;
use serde::Serialize;

use crate::tree::{
    TranslationNode,
    TranslationTree,
};

/// Default separator between key segments.
pub const DEFAULT_KEY_SEPARATOR: &str = ".";

/// Dotted key → leaf value, in tree order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LookupIndex(IndexMap<String, String>);

impl LookupIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys that literally start with `prefix`.
    ///
    /// Plain string prefix, not segment-aware: `"en.item"` also matches `"en.items.x"`.
    #[must_use]
    pub fn keys_starting_with(&self, prefix: &str) -> Vec<&str> {
        self.keys().filter(|key| key.starts_with(prefix)).collect()
    }
}

impl FromIterator<(String, String)> for LookupIndex {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Produces a [`LookupIndex`] from a full translation tree.
///
/// Implementations must be pure: the same tree always yields the same index.
pub trait LookupIndexGenerator: Send + Sync {
    fn generate(&self, tree: &TranslationTree) -> LookupIndex;
}

impl<F> LookupIndexGenerator for F
where
    F: Fn(&TranslationTree) -> LookupIndex + Send + Sync,
{
    fn generate(&self, tree: &TranslationTree) -> LookupIndex {
        self(tree)
    }
}

/// Flattens every leaf into a separator-joined path.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use i18n_lookup::lookup::{FlatteningGenerator, LookupIndexGenerator};
/// use i18n_lookup::tree::TranslationTree;
///
/// let tree = TranslationTree::from_json(&json!({
///     "en": {
///         "common": {
///             "hello": "Hello"
///         }
///     }
/// }));
///
/// let index = FlatteningGenerator::default().generate(&tree);
/// assert_eq!(index.get("en.common.hello"), Some("Hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatteningGenerator {
    separator: String,
}

impl FlatteningGenerator {
    #[must_use]
    pub fn new(separator: impl Into<String>) -> Self {
        Self { separator: separator.into() }
    }

    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    fn flatten_into(&self, tree: &TranslationTree, prefix: &str, index: &mut LookupIndex) {
        for (key, node) in tree.iter() {
            // empty segments never show up in a key
            let full_key = if key.is_empty() {
                prefix.to_string()
            } else if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{prefix}{}{key}", self.separator)
            };

            match node {
                TranslationNode::Branch(branch) => self.flatten_into(branch, &full_key, index),
                TranslationNode::Leaf(value) => {
                    if !full_key.is_empty() {
                        index.insert(full_key, value.clone());
                    }
                }
            }
        }
    }
}

impl Default for FlatteningGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_SEPARATOR)
    }
}

impl LookupIndexGenerator for FlatteningGenerator {
    fn generate(&self, tree: &TranslationTree) -> LookupIndex {
        let mut index = LookupIndex::new();
        self.flatten_into(tree, "", &mut index);
        index
    }
}
