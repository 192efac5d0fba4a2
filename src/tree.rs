//! Translation tree and recursive deep merge.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use serde_json::Value;

/// Nested mapping from key to either a leaf string or another tree.
///
/// Key insertion order is preserved. Merging keeps the position of keys that
/// already exist and appends new ones, so "first top-level key" is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TranslationTree(IndexMap<String, TranslationNode>);

/// A single value inside a [`TranslationTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TranslationNode {
    Leaf(String),
    Branch(TranslationTree),
}

impl TranslationNode {
    /// Converts a JSON value leniently.
    ///
    /// Strings become leaves, objects and arrays become branches (arrays keyed
    /// by element index), any other scalar becomes a leaf holding its JSON text.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Branch(TranslationTree::from_json(value)),
            Value::Array(items) => Self::Branch(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), Self::from_json(item)))
                    .collect(),
            ),
            Value::String(s) => Self::Leaf(s.clone()),
            _ => Self::Leaf(value.to_string()),
        }
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Self::Leaf(value) => Some(value),
            Self::Branch(_) => None,
        }
    }

    #[must_use]
    pub const fn as_branch(&self) -> Option<&TranslationTree> {
        match self {
            Self::Leaf(_) => None,
            Self::Branch(tree) => Some(tree),
        }
    }
}

impl From<&str> for TranslationNode {
    fn from(value: &str) -> Self {
        Self::Leaf(value.to_string())
    }
}

impl From<TranslationTree> for TranslationNode {
    fn from(tree: TranslationTree) -> Self {
        Self::Branch(tree)
    }
}

impl TranslationTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from a JSON value. A non-object root yields an empty tree.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use i18n_lookup::tree::TranslationTree;
    ///
    /// let tree = TranslationTree::from_json(&json!({"en": {"hello": "Hello"}}));
    /// let en = tree.get("en").and_then(|node| node.as_branch());
    /// assert_eq!(en.and_then(|t| t.get("hello")).and_then(|n| n.as_leaf()), Some("Hello"));
    /// ```
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| (key.clone(), TranslationNode::from_json(value)))
                .collect(),
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TranslationNode> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts or replaces a value. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<TranslationNode>) {
        self.0.insert(key.into(), node.into());
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TranslationNode)> {
        self.0.iter().map(|(key, node)| (key.as_str(), node))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, TranslationNode)> for TranslationTree {
    fn from_iter<T: IntoIterator<Item = (String, TranslationNode)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Merges `next` into `acc` without discarding sibling keys.
///
/// Where both sides hold a branch the branches are merged key by key.
/// Any other collision is won by `next`: leaf over leaf, leaf over branch and
/// branch over leaf.
pub fn deep_merge(acc: &mut TranslationTree, next: &TranslationTree) {
    for (key, incoming) in &next.0 {
        match acc.0.entry(key.clone()) {
            Entry::Occupied(mut slot) => {
                if let (TranslationNode::Branch(existing), TranslationNode::Branch(branch)) =
                    (slot.get_mut(), incoming)
                {
                    deep_merge(existing, branch);
                } else {
                    slot.insert(incoming.clone());
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(incoming.clone());
            }
        }
    }
}
