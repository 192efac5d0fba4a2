//! ワークスペースごとの翻訳状態の共有管理

use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::I18nSettings;
use crate::fragment::{
    Origin,
    TranslationFragment,
};
use crate::workspace::WorkspaceTranslation;

/// ワークスペースフォルダ → 翻訳状態
///
/// 複数のタスクから更新される場合に使う。フラグメントの登録と
/// マージ結果・インデックスの再構築は一つの書き込みロック内で行うため、
/// 読み取り側が異なるフラグメント集合から作られたマージ結果とインデックスを
/// 同時に見ることはない。
#[derive(Clone, Default)]
pub struct WorkspaceRegistry {
    /// ワークスペースルート → 翻訳状態
    workspaces: Arc<RwLock<BTreeMap<PathBuf, WorkspaceTranslation>>>,
}

impl WorkspaceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 空のワークスペースを登録する
    ///
    /// 既に登録済みの場合は何もせず `false` を返す。
    pub async fn add_workspace(&self, root: PathBuf, settings: &I18nSettings) -> bool {
        let mut workspaces = self.workspaces.write().await;
        if workspaces.contains_key(&root) {
            return false;
        }
        tracing::debug!(root = %root.display(), "Workspace added");
        workspaces.insert(root, WorkspaceTranslation::from_settings(settings));
        true
    }

    /// インデックス済みのワークスペースで置き換える
    pub async fn replace_workspace(&self, root: PathBuf, translation: WorkspaceTranslation) {
        tracing::debug!(root = %root.display(), ?translation, "Workspace replaced");
        self.workspaces.write().await.insert(root, translation);
    }

    pub async fn remove_workspace(&self, root: &Path) -> bool {
        self.workspaces.write().await.remove(root).is_some()
    }

    pub async fn workspace_roots(&self) -> Vec<PathBuf> {
        self.workspaces.read().await.keys().cloned().collect()
    }

    /// フラグメントをマージする
    ///
    /// ワークスペースが未登録の場合は `false` を返す。
    pub async fn merge_fragment(&self, root: &Path, fragment: TranslationFragment) -> bool {
        let mut workspaces = self.workspaces.write().await;
        let Some(workspace) = workspaces.get_mut(root) else {
            tracing::warn!(root = %root.display(), "Fragment for unknown workspace ignored");
            return false;
        };
        workspace.merge(fragment);
        true
    }

    pub async fn remove_fragment(&self, root: &Path, origin: &Origin) -> bool {
        let mut workspaces = self.workspaces.write().await;
        workspaces.get_mut(root).is_some_and(|workspace| workspace.remove_fragment(origin))
    }

    /// `path` を含む最も深いワークスペースルートを返す
    pub async fn workspace_for_path(&self, path: &Path) -> Option<PathBuf> {
        self.workspaces
            .read()
            .await
            .keys()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .cloned()
    }

    pub async fn resolve(&self, root: &Path, key: &str, locale: &str) -> Option<String> {
        self.with_workspace(root, |workspace| workspace.resolve(key, locale)).await.flatten()
    }

    /// ファイルが属するワークスペースでキーを解決する
    ///
    /// `locale` が `None` の場合はそのワークスペースのフォールバックロケールを使う。
    pub async fn resolve_for_file(
        &self,
        file: &Path,
        key: &str,
        locale: Option<&str>,
    ) -> Option<String> {
        let root = self.workspace_for_path(file).await?;
        self.with_workspace(&root, |workspace| {
            let locale = locale.unwrap_or_else(|| workspace.fallback_locale());
            workspace.resolve(key, locale)
        })
        .await
        .flatten()
    }

    /// 読み取りロックを保持したまま `f` を実行する
    pub async fn with_workspace<R>(
        &self,
        root: &Path,
        f: impl FnOnce(&WorkspaceTranslation) -> R,
    ) -> Option<R> {
        self.workspaces.read().await.get(root).map(f)
    }
}

impl std::fmt::Debug for WorkspaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceRegistry")
            .field("workspaces", &"<BTreeMap<PathBuf, WorkspaceTranslation>>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::tree::{
        TranslationNode,
        TranslationTree,
    };

    fn fragment(value: &serde_json::Value, origin: &str) -> TranslationFragment {
        TranslationFragment::new(TranslationTree::from_json(value), Some(Origin::new(origin)))
    }

    #[googletest::test]
    fn clone_shares_state() {
        let registry1 = WorkspaceRegistry::new();
        let registry2 = registry1.clone();

        expect_that!(Arc::strong_count(&registry1.workspaces), eq(2));
        expect_that!(Arc::ptr_eq(&registry1.workspaces, &registry2.workspaces), eq(true));
    }

    #[googletest::test]
    fn debug_impl_works() {
        let debug_str = format!("{:?}", WorkspaceRegistry::new());

        expect_that!(debug_str, contains_substring("WorkspaceRegistry"));
        expect_that!(debug_str, contains_substring("workspaces"));
    }

    #[tokio::test]
    async fn add_workspace_only_once() {
        let registry = WorkspaceRegistry::new();
        let settings = I18nSettings::default();

        assert!(registry.add_workspace(PathBuf::from("/ws"), &settings).await);
        assert!(!registry.add_workspace(PathBuf::from("/ws"), &settings).await);
        assert_eq!(registry.workspace_roots().await, vec![PathBuf::from("/ws")]);
    }

    #[tokio::test]
    async fn merge_and_resolve_through_registry() {
        let registry = WorkspaceRegistry::new();
        let root = PathBuf::from("/ws");
        registry.add_workspace(root.clone(), &I18nSettings::default()).await;

        assert!(
            registry
                .merge_fragment(&root, fragment(&json!({"en": {"x": "old"}}), "/ws/locales/en.json"))
                .await
        );
        registry
            .merge_fragment(&root, fragment(&json!({"en": {"x": "new"}}), "/ws/locales/en.json"))
            .await;

        assert_eq!(registry.resolve(&root, "x", "en").await.as_deref(), Some("new"));
        assert_eq!(registry.resolve(Path::new("/other"), "x", "en").await, None);
    }

    #[tokio::test]
    async fn merge_into_unknown_workspace_is_rejected() {
        let registry = WorkspaceRegistry::new();

        let merged = registry
            .merge_fragment(Path::new("/missing"), fragment(&json!({"en": {}}), "en.json"))
            .await;

        assert!(!merged);
    }

    #[tokio::test]
    async fn remove_fragment_through_registry() {
        let registry = WorkspaceRegistry::new();
        let root = PathBuf::from("/ws");
        registry.add_workspace(root.clone(), &I18nSettings::default()).await;
        registry.merge_fragment(&root, fragment(&json!({"en": {"a": "1"}}), "a.json")).await;

        assert!(registry.remove_fragment(&root, &Origin::new("a.json")).await);
        assert!(!registry.remove_fragment(&root, &Origin::new("a.json")).await);
        assert_eq!(registry.resolve(&root, "a", "en").await, None);
    }

    #[tokio::test]
    async fn workspace_for_path_prefers_deepest_root() {
        let registry = WorkspaceRegistry::new();
        let settings = I18nSettings::default();
        registry.add_workspace(PathBuf::from("/repo"), &settings).await;
        registry.add_workspace(PathBuf::from("/repo/packages/app"), &settings).await;

        assert_eq!(
            registry.workspace_for_path(Path::new("/repo/packages/app/src/main.ts")).await,
            Some(PathBuf::from("/repo/packages/app"))
        );
        assert_eq!(
            registry.workspace_for_path(Path::new("/repo/docs/readme.md")).await,
            Some(PathBuf::from("/repo"))
        );
        assert_eq!(registry.workspace_for_path(Path::new("/elsewhere/file")).await, None);
    }

    #[tokio::test]
    async fn resolve_for_file_uses_fallback_locale() {
        let registry = WorkspaceRegistry::new();
        let root = PathBuf::from("/ws");
        registry.add_workspace(root.clone(), &I18nSettings::default()).await;
        registry
            .merge_fragment(&root, fragment(&json!({"de": {"hello": "Hallo"}}), "de.json"))
            .await;
        registry
            .merge_fragment(&root, fragment(&json!({"en": {"hello": "Hello"}}), "en.json"))
            .await;

        let file = Path::new("/ws/src/app.ts");
        assert_eq!(registry.resolve_for_file(file, "hello", None).await.as_deref(), Some("Hallo"));
        assert_eq!(
            registry.resolve_for_file(file, "hello", Some("en")).await.as_deref(),
            Some("Hello")
        );
    }

    #[tokio::test]
    async fn concurrent_merges_keep_caches_consistent() {
        let registry = WorkspaceRegistry::new();
        let root = PathBuf::from("/ws");
        registry.add_workspace(root.clone(), &I18nSettings::default()).await;

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let registry = registry.clone();
                let root = root.clone();
                tokio::spawn(async move {
                    let mut en = TranslationTree::new();
                    en.insert(format!("key{i}"), TranslationNode::Leaf(i.to_string()));
                    let mut tree = TranslationTree::new();
                    tree.insert("en", en);
                    let origin = Origin::new(format!("f{i}.json"));
                    registry.merge_fragment(&root, TranslationFragment::new(tree, Some(origin))).await
                })
            })
            .collect();
        for handle in futures::future::join_all(handles).await {
            assert!(matches!(handle, Ok(true)));
        }

        let consistent = registry
            .with_workspace(&root, |workspace| {
                let from_index = workspace.keys_starting_with("en.").len();
                let from_tree = workspace
                    .merged_view()
                    .get("en")
                    .and_then(|node| node.as_branch())
                    .map_or(0, TranslationTree::len);
                (workspace.parts().len(), from_index, from_tree)
            })
            .await;

        assert_eq!(consistent, Some((16, 16, 16)));
    }

    #[tokio::test]
    async fn replace_and_remove_workspace() {
        let registry = WorkspaceRegistry::new();
        let root = PathBuf::from("/ws");
        let mut translation = WorkspaceTranslation::new();
        translation.merge_fragment(TranslationTree::from_json(&json!({"fr": {"a": "b"}})), None);

        registry.replace_workspace(root.clone(), translation).await;
        assert_eq!(
            registry.with_workspace(&root, |w| w.fallback_locale().to_string()).await.as_deref(),
            Some("fr")
        );

        assert!(registry.remove_workspace(&root).await);
        assert!(registry.workspace_roots().await.is_empty());
    }
}
