//! Workspace translation indexing
use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;

use crate::config::I18nSettings;
use crate::fragment::TranslationFragment;
use crate::indexer::types::IndexerError;
use crate::input::fragment::parse_fragment;
use crate::workspace::WorkspaceTranslation;

/// Loads every translation file of a workspace folder into a [`WorkspaceTranslation`].
#[derive(Clone, Debug, Default)]
pub struct WorkspaceIndexer {
    /// インデックス時の設定
    settings: I18nSettings,
}

impl WorkspaceIndexer {
    /// 新しいインデクサーを作成
    #[must_use]
    pub const fn new(settings: I18nSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub const fn settings(&self) -> &I18nSettings {
        &self.settings
    }

    /// ワークスペースをインデックス
    ///
    /// Files are read concurrently but merged in path order, so the resulting
    /// merged view (and its fallback locale) does not depend on read timing.
    /// Unreadable or malformed files are skipped with a warning.
    pub async fn index_workspace(
        &self,
        workspace_path: &Path,
    ) -> Result<WorkspaceTranslation, IndexerError> {
        tracing::debug!(workspace_path = %workspace_path.display(), "Indexing workspace");

        let files = self.find_translation_files(workspace_path)?;
        let futures: Vec<_> = files.iter().map(|file| self.load_file(file)).collect();
        let fragments = futures::future::join_all(futures).await;

        let mut translation = WorkspaceTranslation::from_settings(&self.settings);
        for fragment in fragments.into_iter().flatten() {
            translation.merge(fragment);
        }

        tracing::info!(
            workspace_path = %workspace_path.display(),
            files = files.len(),
            loaded = translation.parts().len(),
            keys = translation.lookup_index().len(),
            "Workspace indexed"
        );

        Ok(translation)
    }

    /// 単一ファイルを読み込む
    async fn load_file(&self, file_path: &Path) -> Option<TranslationFragment> {
        let content = match tokio::fs::read_to_string(file_path).await {
            Ok(content) => content,
            Err(error) => {
                tracing::warn!(path = %file_path.display(), %error, "Failed to read translation file");
                return None;
            }
        };

        match parse_fragment(&content, file_path, self.settings.locale_detection()) {
            Ok(fragment) => Some(fragment),
            Err(error) => {
                tracing::warn!(path = %file_path.display(), %error, "Skipping translation file");
                None
            }
        }
    }

    /// 翻訳ファイルを検索
    ///
    /// Returned paths are sorted.
    pub fn find_translation_files(&self, workspace_path: &Path) -> Result<Vec<PathBuf>, IndexerError> {
        let include_set = build_glob_set(std::slice::from_ref(&self.settings.translation_files.file_pattern))?;
        let exclude_set = build_glob_set(&self.settings.exclude_patterns)?;

        let mut found_files = Vec::new();
        for result in WalkBuilder::new(workspace_path)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let Ok(relative_path) = path.strip_prefix(workspace_path) else {
                continue;
            };
            if !include_set.is_match(relative_path) || exclude_set.is_match(relative_path) {
                continue;
            }

            found_files.push(path.to_path_buf());
        }

        found_files.sort();
        Ok(found_files)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, IndexerError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|source| IndexerError::InvalidPattern { pattern: pattern.clone(), source })?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
