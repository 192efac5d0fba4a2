//! i18n-lookup
//!
//! ワークスペース単位で翻訳ファイルの断片をマージし、ドット区切りのキーを解決する

pub mod config;
pub mod fragment;
pub mod indexer;
pub mod input;
pub mod lookup;
pub mod tree;
pub mod workspace;

pub use fragment::{
    Origin,
    TranslationFragment,
};
pub use tree::{
    TranslationNode,
    TranslationTree,
};
pub use workspace::{
    WorkspaceRegistry,
    WorkspaceTranslation,
};
