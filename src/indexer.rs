//! Discovery and bulk loading of a workspace's translation files.

pub mod types;
pub mod workspace;

pub use types::IndexerError;
pub use workspace::WorkspaceIndexer;
