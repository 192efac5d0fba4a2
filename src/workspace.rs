//! Workspace-scoped translation state.

pub mod registry;
pub mod translation;

pub use registry::WorkspaceRegistry;
pub use translation::WorkspaceTranslation;
