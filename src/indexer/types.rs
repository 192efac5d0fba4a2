//! Indexer type definitions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexerError {
    /// A configured glob pattern failed to compile
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    /// The pattern set as a whole failed to build
    #[error("Failed to build patterns: {0}")]
    PatternSet(#[from] globset::Error),
}
