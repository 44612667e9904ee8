//! Error types for Relo Core
//!
//! Taxonomy shared by the three engines:
//! - Precondition failures, rejected before the store or scene is touched
//! - Store and scene failures surfaced mid-run (no rollback; re-run resumes)
//!
//! An existing destination file is not an error: copies are skipped and
//! reported in [`RelocationResult::skipped`](crate::RelocationResult).

use relo_asset::{AssetId, HandleError, HashError, StoreError};
use relo_scene::SceneError;

use crate::relocation::NameCollision;

/// Main core error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing or empty required input
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Identifier does not resolve to a stored asset
    #[error("asset does not resolve: {id}")]
    ResolutionFailure { id: AssetId },

    /// Two sources map to one destination file (collision policy `Fail`)
    #[error("name collision: {0}")]
    NameCollision(NameCollision),

    /// Asset store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Scene graph failure
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// Asset content could not be hashed for comparison
    #[error("hash error: {0}")]
    Hash(#[from] HashError),

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl CoreError {
    /// Check if the call was rejected before any mutation
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidArguments(_)
                | Self::ResolutionFailure { .. }
                | Self::NameCollision(_)
                | Self::Config(_)
        )
    }

    /// Check if re-running the same operation may complete the work
    #[inline]
    #[must_use]
    pub fn is_resumable(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::CopyFailed { .. } | StoreError::Io { .. })
        )
    }

    /// Create invalid arguments error
    #[inline]
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }
}

impl From<HandleError> for CoreError {
    fn from(error: HandleError) -> Self {
        match error {
            HandleError::Store(StoreError::NotFound(id)) => Self::ResolutionFailure { id },
            HandleError::Store(e) => Self::Store(e),
            other @ HandleError::WrongClass { .. } => Self::InvalidArguments(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let id = AssetId::new("Assets/Hero.model").unwrap();
        assert!(CoreError::invalid_arguments("no root").is_precondition());
        assert!(CoreError::ResolutionFailure { id: id.clone() }.is_precondition());

        let copy = CoreError::from(StoreError::CopyFailed {
            src: id.clone(),
            dst: id.clone(),
            reason: "disk full".to_string(),
        });
        assert!(copy.is_resumable());
        assert!(!copy.is_precondition());
        assert!(!CoreError::from(StoreError::AlreadyExists(id)).is_resumable());
    }

    #[test]
    fn missing_handle_is_resolution_failure() {
        let id = AssetId::new("Assets/Gone.mat").unwrap();
        let err = CoreError::from(HandleError::Store(StoreError::NotFound(id.clone())));
        assert!(matches!(err, CoreError::ResolutionFailure { id: ref got } if *got == id));
    }
}
