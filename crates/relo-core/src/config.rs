//! Engine configuration

use crate::error::CoreError;
use relo_asset::AssetKind;
use serde::{Deserialize, Serialize};

/// What to do when two sources map to the same destination file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Keep the first source, skip the others and report them
    #[default]
    Report,
    /// Abort before any copy
    Fail,
}

/// Relocation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocationConfig {
    /// Dependency kinds never copied (shared program artifacts)
    pub excluded_kinds: Vec<AssetKind>,
    /// Handling of destination file name collisions
    pub collision_policy: CollisionPolicy,
    /// Whether references inside the copied root are rewritten
    pub rewrite_bindings: bool,
}

impl RelocationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// Returns `CoreError::Config` on malformed input
    pub fn from_toml_str(input: &str) -> Result<Self, CoreError> {
        Ok(toml::from_str(input)?)
    }

    /// With excluded kinds
    #[inline]
    #[must_use]
    pub fn with_excluded_kinds(mut self, kinds: impl IntoIterator<Item = AssetKind>) -> Self {
        self.excluded_kinds = kinds.into_iter().collect();
        self
    }

    /// With collision policy
    #[inline]
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// With binding rewrite enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_rewrite_bindings(mut self, rewrite: bool) -> Self {
        self.rewrite_bindings = rewrite;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_excluded(&self, kind: AssetKind) -> bool {
        self.excluded_kinds.contains(&kind)
    }
}

impl Default for RelocationConfig {
    fn default() -> Self {
        Self {
            excluded_kinds: vec![AssetKind::Script, AssetKind::Shader],
            collision_policy: CollisionPolicy::Report,
            rewrite_bindings: true,
        }
    }
}

/// Options for node replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaceOptions {
    /// Copy the target's components (except its transform)
    pub copy_components: bool,
    /// Give the new node the target's name
    pub keep_name: bool,
}

impl ReplaceOptions {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_copy_components(mut self, copy: bool) -> Self {
        self.copy_components = copy;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_keep_name(mut self, keep: bool) -> Self {
        self.keep_name = keep;
        self
    }
}
