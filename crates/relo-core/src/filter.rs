//! Display filters for dependency exploration

use indexmap::IndexMap;
use relo_asset::is_image_extension;
use serde::{Deserialize, Serialize};

/// Category tokens present in every default [`FilterSpec`]
pub const STANDARD_TOKENS: [&str; 6] = ["mesh", ".fbx", ".mat", "texture", "shader", ".cs"];

/// Token that selects the fixed image extension set
pub const TEXTURE_TOKEN: &str = "texture";

/// Category token to enabled flag
///
/// With every flag disabled the filter is permissive and shows everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    flags: IndexMap<String, bool>,
}

impl FilterSpec {
    /// Standard tokens, all disabled
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable `token`, adding it if unknown
    #[inline]
    #[must_use]
    pub fn enable(mut self, token: impl Into<String>) -> Self {
        self.set(token, true);
        self
    }

    pub fn set(&mut self, token: impl Into<String>, enabled: bool) {
        self.flags.insert(token.into().to_ascii_lowercase(), enabled);
    }

    #[must_use]
    pub fn is_enabled(&self, token: &str) -> bool {
        self.flags.get(token).copied().unwrap_or(false)
    }

    /// Whether no flag is enabled
    #[must_use]
    pub fn is_permissive(&self) -> bool {
        !self.flags.values().any(|on| *on)
    }

    /// Known tokens with their flags, in insertion order
    pub fn tokens(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(token, on)| (token.as_str(), *on))
    }

    /// Whether an asset with extension `ext` is displayed
    ///
    /// Images pass when `texture` is enabled; otherwise the extension must
    /// contain an enabled token, so `.mat` also admits `.matx`.
    #[must_use]
    pub fn should_display(&self, ext: &str) -> bool {
        if self.is_permissive() {
            return true;
        }
        let ext = ext.to_ascii_lowercase();
        if self.is_enabled(TEXTURE_TOKEN) && is_image_extension(&ext) {
            return true;
        }
        self.flags
            .iter()
            .filter(|(token, on)| **on && !token.is_empty())
            .any(|(token, _)| ext.contains(token.as_str()))
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            flags: STANDARD_TOKENS
                .iter()
                .map(|token| ((*token).to_string(), false))
                .collect(),
        }
    }
}
