//! Asset kinds
//!
//! Classifies stored assets by extension. The kind decides how a document is
//! encoded and whether relocation may copy it.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Fixed set of image extensions treated as textures
pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".tga", ".psd", ".tif", ".tiff", ".bmp", ".gif", ".exr", ".hdr",
    ".dds",
];

const MODEL_EXTENSIONS: &[&str] = &[".model", ".prefab", ".fbx", ".obj", ".dae", ".blend"];
const MESH_EXTENSIONS: &[&str] = &[".mesh"];
const MATERIAL_EXTENSIONS: &[&str] = &[".mat"];
const SHADER_EXTENSIONS: &[&str] = &[".shader", ".shadergraph", ".hlsl", ".cginc", ".compute"];
const SCRIPT_EXTENSIONS: &[&str] = &[".cs", ".dll", ".wasm"];

/// Kind of a stored asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Model/prefab with renderers and behaviour bindings
    Model,
    /// Raw geometry
    Mesh,
    /// Material with per-property bindings
    Material,
    /// Image data
    Texture,
    /// Shader program (shared, never relocated by default)
    Shader,
    /// Compiled behavior module (shared, never relocated by default)
    Script,
    /// Anything else
    Other,
}

impl AssetKind {
    /// Classify a lowercase extension including the dot
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        let ext = ext.as_str();
        if MODEL_EXTENSIONS.contains(&ext) {
            Self::Model
        } else if MESH_EXTENSIONS.contains(&ext) {
            Self::Mesh
        } else if MATERIAL_EXTENSIONS.contains(&ext) {
            Self::Material
        } else if is_image_extension(ext) {
            Self::Texture
        } else if SHADER_EXTENSIONS.contains(&ext) {
            Self::Shader
        } else if SCRIPT_EXTENSIONS.contains(&ext) {
            Self::Script
        } else {
            Self::Other
        }
    }

    /// Whether documents of this kind are structured (JSON) rather than raw bytes
    #[inline]
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Model | Self::Material)
    }

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Mesh => "mesh",
            Self::Material => "material",
            Self::Texture => "texture",
            Self::Shader => "shader",
            Self::Script => "script",
            Self::Other => "other",
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check membership in [`IMAGE_EXTENSIONS`] (case-insensitive)
#[must_use]
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS
        .iter()
        .any(|image| image.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_extensions() {
        assert_eq!(AssetKind::from_extension(".model"), AssetKind::Model);
        assert_eq!(AssetKind::from_extension(".FBX"), AssetKind::Model);
        assert_eq!(AssetKind::from_extension(".mesh"), AssetKind::Mesh);
        assert_eq!(AssetKind::from_extension(".mat"), AssetKind::Material);
        assert_eq!(AssetKind::from_extension(".png"), AssetKind::Texture);
        assert_eq!(AssetKind::from_extension(".shader"), AssetKind::Shader);
        assert_eq!(AssetKind::from_extension(".cs"), AssetKind::Script);
        assert_eq!(AssetKind::from_extension(".txt"), AssetKind::Other);
        assert_eq!(AssetKind::from_extension(""), AssetKind::Other);
    }

    #[test]
    fn image_extensions_case_insensitive() {
        assert!(is_image_extension(".PNG"));
        assert!(is_image_extension(".exr"));
        assert!(!is_image_extension(".mat"));
    }

    #[test]
    fn only_models_and_materials_are_structured() {
        assert!(AssetKind::Model.is_structured());
        assert!(AssetKind::Material.is_structured());
        assert!(!AssetKind::Texture.is_structured());
        assert!(!AssetKind::Script.is_structured());
    }

    #[test]
    fn kind_serde_snake_case() {
        let json = serde_json::to_string(&AssetKind::Script).unwrap();
        assert_eq!(json, "\"script\"");
    }
}
