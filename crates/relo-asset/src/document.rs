//! Asset documents
//!
//! The in-memory form of stored assets. Only models and materials carry
//! references to other assets; every other kind is an opaque byte blob.

use crate::hash::{ContentHash, HashError};
use crate::kind::AssetKind;
use crate::path::AssetId;
use crate::transform::Transform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stored asset content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssetDocument {
    Model(ModelDoc),
    Material(MaterialDoc),
    Blob(Blob),
}

impl AssetDocument {
    /// Opaque byte content
    #[inline]
    #[must_use]
    pub fn blob(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Blob(Blob {
            bytes: bytes.into(),
        })
    }

    /// Direct references in declaration order (duplicates kept)
    #[must_use]
    pub fn references(&self) -> Vec<&AssetId> {
        match self {
            Self::Model(model) => model.references(),
            Self::Material(material) => material.references(),
            Self::Blob(_) => Vec::new(),
        }
    }

    /// Whether this document can be stored under `kind`
    #[must_use]
    pub fn fits_kind(&self, kind: AssetKind) -> bool {
        match self {
            Self::Model(_) => kind == AssetKind::Model,
            Self::Material(_) => kind == AssetKind::Material,
            Self::Blob(_) => !kind.is_structured(),
        }
    }

    /// Blake3 of the canonical JSON encoding
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn content_hash(&self) -> Result<ContentHash, HashError> {
        ContentHash::compute_serializable(self)
    }

    /// On-disk encoding: JSON for structured kinds, raw bytes otherwise
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Self::Model(model) => serde_json::to_vec_pretty(model),
            Self::Material(material) => serde_json::to_vec_pretty(material),
            Self::Blob(blob) => Ok(blob.bytes.clone()),
        }
    }

    /// Inverse of [`AssetDocument::encode`]
    ///
    /// # Errors
    /// Returns error if a structured kind holds malformed JSON
    pub fn decode(kind: AssetKind, bytes: &[u8]) -> Result<Self, serde_json::Error> {
        match kind {
            AssetKind::Model => Ok(Self::Model(serde_json::from_slice(bytes)?)),
            AssetKind::Material => Ok(Self::Material(serde_json::from_slice(bytes)?)),
            _ => Ok(Self::blob(bytes)),
        }
    }
}

/// Raw bytes of a texture, mesh, shader, script or unknown asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub bytes: Vec<u8>,
}

/// Model/prefab document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelDoc {
    /// Authored transform of the instance root
    #[serde(default)]
    pub root_transform: Transform,
    /// Renderable parts, one child node each when instantiated
    #[serde(default)]
    pub renderers: Vec<Renderer>,
    /// Behaviour modules attached to the instance root
    #[serde(default)]
    pub behaviours: Vec<AssetId>,
}

impl ModelDoc {
    /// Add a renderer
    #[must_use]
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderers.push(renderer);
        self
    }

    /// Add a behaviour module
    #[must_use]
    pub fn with_behaviour(mut self, script: AssetId) -> Self {
        self.behaviours.push(script);
        self
    }

    fn references(&self) -> Vec<&AssetId> {
        let mut refs = Vec::new();
        for renderer in &self.renderers {
            refs.extend(renderer.mesh.iter());
            refs.extend(renderer.materials.iter().flatten());
        }
        refs.extend(self.behaviours.iter());
        refs
    }
}

/// One renderable part: geometry plus material slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Renderer {
    pub name: String,
    #[serde(default)]
    pub local: Transform,
    #[serde(default)]
    pub mesh: Option<AssetId>,
    /// Material slots; an empty slot is `None`
    #[serde(default)]
    pub materials: Vec<Option<AssetId>>,
}

impl Renderer {
    /// Renderer with no geometry and no materials
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local: Transform::IDENTITY,
            mesh: None,
            materials: Vec::new(),
        }
    }

    /// With geometry
    #[must_use]
    pub fn with_mesh(mut self, mesh: AssetId) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Append a material slot
    #[must_use]
    pub fn with_material(mut self, material: AssetId) -> Self {
        self.materials.push(Some(material));
        self
    }
}

/// Material document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialDoc {
    #[serde(default)]
    pub shader: Option<AssetId>,
    #[serde(default)]
    pub properties: BTreeMap<String, MaterialProperty>,
}

impl MaterialDoc {
    /// With shader program
    #[must_use]
    pub fn with_shader(mut self, shader: AssetId) -> Self {
        self.shader = Some(shader);
        self
    }

    /// With a property
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, property: MaterialProperty) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Texture bound at `property`, if that property is a bound texture slot
    #[must_use]
    pub fn texture(&self, property: &str) -> Option<&AssetId> {
        self.properties.get(property).and_then(MaterialProperty::texture)
    }

    fn references(&self) -> Vec<&AssetId> {
        let mut refs: Vec<&AssetId> = self.shader.iter().collect();
        refs.extend(self.properties.values().filter_map(MaterialProperty::texture));
        refs
    }
}

/// Typed material property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MaterialProperty {
    Float(f32),
    Color([f32; 4]),
    Vector([f32; 4]),
    Texture(Option<AssetId>),
    Environment(Option<AssetId>),
}

impl MaterialProperty {
    /// Whether this property binds a texture/environment map
    #[inline]
    #[must_use]
    pub fn is_texture_slot(&self) -> bool {
        matches!(self, Self::Texture(_) | Self::Environment(_))
    }

    /// Bound texture
    #[must_use]
    pub fn texture(&self) -> Option<&AssetId> {
        match self {
            Self::Texture(slot) | Self::Environment(slot) => slot.as_ref(),
            _ => None,
        }
    }

    /// Mutable texture slot; `None` for non-texture properties
    #[must_use]
    pub fn texture_slot_mut(&mut self) -> Option<&mut Option<AssetId>> {
        match self {
            Self::Texture(slot) | Self::Environment(slot) => Some(slot),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AssetId {
        AssetId::new(s).unwrap()
    }

    fn hero_model() -> ModelDoc {
        ModelDoc::default()
            .with_renderer(
                Renderer::new("Body")
                    .with_mesh(id("Assets/Hero.mesh"))
                    .with_material(id("Assets/Hero.mat")),
            )
            .with_behaviour(id("Assets/Hero.cs"))
    }

    #[test]
    fn model_references_in_order() {
        let doc = AssetDocument::Model(hero_model());
        let refs: Vec<&str> = doc.references().into_iter().map(AssetId::as_str).collect();
        assert_eq!(refs, vec!["Assets/Hero.mesh", "Assets/Hero.mat", "Assets/Hero.cs"]);
    }

    #[test]
    fn material_references_skip_plain_values() {
        let material = MaterialDoc::default()
            .with_shader(id("Shaders/Lit.shader"))
            .with_property("_MainTex", MaterialProperty::Texture(Some(id("Assets/Skin.png"))))
            .with_property("_Cube", MaterialProperty::Environment(Some(id("Assets/Sky.hdr"))))
            .with_property("_Detail", MaterialProperty::Texture(None))
            .with_property("_Gloss", MaterialProperty::Float(0.5))
            .with_property("_Color", MaterialProperty::Color([1.0, 0.0, 0.0, 1.0]));
        let doc = AssetDocument::Material(material);
        let refs: Vec<&str> = doc.references().into_iter().map(AssetId::as_str).collect();
        assert_eq!(refs, vec!["Shaders/Lit.shader", "Assets/Sky.hdr", "Assets/Skin.png"]);
    }

    #[test]
    fn texture_slot_access() {
        let mut prop = MaterialProperty::Texture(Some(id("a.png")));
        assert!(prop.is_texture_slot());
        *prop.texture_slot_mut().unwrap() = Some(id("b.png"));
        assert_eq!(prop.texture().map(AssetId::as_str), Some("b.png"));

        let mut float = MaterialProperty::Float(1.0);
        assert!(!float.is_texture_slot());
        assert!(float.texture_slot_mut().is_none());
    }

    #[test]
    fn encode_decode_structured() {
        let doc = AssetDocument::Model(hero_model());
        let bytes = doc.encode().unwrap();
        let back = AssetDocument::decode(AssetKind::Model, &bytes).unwrap();
        assert_eq!(doc, back);
    }

    #[test]
    fn blob_is_stored_raw() {
        let doc = AssetDocument::blob(vec![0x89, b'P', b'N', b'G']);
        assert_eq!(doc.encode().unwrap(), vec![0x89, b'P', b'N', b'G']);
        assert!(doc.fits_kind(AssetKind::Texture));
        assert!(!doc.fits_kind(AssetKind::Material));
    }

    #[test]
    fn decode_rejects_malformed_material() {
        assert!(AssetDocument::decode(AssetKind::Material, b"not json").is_err());
    }

    #[test]
    fn content_hash_tracks_bindings() {
        let a = AssetDocument::Model(hero_model());
        let mut model = hero_model();
        model.renderers[0].materials[0] = Some(id("Exported/Hero.mat"));
        let b = AssetDocument::Model(model);
        assert_eq!(a.content_hash().unwrap(), a.clone().content_hash().unwrap());
        assert_ne!(a.content_hash().unwrap(), b.content_hash().unwrap());
    }
}
