//! Testing utilities for the Relo workspace
//!
//! Shared stores, scene hierarchies and tracing setup.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use relo_asset::{
    AssetDocument, AssetId, AssetPath, MaterialDoc, MaterialProperty, MemoryStore, ModelDoc,
    Renderer, Transform, Vec3,
};
use relo_scene::{Component, NodeId, SceneGraph};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const HERO_MODEL: &str = "Assets/Characters/Hero.model";
pub const HERO_MATERIAL: &str = "Assets/Materials/Hero.mat";
pub const HERO_TEXTURE: &str = "Assets/Textures/Skin.png";
pub const HERO_SCRIPT: &str = "Assets/Scripts/Hero.cs";

/// Destination used by relocation scenarios
pub const EXPORTED: &str = "Assets/Exported";

/// Root of [`closure_store`]
pub const CLOSURE_ROOT: &str = "Assets/Props/Crate.model";
pub const CLOSURE_SCRIPT: &str = "Assets/Scripts/Breakable.cs";
pub const CLOSURE_SHADER: &str = "Assets/Shaders/Lit.shader";

/// Install a `RUST_LOG`-driven subscriber once per test binary
pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

pub fn asset_id(path: &str) -> AssetId {
    AssetId::new(path).unwrap()
}

pub fn asset_path(path: &str) -> AssetPath {
    path.parse().unwrap()
}

/// Hero model -> Hero material -> Skin texture, plus the Hero script
///
/// Sources live in separate folders so relocation has to flatten them.
pub fn hero_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    let model = ModelDoc {
        root_transform: Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        ..ModelDoc::default()
    }
    .with_renderer(Renderer::new("Body").with_material(asset_id(HERO_MATERIAL)))
    .with_behaviour(asset_id(HERO_SCRIPT));
    store
        .insert(asset_id(HERO_MODEL), AssetDocument::Model(model))
        .unwrap();
    store
        .insert(
            asset_id(HERO_MATERIAL),
            AssetDocument::Material(
                MaterialDoc::default()
                    .with_property(
                        "_MainTex",
                        MaterialProperty::Texture(Some(asset_id(HERO_TEXTURE))),
                    )
                    .with_property("_Glossiness", MaterialProperty::Float(0.4))
                    .with_property("_Color", MaterialProperty::Color([1.0, 0.8, 0.7, 1.0])),
            ),
        )
        .unwrap();
    store
        .insert(asset_id(HERO_TEXTURE), AssetDocument::blob(b"PNG skin".to_vec()))
        .unwrap();
    store
        .insert(asset_id(HERO_SCRIPT), AssetDocument::blob(b"class Hero {}".to_vec()))
        .unwrap();
    store
}

/// Model with `parts` renderers, each with its own mesh, material and texture
///
/// Every material uses one shared shader and the model carries one script,
/// so the relocatable closure is `3 * parts` data assets plus the root.
pub fn closure_store(parts: usize) -> MemoryStore {
    let mut store = MemoryStore::new();
    let mut model = ModelDoc::default().with_behaviour(asset_id(CLOSURE_SCRIPT));
    for i in 0..parts {
        let mesh = asset_id(&format!("Assets/Meshes/Part{i}.mesh"));
        let material = asset_id(&format!("Assets/Materials/Part{i}.mat"));
        let texture = asset_id(&format!("Assets/Textures/Part{i}.png"));
        model = model.with_renderer(
            Renderer::new(format!("Part{i}"))
                .with_mesh(mesh.clone())
                .with_material(material.clone()),
        );
        store
            .insert(mesh, AssetDocument::blob(format!("mesh {i}").into_bytes()))
            .unwrap();
        store
            .insert(
                material,
                AssetDocument::Material(
                    MaterialDoc::default()
                        .with_shader(asset_id(CLOSURE_SHADER))
                        .with_property("_MainTex", MaterialProperty::Texture(Some(texture.clone())))
                        .with_property("_Metallic", MaterialProperty::Float(0.1)),
                ),
            )
            .unwrap();
        store
            .insert(texture, AssetDocument::blob(format!("png {i}").into_bytes()))
            .unwrap();
    }
    store
        .insert(asset_id(CLOSURE_ROOT), AssetDocument::Model(model))
        .unwrap();
    store
        .insert(asset_id(CLOSURE_SCRIPT), AssetDocument::blob(b"class Breakable {}".to_vec()))
        .unwrap();
    store
        .insert(asset_id(CLOSURE_SHADER), AssetDocument::blob(b"Shader \"Lit\" {}".to_vec()))
        .unwrap();
    store
}

/// Nodes of [`scene_hierarchy`]
#[derive(Debug, Clone)]
pub struct Hierarchy {
    pub root: NodeId,
    /// Intermediate nodes
    pub groups: Vec<NodeId>,
    pub leaves: Vec<NodeId>,
}

/// Three-level scene over [`hero_store`] assets
///
/// ```text
/// World
/// ├── Left
/// │   └── LeftHand   MeshRenderer [Hero.mat]
/// └── Right
///     ├── RightHand  Behaviour Hero.cs
///     └── Lamp       Light
/// ```
///
/// Only leaves carry asset references.
pub fn scene_hierarchy() -> (SceneGraph, Hierarchy) {
    let mut scene = SceneGraph::new();
    let root = scene.create_node("World", None).unwrap();
    let left = scene.create_node("Left", Some(root)).unwrap();
    let right = scene.create_node("Right", Some(root)).unwrap();
    scene
        .set_local(left, Transform::from_translation(Vec3::new(-2.0, 0.0, 0.0)))
        .unwrap();

    let left_hand = scene.create_node("LeftHand", Some(left)).unwrap();
    scene
        .add_component(
            left_hand,
            Component::MeshRenderer {
                materials: vec![Some(asset_id(HERO_MATERIAL))],
            },
        )
        .unwrap();

    let right_hand = scene.create_node("RightHand", Some(right)).unwrap();
    scene
        .add_component(
            right_hand,
            Component::Behaviour {
                script: asset_id(HERO_SCRIPT),
                references: Vec::new(),
            },
        )
        .unwrap();

    let lamp = scene.create_node("Lamp", Some(right)).unwrap();
    scene
        .add_component(
            lamp,
            Component::Light {
                color: [1.0, 0.9, 0.8, 1.0],
                intensity: 3.0,
            },
        )
        .unwrap();

    let hierarchy = Hierarchy {
        root,
        groups: vec![left, right],
        leaves: vec![left_hand, right_hand, lamp],
    };
    (scene, hierarchy)
}
