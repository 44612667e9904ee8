//! Dependency explorer integration tests

use pretty_assertions::assert_eq;
use relo_asset::{
    AssetDocument, AssetHandle, MaterialDoc, MaterialProperty, ModelAsset, ModelDoc, Renderer,
};
use relo_core::{DependencyClosure, DependencyExplorer, Exploration, FilterSpec, Selection};
use relo_scene::{Component, NodeId, SceneGraph};
use relo_test_utils::*;

fn labels(entries: &Exploration) -> Vec<&str> {
    entries.keys().map(String::as_str).collect()
}

fn ids(closure: &DependencyClosure) -> Vec<String> {
    closure.assets().map(ToString::to_string).collect()
}

#[test]
fn scene_nodes_report_leaves_only() {
    init_test_tracing();
    let store = hero_store();
    let (scene, hierarchy) = scene_hierarchy();
    let explorer = DependencyExplorer::new(&store, &scene);

    let world = Selection::Node(hierarchy.root);
    let result = explorer.explore(&[world.clone()], &FilterSpec::default());
    assert_eq!(result.len(), 1);

    // Lamp has no asset references and is omitted.
    let entries = &result[&world];
    assert_eq!(labels(entries), vec!["LeftHand", "RightHand"]);
    for group in ["World", "Left", "Right"] {
        assert!(!entries.contains_key(group));
    }
    assert_eq!(ids(&entries["LeftHand"]), vec![HERO_MATERIAL, HERO_TEXTURE]);
    assert_eq!(ids(&entries["RightHand"]), vec![HERO_SCRIPT]);
}

#[test]
fn asset_closure_groups_by_base_name() {
    let store = hero_store();
    let scene = SceneGraph::new();
    let explorer = DependencyExplorer::new(&store, &scene);

    let hero = Selection::Asset(asset_id(HERO_MODEL));
    let result = explorer.explore(&[hero.clone()], &FilterSpec::default());
    assert_eq!(labels(&result[&hero]), vec!["Hero"]);

    let closure = &result[&hero]["Hero"];
    assert_eq!(closure.names().collect::<Vec<_>>(), vec!["Hero", "Skin"]);
    assert_eq!(closure.get("Hero").unwrap().len(), 2);
    assert!(!closure.contains(&asset_id(HERO_MODEL)));
}

#[test]
fn filters_narrow_and_drop_entries() {
    let store = hero_store();
    let (scene, hierarchy) = scene_hierarchy();
    let explorer = DependencyExplorer::new(&store, &scene);
    let world = Selection::Node(hierarchy.root);
    let hero = Selection::Asset(asset_id(HERO_MODEL));
    let selection = [world.clone(), hero.clone()];

    let materials = explorer.explore(&selection, &FilterSpec::default().enable(".mat"));
    assert_eq!(labels(&materials[&world]), vec!["LeftHand"]);
    assert_eq!(ids(&materials[&hero]["Hero"]), vec![HERO_MATERIAL]);

    let textures = explorer.explore(&selection, &FilterSpec::default().enable("texture"));
    assert_eq!(labels(&textures[&world]), vec!["LeftHand"]);
    assert_eq!(ids(&textures[&world]["LeftHand"]), vec![HERO_TEXTURE]);
    assert_eq!(ids(&textures[&hero]["Hero"]), vec![HERO_TEXTURE]);

    let scripts = explorer.explore(&selection, &FilterSpec::default().enable(".cs"));
    assert_eq!(labels(&scripts[&world]), vec!["RightHand"]);
    assert_eq!(ids(&scripts[&hero]["Hero"]), vec![HERO_SCRIPT]);

    let meshes = explorer.explore(&selection, &FilterSpec::default().enable("mesh"));
    assert!(meshes.is_empty());
}

#[test]
fn unresolved_items_are_omitted() {
    let store = hero_store();
    let (mut scene, hierarchy) = scene_hierarchy();
    let stale = scene.create_node("Stale", Some(hierarchy.root)).unwrap();
    scene
        .add_component(
            stale,
            Component::MeshFilter {
                mesh: Some(asset_id("Assets/Meshes/Gone.mesh")),
            },
        )
        .unwrap();
    let explorer = DependencyExplorer::new(&store, &scene);

    let result = explorer.explore(
        &[
            Selection::Asset(asset_id("Assets/Nowhere.model")),
            Selection::Node(NodeId::new()),
            Selection::Node(stale),
        ],
        &FilterSpec::default(),
    );
    assert!(result.is_empty());
}

#[test]
fn selections_sharing_a_stem_stay_apart() {
    let mut store = hero_store();
    let other = asset_id("Assets/Other/Hero.model");
    let other_texture = asset_id("Assets/Other/Armor.png");
    let other_material = asset_id("Assets/Other/Armor.mat");
    store
        .insert(other_texture.clone(), AssetDocument::blob(b"PNG armor".to_vec()))
        .unwrap();
    store
        .insert(
            other_material.clone(),
            AssetDocument::Material(
                MaterialDoc::default()
                    .with_property("_MainTex", MaterialProperty::Texture(Some(other_texture))),
            ),
        )
        .unwrap();
    store
        .insert(
            other.clone(),
            AssetDocument::Model(
                ModelDoc::default()
                    .with_renderer(Renderer::new("Armor").with_material(other_material)),
            ),
        )
        .unwrap();
    let scene = SceneGraph::new();
    let explorer = DependencyExplorer::new(&store, &scene);

    let hero = Selection::Asset(asset_id(HERO_MODEL));
    let twin = Selection::Asset(other);
    let material = Selection::Asset(asset_id(HERO_MATERIAL));
    let result = explorer.explore(
        &[hero.clone(), twin.clone(), material.clone()],
        &FilterSpec::default(),
    );

    assert_eq!(
        result.keys().cloned().collect::<Vec<_>>(),
        vec![hero.clone(), twin.clone(), material.clone()]
    );
    assert_eq!(
        ids(&result[&hero]["Hero"]),
        vec![HERO_MATERIAL, HERO_SCRIPT, HERO_TEXTURE]
    );
    assert_eq!(
        ids(&result[&twin]["Hero"]),
        vec!["Assets/Other/Armor.mat", "Assets/Other/Armor.png"]
    );
    assert_eq!(ids(&result[&material]["Hero"]), vec![HERO_TEXTURE]);
}

#[test]
fn find_source_falls_back_to_prefab() {
    let mut store = hero_store();
    let prop = asset_id("Assets/Props/Barrel.model");
    store
        .insert(
            prop.clone(),
            AssetDocument::Model(ModelDoc::default().with_renderer(Renderer::new("Barrel"))),
        )
        .unwrap();

    let (mut scene, hierarchy) = scene_hierarchy();
    let model = AssetHandle::<ModelAsset>::load(&store, &prop).unwrap();
    let instance = scene.instantiate(&prop, model.content());
    let part = scene.children(instance)[0];
    let explorer = DependencyExplorer::new(&store, &scene);

    assert_eq!(explorer.find_source(&Selection::Node(instance)), Some(prop.clone()));
    assert_eq!(explorer.find_source(&Selection::Node(part)), Some(prop));
    assert_eq!(explorer.find_source(&Selection::Node(hierarchy.root)), None);
    assert_eq!(
        explorer.find_source(&asset_id(HERO_TEXTURE).into()),
        Some(asset_id(HERO_TEXTURE))
    );
    assert_eq!(explorer.find_source(&asset_id("Assets/Gone.png").into()), None);
}
