//! Replacement engine
//!
//! Swaps scene nodes for fresh instances of a model asset. The new node
//! takes the target's world position and rotation, its scale and optionally
//! its name and components. Creation and destruction go into one undo group.

use crate::config::ReplaceOptions;
use crate::error::CoreError;
use relo_asset::{AssetHandle, AssetId, AssetStore, ModelAsset, ModelDoc, Transform, Vec3};
use relo_scene::{Component, NodeId, SceneGraph, UndoLog};
use std::collections::BTreeSet;

/// State of a target captured before it is replaced
struct Captured {
    world: Transform,
    local_scale: Vec3,
    parent: Option<NodeId>,
    name: String,
    components: Vec<Component>,
}

pub struct ReplacementEngine<'a, S: AssetStore + ?Sized> {
    store: &'a S,
    scene: &'a mut SceneGraph,
    undo: &'a mut UndoLog,
}

impl<'a, S: AssetStore + ?Sized> ReplacementEngine<'a, S> {
    pub fn new(store: &'a S, scene: &'a mut SceneGraph, undo: &'a mut UndoLog) -> Self {
        Self { store, scene, undo }
    }

    /// Replace `target` with a new instance of `source`
    ///
    /// Returns the new node. One undo step reverts the whole replacement.
    ///
    /// # Errors
    /// Returns `InvalidArguments` if `target` is not in the scene or
    /// `source` is not a stored model; the scene is left untouched.
    pub fn replace(
        &mut self,
        source: &AssetId,
        target: NodeId,
        opts: ReplaceOptions,
    ) -> Result<NodeId, CoreError> {
        let mut created = self.replace_all(source, &[target], opts)?;
        created
            .pop()
            .ok_or_else(|| CoreError::invalid_arguments("nothing was replaced"))
    }

    /// Replace every node in `targets` within a single undo group
    ///
    /// # Errors
    /// Returns `InvalidArguments` for an empty, duplicated or nested target
    /// list, an unknown target or a missing source model.
    pub fn replace_all(
        &mut self,
        source: &AssetId,
        targets: &[NodeId],
        opts: ReplaceOptions,
    ) -> Result<Vec<NodeId>, CoreError> {
        let model = self.validate(source, targets)?;
        let label = match targets {
            [single] => format!(
                "Replace {}",
                self.scene.node(*single).map_or("node", |n| n.name.as_str())
            ),
            _ => format!("Replace {} nodes", targets.len()),
        };

        self.undo.begin_group(label)?;
        let mut created = Vec::with_capacity(targets.len());
        for &target in targets {
            match self.replace_one(source, model.content(), target, opts) {
                Ok(node) => created.push(node),
                Err(e) => {
                    // Keep what was already replaced undoable as one step.
                    self.undo.commit(self.scene)?;
                    return Err(e);
                }
            }
        }
        self.undo.commit(self.scene)?;

        tracing::info!(
            "Replaced {} node(s) with instances of {}",
            created.len(),
            source
        );
        Ok(created)
    }

    fn validate(
        &self,
        source: &AssetId,
        targets: &[NodeId],
    ) -> Result<AssetHandle<ModelAsset>, CoreError> {
        if targets.is_empty() {
            return Err(CoreError::invalid_arguments("no replace targets"));
        }
        let mut seen = BTreeSet::new();
        for &target in targets {
            if !self.scene.contains(target) {
                return Err(CoreError::invalid_arguments(format!(
                    "target node {target} is not in the scene"
                )));
            }
            if !seen.insert(target) {
                return Err(CoreError::invalid_arguments(format!(
                    "target node {target} listed twice"
                )));
            }
        }
        for &target in targets {
            if targets
                .iter()
                .any(|&other| other != target && self.scene.is_ancestor(other, target))
            {
                return Err(CoreError::invalid_arguments(format!(
                    "target node {target} is nested under another target"
                )));
            }
        }
        if !self.store.exists(source) {
            return Err(CoreError::invalid_arguments(format!(
                "source asset {source} not found"
            )));
        }
        Ok(AssetHandle::<ModelAsset>::load(self.store, source)?)
    }

    fn capture(&self, target: NodeId, copy_components: bool) -> Result<Captured, CoreError> {
        let node = self
            .scene
            .node(target)
            .ok_or_else(|| CoreError::invalid_arguments(format!("target node {target} is gone")))?;
        Ok(Captured {
            world: self.scene.world_transform(target)?,
            local_scale: node.local.scale,
            parent: node.parent,
            name: node.name.clone(),
            components: if copy_components {
                node.components
                    .iter()
                    .filter(|c| !c.is_transform())
                    .cloned()
                    .collect()
            } else {
                Vec::new()
            },
        })
    }

    fn replace_one(
        &mut self,
        source: &AssetId,
        model: &ModelDoc,
        target: NodeId,
        opts: ReplaceOptions,
    ) -> Result<NodeId, CoreError> {
        let captured = self.capture(target, opts.copy_components)?;
        let created = self.scene.instantiate(source, model);
        if let Err(e) = self.place(created, &captured, opts) {
            self.scene.destroy(created)?;
            return Err(e);
        }

        self.undo.record_created(self.scene, created)?;
        self.undo.record_destroyed(self.scene, target)?;
        self.scene.destroy(target)?;
        tracing::debug!("Replaced {} with {}", target, created);
        Ok(created)
    }

    /// Apply the captured pose, parent, components and name to `created`
    fn place(
        &mut self,
        created: NodeId,
        captured: &Captured,
        opts: ReplaceOptions,
    ) -> Result<(), CoreError> {
        // Instances start at the root, so local equals world here.
        self.scene.set_local(
            created,
            Transform {
                translation: captured.world.translation,
                rotation: captured.world.rotation,
                scale: captured.local_scale,
            },
        )?;
        self.scene.set_parent(created, captured.parent, true)?;
        for component in &captured.components {
            self.scene.add_component(created, component.clone())?;
        }
        if opts.keep_name {
            self.scene.rename(created, captured.name.clone())?;
        }
        Ok(())
    }
}
