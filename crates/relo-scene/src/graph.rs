//! Scene graph
//!
//! Owns every [`SceneNode`] and keeps the parent/children links consistent.
//! Nodes are stored in insertion order; roots and children keep their
//! sibling order.

use crate::error::SceneError;
use crate::node::{Component, NodeId, SceneNode};
use glam::Mat4;
use indexmap::IndexMap;
use relo_asset::{AssetId, ModelDoc, Renderer, Transform};

/// Detached copy of a subtree, enough to put it back where it was
#[derive(Debug, Clone, PartialEq)]
pub struct Subtree {
    pub root: NodeId,
    pub parent: Option<NodeId>,
    /// Sibling index under `parent` (or among the roots)
    pub index: usize,
    /// Nodes in pre-order, root first
    pub nodes: Vec<SceneNode>,
}

impl Subtree {
    #[inline]
    #[must_use]
    pub fn root_node(&self) -> Option<&SceneNode> {
        self.nodes.first()
    }
}

/// Hierarchy of scene nodes
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: IndexMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    fn get(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Ordered children of `id` (empty if unknown)
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |n| n.children.as_slice())
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Position of `id` among its siblings
    ///
    /// # Errors
    /// Returns `SceneError::NodeNotFound` if `id` is unknown
    pub fn sibling_index(&self, id: NodeId) -> Result<usize, SceneError> {
        let siblings = match self.get(id)?.parent {
            Some(parent) => self.children(parent),
            None => &self.roots,
        };
        Ok(siblings.iter().position(|s| *s == id).unwrap_or(siblings.len()))
    }

    /// First node named `name`, in insertion order
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.values().find(|n| n.name == name).map(|n| n.id)
    }

    /// Create a node with an identity transform as last child of `parent`
    ///
    /// # Errors
    /// Returns `SceneError::NodeNotFound` if `parent` is unknown
    pub fn create_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        self.insert(SceneNode::new(name), parent)
    }

    fn insert(&mut self, mut node: SceneNode, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
        if let Some(p) = parent {
            self.get(p)?;
        }
        if self.nodes.contains_key(&node.id) {
            return Err(SceneError::DuplicateNode(node.id));
        }
        let id = node.id;
        node.parent = None;
        self.nodes.insert(id, node);
        self.attach(id, parent, None);
        Ok(id)
    }

    /// Link `id` under `parent` at `index` (end if `None`); both must exist
    fn attach(&mut self, id: NodeId, parent: Option<NodeId>, index: Option<usize>) {
        let siblings = match parent {
            Some(p) => match self.nodes.get_mut(&p) {
                Some(node) => &mut node.children,
                None => return,
            },
            None => &mut self.roots,
        };
        let at = index.map_or(siblings.len(), |i| i.min(siblings.len()));
        siblings.insert(at, id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = parent;
        }
    }

    /// Unlink `id` from its parent, returning the old parent and index
    fn detach(&mut self, id: NodeId) -> Result<(Option<NodeId>, usize), SceneError> {
        let parent = self.get(id)?.parent;
        let siblings = match parent {
            Some(p) => &mut self.get_mut(p)?.children,
            None => &mut self.roots,
        };
        let index = siblings.iter().position(|s| *s == id).unwrap_or(siblings.len());
        if index < siblings.len() {
            siblings.remove(index);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
        Ok((parent, index))
    }

    /// Instantiate a model as a new root-level hierarchy
    ///
    /// The root is named after the asset's stem and carries the model's
    /// behaviours; every renderer becomes a child with mesh and material
    /// components. All created nodes record `source` as their prefab source.
    pub fn instantiate(&mut self, source: &AssetId, model: &ModelDoc) -> NodeId {
        let mut root = SceneNode::new(source.stem());
        root.local = model.root_transform;
        root.prefab_source = Some(source.clone());
        root.components.extend(model.behaviours.iter().map(|script| Component::Behaviour {
            script: script.clone(),
            references: Vec::new(),
        }));
        let root_id = root.id;
        self.nodes.insert(root_id, root);
        self.attach(root_id, None, None);

        for renderer in &model.renderers {
            let child = renderer_node(source, renderer);
            let child_id = child.id;
            self.nodes.insert(child_id, child);
            self.attach(child_id, Some(root_id), None);
        }

        tracing::debug!(
            "Instantiated {} as {} with {} renderers",
            source,
            root_id,
            model.renderers.len()
        );
        root_id
    }

    /// Composed local-to-world matrix
    ///
    /// # Errors
    /// Returns `SceneError::NodeNotFound` if `id` or an ancestor is unknown
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let node = self.get(id)?;
        let mut matrix = node.local.to_matrix();
        let mut current = node.parent;
        while let Some(parent) = current {
            let p = self.get(parent)?;
            matrix = p.local.to_matrix() * matrix;
            current = p.parent;
        }
        Ok(matrix)
    }

    /// World-space translation, rotation and scale
    ///
    /// # Errors
    /// Returns `SceneError::NodeNotFound` if `id` is unknown
    pub fn world_transform(&self, id: NodeId) -> Result<Transform, SceneError> {
        self.world_matrix(id).map(Transform::from_matrix)
    }

    fn parent_inverse(&self, parent: Option<NodeId>) -> Result<Mat4, SceneError> {
        let Some(parent) = parent else {
            return Ok(Mat4::IDENTITY);
        };
        let world = self.world_matrix(parent)?;
        if world.determinant().abs() <= f32::EPSILON {
            return Err(SceneError::Singular(parent));
        }
        Ok(world.inverse())
    }

    /// Set the transform relative to the parent
    ///
    /// # Errors
    /// Returns `SceneError::NodeNotFound` if `id` is unknown
    pub fn set_local(&mut self, id: NodeId, local: Transform) -> Result<(), SceneError> {
        self.get_mut(id)?.local = local;
        Ok(())
    }

    /// Place `id` at `world`, adjusting its local transform
    ///
    /// # Errors
    /// Returns error if `id` is unknown or its parent has a degenerate transform
    pub fn set_world(&mut self, id: NodeId, world: Transform) -> Result<(), SceneError> {
        let inverse = self.parent_inverse(self.get(id)?.parent)?;
        self.get_mut(id)?.local = Transform::from_matrix(inverse * world.to_matrix());
        Ok(())
    }

    /// Whether `ancestor` is `id` or above it
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Move `id` to the end of `parent`'s children
    ///
    /// With `keep_world`, the local transform is recomputed so the world
    /// transform does not change.
    ///
    /// # Errors
    /// Returns `SceneError::Cycle` if `parent` is `id` or one of its descendants
    pub fn set_parent(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        keep_world: bool,
    ) -> Result<(), SceneError> {
        self.get(id)?;
        if let Some(p) = parent {
            self.get(p)?;
            if self.is_ancestor(id, p) {
                return Err(SceneError::Cycle { node: id, parent: p });
            }
        }
        let local = if keep_world {
            let world = self.world_matrix(id)?;
            Some(Transform::from_matrix(self.parent_inverse(parent)? * world))
        } else {
            None
        };
        self.detach(id)?;
        self.attach(id, parent, None);
        if let Some(local) = local {
            self.get_mut(id)?.local = local;
        }
        Ok(())
    }

    /// # Errors
    /// Returns `SceneError::NodeNotFound` if `id` is unknown
    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), SceneError> {
        self.get_mut(id)?.name = name.into();
        Ok(())
    }

    /// # Errors
    /// Returns `SceneError::NodeNotFound` if `id` is unknown
    pub fn components(&self, id: NodeId) -> Result<&[Component], SceneError> {
        Ok(&self.get(id)?.components)
    }

    /// Append a component; a second transform is ignored
    ///
    /// # Errors
    /// Returns `SceneError::NodeNotFound` if `id` is unknown
    pub fn add_component(&mut self, id: NodeId, component: Component) -> Result<bool, SceneError> {
        let node = self.get_mut(id)?;
        if component.is_transform() && node.transform_count() > 0 {
            return Ok(false);
        }
        node.components.push(component);
        Ok(true)
    }

    /// `id` and everything below it, pre-order
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Childless nodes under `id` (or `id` itself), pre-order
    #[must_use]
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.children(*n).is_empty())
            .collect()
    }

    /// Copy the subtree rooted at `id`
    ///
    /// # Errors
    /// Returns `SceneError::NodeNotFound` if `id` is unknown
    pub fn subtree(&self, id: NodeId) -> Result<Subtree, SceneError> {
        let root = self.get(id)?;
        Ok(Subtree {
            root: id,
            parent: root.parent,
            index: self.sibling_index(id)?,
            nodes: self
                .descendants(id)
                .into_iter()
                .filter_map(|n| self.nodes.get(&n).cloned())
                .collect(),
        })
    }

    /// Remove `id` and its descendants
    ///
    /// # Errors
    /// Returns `SceneError::NodeNotFound` if `id` is unknown
    pub fn destroy(&mut self, id: NodeId) -> Result<Subtree, SceneError> {
        let subtree = self.subtree(id)?;
        self.detach(id)?;
        for node in &subtree.nodes {
            self.nodes.shift_remove(&node.id);
        }
        tracing::debug!("Destroyed {} ({} nodes)", id, subtree.nodes.len());
        Ok(subtree)
    }

    /// Put a destroyed subtree back at its parent and sibling index
    ///
    /// # Errors
    /// Returns error if the parent is gone or a node id is already present
    pub fn restore(&mut self, subtree: Subtree) -> Result<NodeId, SceneError> {
        if let Some(p) = subtree.parent {
            self.get(p)?;
        }
        if let Some(dup) = subtree.nodes.iter().find(|n| self.contains(n.id)) {
            return Err(SceneError::DuplicateNode(dup.id));
        }
        let root = subtree.root;
        for mut node in subtree.nodes {
            if node.id == root {
                node.parent = None;
            }
            self.nodes.insert(node.id, node);
        }
        self.attach(root, subtree.parent, Some(subtree.index));
        Ok(root)
    }

    /// Overwrite the non-hierarchical state of a node
    ///
    /// Name, local transform, components and prefab source are taken from
    /// `state`; parent and children are left alone.
    ///
    /// # Errors
    /// Returns `SceneError::NodeNotFound` if `state.id` is unknown
    pub fn apply_state(&mut self, state: &SceneNode) -> Result<(), SceneError> {
        let node = self.get_mut(state.id)?;
        node.name.clone_from(&state.name);
        node.local = state.local;
        node.components.clone_from(&state.components);
        node.prefab_source.clone_from(&state.prefab_source);
        Ok(())
    }

    /// Re-sync every instance of `source` with its updated model
    ///
    /// Instance roots get the model's behaviours; renderer children matched
    /// by name get the new mesh and materials, missing ones are created.
    /// Local transforms stay as placed. Returns the number of instances.
    pub fn refresh_prefab_instances(&mut self, source: &AssetId, model: &ModelDoc) -> usize {
        let instances: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|n| n.prefab_source.as_ref() == Some(source))
            .filter(|n| {
                n.parent
                    .and_then(|p| self.nodes.get(&p))
                    .map_or(true, |p| p.prefab_source.as_ref() != Some(source))
            })
            .map(|n| n.id)
            .collect();

        for &instance in &instances {
            if let Some(root) = self.nodes.get_mut(&instance) {
                root.components
                    .retain(|c| !matches!(c, Component::Behaviour { .. }));
                root.components.extend(model.behaviours.iter().map(|script| {
                    Component::Behaviour {
                        script: script.clone(),
                        references: Vec::new(),
                    }
                }));
            }

            for renderer in &model.renderers {
                let existing = self.children(instance).iter().copied().find(|c| {
                    self.nodes.get(c).is_some_and(|n| {
                        n.name == renderer.name && n.prefab_source.as_ref() == Some(source)
                    })
                });
                match existing.and_then(|c| self.nodes.get_mut(&c)) {
                    Some(child) => {
                        child.components.retain(|c| {
                            !matches!(
                                c,
                                Component::MeshFilter { .. } | Component::MeshRenderer { .. }
                            )
                        });
                        child.components.extend(mesh_components(renderer));
                    }
                    None => {
                        let child = renderer_node(source, renderer);
                        let child_id = child.id;
                        self.nodes.insert(child_id, child);
                        self.attach(child_id, Some(instance), None);
                    }
                }
            }
        }

        if !instances.is_empty() {
            tracing::info!("Refreshed {} instances of {}", instances.len(), source);
        }
        instances.len()
    }
}

fn mesh_components(renderer: &Renderer) -> [Component; 2] {
    [
        Component::MeshFilter {
            mesh: renderer.mesh.clone(),
        },
        Component::MeshRenderer {
            materials: renderer.materials.clone(),
        },
    ]
}

fn renderer_node(source: &AssetId, renderer: &Renderer) -> SceneNode {
    let mut node = SceneNode::new(renderer.name.clone());
    node.local = renderer.local;
    node.prefab_source = Some(source.clone());
    node.components.extend(mesh_components(renderer));
    node
}
