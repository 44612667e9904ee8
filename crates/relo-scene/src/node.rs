//! Scene nodes and their components

use relo_asset::{AssetId, Transform};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Behaviour/data record attached to a node
///
/// Every node carries exactly one [`Component::Transform`]; its values live
/// in [`SceneNode::local`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    Transform,
    MeshFilter {
        mesh: Option<AssetId>,
    },
    MeshRenderer {
        materials: Vec<Option<AssetId>>,
    },
    Behaviour {
        script: AssetId,
        #[serde(default)]
        references: Vec<AssetId>,
    },
    Light {
        color: [f32; 4],
        intensity: f32,
    },
}

impl Component {
    #[inline]
    #[must_use]
    pub fn is_transform(&self) -> bool {
        matches!(self, Self::Transform)
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Transform => "Transform",
            Self::MeshFilter { .. } => "MeshFilter",
            Self::MeshRenderer { .. } => "MeshRenderer",
            Self::Behaviour { .. } => "Behaviour",
            Self::Light { .. } => "Light",
        }
    }

    /// Assets referenced by this component
    #[must_use]
    pub fn asset_references(&self) -> Vec<&AssetId> {
        match self {
            Self::Transform | Self::Light { .. } => Vec::new(),
            Self::MeshFilter { mesh } => mesh.iter().collect(),
            Self::MeshRenderer { materials } => materials.iter().flatten().collect(),
            Self::Behaviour { script, references } => {
                std::iter::once(script).chain(references.iter()).collect()
            }
        }
    }
}

/// A node in the spatial hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub parent: Option<NodeId>,
    /// Ordered children
    pub children: Vec<NodeId>,
    /// Transform relative to the parent
    pub local: Transform,
    pub components: Vec<Component>,
    /// Asset this node was instantiated from
    pub prefab_source: Option<AssetId>,
}

impl SceneNode {
    /// Detached node with only a transform component
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local: Transform::IDENTITY,
            components: vec![Component::Transform],
            prefab_source: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of transform components (always one for nodes built here)
    #[must_use]
    pub fn transform_count(&self) -> usize {
        self.components.iter().filter(|c| c.is_transform()).count()
    }

    /// Assets referenced by all components, in component order
    pub fn asset_references(&self) -> impl Iterator<Item = &AssetId> {
        self.components.iter().flat_map(Component::asset_references)
    }
}
