//! Dependency explorer
//!
//! Read-only inspection of what selected assets and scene nodes depend on.
//! Stored assets contribute their full transitive closure; scene nodes are
//! walked down to their leaves and every leaf contributes the assets its
//! components reference, together with their closures. Anything that does
//! not resolve is left out rather than reported as an error.

use crate::closure::DependencyClosure;
use crate::filter::FilterSpec;
use indexmap::IndexMap;
use relo_asset::{AssetId, AssetStore};
use relo_scene::{NodeId, SceneGraph};
use std::fmt::{self, Display, Formatter};

/// Closures of one selected item, keyed by display label
pub type Exploration = IndexMap<String, DependencyClosure>;

/// A selected item: a stored asset or a scene node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    Asset(AssetId),
    Node(NodeId),
}

impl Display for Selection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset(id) => write!(f, "asset {id}"),
            Self::Node(id) => write!(f, "node {id}"),
        }
    }
}

impl From<AssetId> for Selection {
    fn from(id: AssetId) -> Self {
        Self::Asset(id)
    }
}

impl From<NodeId> for Selection {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

pub struct DependencyExplorer<'a, S: AssetStore + ?Sized> {
    store: &'a S,
    scene: &'a SceneGraph,
}

impl<'a, S: AssetStore + ?Sized> DependencyExplorer<'a, S> {
    pub fn new(store: &'a S, scene: &'a SceneGraph) -> Self {
        Self { store, scene }
    }

    /// Filtered closures for each selected item
    ///
    /// Every resolved selection maps to its entries: one labelled by the
    /// asset's stem for a stored asset, one per leaf name for a scene node.
    /// Results keep selection order (then leaf order); entries left empty by
    /// `filters` are dropped, and so are selections with no entries left.
    #[must_use]
    pub fn explore(
        &self,
        selected: &[Selection],
        filters: &FilterSpec,
    ) -> IndexMap<Selection, Exploration> {
        let mut result: IndexMap<Selection, Exploration> = IndexMap::new();

        for item in selected {
            if result.contains_key(item) {
                continue;
            }
            let mut entries = Exploration::new();
            let mut add = |label: &str, closure: DependencyClosure| {
                let closure = closure.filtered(filters);
                if !closure.is_empty() {
                    entries.entry(label.to_string()).or_default().merge(closure);
                }
            };
            match item {
                Selection::Asset(id) => match self.asset_closure(id) {
                    Some(closure) => add(id.stem(), closure),
                    None => tracing::warn!("Omitting {}: does not resolve", item),
                },
                Selection::Node(node) => {
                    if !self.scene.contains(*node) {
                        tracing::warn!("Omitting {}: not in scene", item);
                        continue;
                    }
                    for leaf in self.scene.leaves(*node) {
                        if let Some(leaf_node) = self.scene.node(leaf) {
                            add(&leaf_node.name, self.leaf_closure(leaf));
                        }
                    }
                }
            }
            if !entries.is_empty() {
                result.insert(item.clone(), entries);
            }
        }

        tracing::debug!(
            "Explored {} selections into {} results",
            selected.len(),
            result.len()
        );
        result
    }

    /// Transitive dependencies of a stored asset; `None` if it does not resolve
    #[must_use]
    pub fn asset_closure(&self, id: &AssetId) -> Option<DependencyClosure> {
        if !self.store.exists(id) {
            return None;
        }
        match self.store.list_dependencies(id, true) {
            Ok(dependencies) => Some(self.resolved(dependencies)),
            Err(e) => {
                tracing::warn!("Dependencies of {} unavailable: {}", id, e);
                None
            }
        }
    }

    /// Assets referenced by a node's components, with their closures
    #[must_use]
    pub fn leaf_closure(&self, node: NodeId) -> DependencyClosure {
        let mut closure = DependencyClosure::new();
        let Some(node) = self.scene.node(node) else {
            return closure;
        };
        for reference in node.asset_references() {
            if let Some(dependencies) = self.asset_closure(reference) {
                closure.insert(reference.clone());
                closure.merge(dependencies);
            } else {
                tracing::debug!("Skipping stale reference {} on {}", reference, node.name);
            }
        }
        closure
    }

    fn resolved(&self, ids: Vec<AssetId>) -> DependencyClosure {
        ids.into_iter()
            .filter(|id| {
                let exists = self.store.exists(id);
                if !exists {
                    tracing::debug!("Skipping stale reference {}", id);
                }
                exists
            })
            .collect()
    }

    /// Backing asset of an item
    ///
    /// Scene nodes resolve through the asset they were instantiated from.
    /// `None` means there is no path to show.
    #[must_use]
    pub fn find_source(&self, item: &Selection) -> Option<AssetId> {
        match item {
            Selection::Asset(id) => self.store.exists(id).then(|| id.clone()),
            Selection::Node(node) => self
                .scene
                .node(*node)?
                .prefab_source
                .clone()
                .filter(|source| self.store.exists(source)),
        }
    }
}
