//! Asset store contract
//!
//! [`AssetStore`] is the external capability every engine is handed
//! explicitly: folder management, idempotence checks, copying, loading,
//! saving and dependency resolution.

use crate::document::AssetDocument;
use crate::kind::AssetKind;
use crate::path::{AssetId, AssetPath, PathError};
use indexmap::IndexSet;
use std::path::PathBuf;

/// Persistent asset storage plus dependency resolution
///
/// # Contract
/// - `copy` never overwrites: copying onto an existing identifier fails with
///   [`StoreError::AlreadyExists`]; callers check [`AssetStore::exists`] first.
/// - `create_folder` creates exactly one segment below an existing parent.
/// - `list_dependencies` never includes `id` itself, terminates on cyclic
///   graphs and reports each identifier once, in first-discovery order.
///   References to assets that are not stored are still reported.
pub trait AssetStore {
    /// Whether an asset is stored at `id`
    fn exists(&self, id: &AssetId) -> bool;

    /// Whether `folder` exists (the root always exists)
    fn folder_exists(&self, folder: &AssetPath) -> bool;

    /// Create folder `name` inside `parent`
    ///
    /// # Errors
    /// - `StoreError::FolderNotFound` if `parent` does not exist
    /// - `StoreError::FolderExists` if the folder already exists
    fn create_folder(&mut self, parent: &AssetPath, name: &str) -> Result<AssetPath, StoreError>;

    /// Copy the stored content of `src` to `dst`
    ///
    /// # Errors
    /// - `StoreError::NotFound` if `src` is missing
    /// - `StoreError::AlreadyExists` if `dst` is taken
    /// - `StoreError::FolderNotFound` if the folder of `dst` is missing
    fn copy(&mut self, src: &AssetId, dst: &AssetId) -> Result<(), StoreError>;

    /// Load the document stored at `id`
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if nothing is stored at `id`
    fn load(&self, id: &AssetId) -> Result<AssetDocument, StoreError>;

    /// Store `doc` at `id`, replacing previous content
    ///
    /// # Errors
    /// Returns `StoreError::KindMismatch` if `doc` cannot be stored under the
    /// kind implied by the extension of `id`
    fn save(&mut self, id: &AssetId, doc: &AssetDocument) -> Result<(), StoreError>;

    /// Direct (`recursive == false`) or transitive dependencies of `id`
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if `id` itself is not stored
    fn list_dependencies(&self, id: &AssetId, recursive: bool) -> Result<Vec<AssetId>, StoreError>;
}

/// Cycle-safe dependency walk shared by the store implementations
///
/// `direct` yields the direct references of a stored asset, or `None` if
/// the asset is not stored (a dangling reference, reported but not expanded).
pub(crate) fn walk_dependencies<F>(root: &AssetId, recursive: bool, mut direct: F) -> Vec<AssetId>
where
    F: FnMut(&AssetId) -> Option<Vec<AssetId>>,
{
    let mut seen: IndexSet<AssetId> = IndexSet::new();
    seen.insert(root.clone());

    // Stack of pending reference lists, consumed front to back so the
    // result is a pre-order walk in declaration order.
    let mut stack: Vec<std::vec::IntoIter<AssetId>> =
        vec![direct(root).unwrap_or_default().into_iter()];

    while let Some(frame) = stack.last_mut() {
        let Some(next) = frame.next() else {
            stack.pop();
            continue;
        };
        if !seen.insert(next.clone()) {
            continue;
        }
        if recursive {
            if let Some(children) = direct(&next) {
                stack.push(children.into_iter());
            }
        }
    }

    seen.into_iter().skip(1).collect()
}

/// Errors raised by asset stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing stored at identifier
    #[error("asset not found: {0}")]
    NotFound(AssetId),

    /// Copy destination taken
    #[error("asset already exists: {0}")]
    AlreadyExists(AssetId),

    /// Folder missing
    #[error("folder not found: '{0}'")]
    FolderNotFound(AssetPath),

    /// Folder already present
    #[error("folder already exists: '{0}'")]
    FolderExists(AssetPath),

    /// Document does not fit the kind implied by the extension
    #[error("cannot store {document} document as {kind} asset {id}")]
    KindMismatch {
        id: AssetId,
        kind: AssetKind,
        document: &'static str,
    },

    /// Stored bytes could not be decoded
    #[error("malformed asset {id}: {source}")]
    Malformed {
        id: AssetId,
        #[source]
        source: serde_json::Error,
    },

    /// Copy failed inside the store
    #[error("copy {src} -> {dst} failed: {reason}")]
    CopyFailed {
        src: AssetId,
        dst: AssetId,
        reason: String,
    },

    /// IO error on a backing file
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid path
    #[error("path error: {0}")]
    Path(#[from] PathError),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Kind mismatch between `doc` and the kind of `id`
    pub(crate) fn kind_mismatch(id: &AssetId, doc: &AssetDocument) -> Self {
        let document = match doc {
            AssetDocument::Model(_) => "model",
            AssetDocument::Material(_) => "material",
            AssetDocument::Blob(_) => "blob",
        };
        Self::KindMismatch {
            id: id.clone(),
            kind: id.kind(),
            document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn id(s: &str) -> AssetId {
        AssetId::new(s).unwrap()
    }

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> HashMap<AssetId, Vec<AssetId>> {
        let mut g: HashMap<AssetId, Vec<AssetId>> =
            nodes.iter().map(|n| (id(n), Vec::new())).collect();
        for (from, to) in edges {
            g.entry(id(from)).or_default().push(id(to));
        }
        g
    }

    fn walk(g: &HashMap<AssetId, Vec<AssetId>>, root: &str, recursive: bool) -> Vec<String> {
        walk_dependencies(&id(root), recursive, |node| g.get(node).cloned())
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn walk_pre_order_declaration_order() {
        let g = graph(
            &["t1.png", "t2.png"],
            &[
                ("a.model", "b.mat"),
                ("a.model", "c.mat"),
                ("b.mat", "t1.png"),
                ("c.mat", "t2.png"),
            ],
        );
        assert_eq!(walk(&g, "a.model", true), vec!["b.mat", "t1.png", "c.mat", "t2.png"]);
        assert_eq!(walk(&g, "a.model", false), vec!["b.mat", "c.mat"]);
    }

    #[test]
    fn walk_terminates_on_cycles_and_dedupes() {
        let g = graph(
            &["t.png"],
            &[
                ("a.model", "b.mat"),
                ("a.model", "b.mat"),
                ("a.model", "a.model"),
                ("b.mat", "a.model"),
                ("b.mat", "t.png"),
            ],
        );
        assert_eq!(walk(&g, "a.model", true), vec!["b.mat", "t.png"]);
    }

    #[test]
    fn walk_reports_dangling_without_expanding() {
        let g = graph(&[], &[("a.model", "gone.mat")]);
        assert_eq!(walk(&g, "a.model", true), vec!["gone.mat"]);
    }

    #[test]
    fn error_display() {
        let err = StoreError::NotFound(id("Assets/x.mat"));
        assert_eq!(err.to_string(), "asset not found: Assets/x.mat");
        let err = StoreError::kind_mismatch(&id("a.png"), &AssetDocument::Material(Default::default()));
        assert_eq!(err.to_string(), "cannot store material document as texture asset a.png");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn node(i: usize) -> String {
            format!("n{i}.mat")
        }

        proptest! {
            #[test]
            fn walk_reports_reachable_once(
                edges in proptest::collection::vec((0usize..8, 0usize..10), 0..24),
                root in 0usize..8,
            ) {
                // Nodes 8 and 9 are never stored.
                let stored: Vec<String> = (0..8).map(node).collect();
                let stored: Vec<&str> = stored.iter().map(String::as_str).collect();
                let names: Vec<(String, String)> =
                    edges.iter().map(|(a, b)| (node(*a), node(*b))).collect();
                let pairs: Vec<(&str, &str)> =
                    names.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
                let g = graph(&stored, &pairs);

                let root = node(root);
                let all = walk(&g, &root, true);
                let direct = walk(&g, &root, false);

                prop_assert!(!all.contains(&root));
                let mut unique = all.clone();
                unique.sort();
                unique.dedup();
                prop_assert_eq!(unique.len(), all.len());
                prop_assert!(direct.iter().all(|d| all.contains(d)));

                // Closed under the edge relation for every stored node reached.
                for (from, to) in &pairs {
                    if (all.iter().any(|a| a == from) || *from == root) && *to != root {
                        prop_assert!(all.iter().any(|a| a == to), "{} -> {} missing", from, to);
                    }
                }
            }
        }
    }
}
