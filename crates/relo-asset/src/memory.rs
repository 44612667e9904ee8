//! In-memory asset store
//!
//! [`MemoryStore`] is a complete [`AssetStore`] kept in ordered maps. It is
//! the substitute store used by tests and by hosts that stage edits before
//! flushing them elsewhere.

use crate::document::AssetDocument;
use crate::hash::{ContentHash, HashError};
use crate::path::{AssetId, AssetPath};
use crate::store::{walk_dependencies, AssetStore, StoreError};
use std::collections::{BTreeMap, BTreeSet};

/// Asset store backed by ordered in-memory maps
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    assets: BTreeMap<AssetId, AssetDocument>,
    folders: BTreeSet<AssetPath>,
    copies: usize,
    failing_copies: BTreeSet<AssetId>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `doc` at `id`, creating missing folders on the way
    ///
    /// Fixture-style seeding; engines go through [`AssetStore`] instead.
    ///
    /// # Errors
    /// Returns `StoreError::KindMismatch` if `doc` does not fit the kind of `id`
    pub fn insert(&mut self, id: AssetId, doc: AssetDocument) -> Result<(), StoreError> {
        if !doc.fits_kind(id.kind()) {
            return Err(StoreError::kind_mismatch(&id, &doc));
        }
        let folder = id.folder();
        for (parent, segment) in folder.ancestry() {
            self.folders.insert(parent.child(segment));
        }
        self.assets.insert(id, doc);
        Ok(())
    }

    /// Make every later copy whose source is `src` fail
    pub fn fail_copy_of(&mut self, src: AssetId) {
        self.failing_copies.insert(src);
    }

    /// Clear injected copy failures
    pub fn clear_copy_failures(&mut self) {
        self.failing_copies.clear();
    }

    /// Number of successful copies performed so far
    #[inline]
    #[must_use]
    pub fn copy_count(&self) -> usize {
        self.copies
    }

    /// Number of stored assets
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the store holds no assets
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Stored identifiers in order
    pub fn ids(&self) -> impl Iterator<Item = &AssetId> {
        self.assets.keys()
    }

    /// Stored identifiers directly inside `folder`
    #[must_use]
    pub fn ids_in(&self, folder: &AssetPath) -> Vec<&AssetId> {
        self.assets.keys().filter(|id| &id.folder() == folder).collect()
    }

    /// Content hash of every stored asset
    ///
    /// # Errors
    /// Returns error if a document fails to serialize
    pub fn snapshot(&self) -> Result<BTreeMap<AssetId, ContentHash>, HashError> {
        self.assets
            .iter()
            .map(|(id, doc)| Ok((id.clone(), doc.content_hash()?)))
            .collect()
    }
}

impl AssetStore for MemoryStore {
    fn exists(&self, id: &AssetId) -> bool {
        self.assets.contains_key(id)
    }

    fn folder_exists(&self, folder: &AssetPath) -> bool {
        folder.is_root() || self.folders.contains(folder)
    }

    fn create_folder(&mut self, parent: &AssetPath, name: &str) -> Result<AssetPath, StoreError> {
        if !self.folder_exists(parent) {
            return Err(StoreError::FolderNotFound(parent.clone()));
        }
        let folder: AssetPath = format!("{parent}/{name}").parse()?;
        if folder.parent().as_ref() != Some(parent) {
            return Err(crate::path::PathError::InvalidSegment(name.to_string()).into());
        }
        if !self.folders.insert(folder.clone()) {
            return Err(StoreError::FolderExists(folder));
        }
        Ok(folder)
    }

    fn copy(&mut self, src: &AssetId, dst: &AssetId) -> Result<(), StoreError> {
        let doc = self
            .assets
            .get(src)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(src.clone()))?;
        if self.failing_copies.contains(src) {
            return Err(StoreError::CopyFailed {
                src: src.clone(),
                dst: dst.clone(),
                reason: "injected failure".to_string(),
            });
        }
        if self.assets.contains_key(dst) {
            return Err(StoreError::AlreadyExists(dst.clone()));
        }
        if !self.folder_exists(&dst.folder()) {
            return Err(StoreError::FolderNotFound(dst.folder()));
        }
        if !doc.fits_kind(dst.kind()) {
            return Err(StoreError::kind_mismatch(dst, &doc));
        }
        self.assets.insert(dst.clone(), doc);
        self.copies += 1;
        Ok(())
    }

    fn load(&self, id: &AssetId) -> Result<AssetDocument, StoreError> {
        self.assets
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn save(&mut self, id: &AssetId, doc: &AssetDocument) -> Result<(), StoreError> {
        if !doc.fits_kind(id.kind()) {
            return Err(StoreError::kind_mismatch(id, doc));
        }
        if !self.folder_exists(&id.folder()) {
            return Err(StoreError::FolderNotFound(id.folder()));
        }
        self.assets.insert(id.clone(), doc.clone());
        Ok(())
    }

    fn list_dependencies(&self, id: &AssetId, recursive: bool) -> Result<Vec<AssetId>, StoreError> {
        if !self.assets.contains_key(id) {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(walk_dependencies(id, recursive, |node| {
            self.assets
                .get(node)
                .map(|doc| doc.references().into_iter().cloned().collect())
        }))
    }
}
