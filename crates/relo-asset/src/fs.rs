//! Directory-backed asset store
//!
//! [`FsStore`] maps every identifier to a file below a root directory.
//! Models and materials are JSON documents; everything else is copied
//! byte-for-byte and never parsed.

use crate::document::AssetDocument;
use crate::path::{AssetId, AssetPath};
use crate::store::{walk_dependencies, AssetStore, StoreError};
use std::path::{Path, PathBuf};

/// Asset store rooted at a directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store at `root`
    ///
    /// # Errors
    /// Returns `StoreError::Io` if `root` is not an existing directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let meta = std::fs::metadata(&root).map_err(|e| StoreError::io_error(&root, e))?;
        if !meta.is_dir() {
            return Err(StoreError::io_error(
                &root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "store root is not a directory"),
            ));
        }
        Ok(Self { root })
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, id: &AssetId) -> PathBuf {
        id.as_str().split('/').fold(self.root.clone(), |p, seg| p.join(seg))
    }

    fn folder_path(&self, folder: &AssetPath) -> PathBuf {
        folder.iter().fold(self.root.clone(), |p, seg| p.join(seg))
    }
}

impl AssetStore for FsStore {
    fn exists(&self, id: &AssetId) -> bool {
        self.file_path(id).is_file()
    }

    fn folder_exists(&self, folder: &AssetPath) -> bool {
        self.folder_path(folder).is_dir()
    }

    fn create_folder(&mut self, parent: &AssetPath, name: &str) -> Result<AssetPath, StoreError> {
        if !self.folder_exists(parent) {
            return Err(StoreError::FolderNotFound(parent.clone()));
        }
        let folder: AssetPath = format!("{parent}/{name}").parse()?;
        if folder.parent().as_ref() != Some(parent) {
            return Err(crate::path::PathError::InvalidSegment(name.to_string()).into());
        }
        let path = self.folder_path(&folder);
        match std::fs::create_dir(&path) {
            Ok(()) => Ok(folder),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StoreError::FolderExists(folder))
            }
            Err(e) => Err(StoreError::io_error(path, e)),
        }
    }

    fn copy(&mut self, src: &AssetId, dst: &AssetId) -> Result<(), StoreError> {
        if !self.exists(src) {
            return Err(StoreError::NotFound(src.clone()));
        }
        if self.exists(dst) {
            return Err(StoreError::AlreadyExists(dst.clone()));
        }
        if !self.folder_exists(&dst.folder()) {
            return Err(StoreError::FolderNotFound(dst.folder()));
        }
        if src.kind() != dst.kind() {
            return Err(StoreError::CopyFailed {
                src: src.clone(),
                dst: dst.clone(),
                reason: format!("kind changes from {} to {}", src.kind(), dst.kind()),
            });
        }
        let to = self.file_path(dst);
        std::fs::copy(self.file_path(src), &to).map_err(|e| StoreError::io_error(to, e))?;
        Ok(())
    }

    fn load(&self, id: &AssetId) -> Result<AssetDocument, StoreError> {
        let path = self.file_path(id);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.clone()))
            }
            Err(e) => return Err(StoreError::io_error(path, e)),
        };
        AssetDocument::decode(id.kind(), &bytes).map_err(|source| StoreError::Malformed {
            id: id.clone(),
            source,
        })
    }

    fn save(&mut self, id: &AssetId, doc: &AssetDocument) -> Result<(), StoreError> {
        if !doc.fits_kind(id.kind()) {
            return Err(StoreError::kind_mismatch(id, doc));
        }
        if !self.folder_exists(&id.folder()) {
            return Err(StoreError::FolderNotFound(id.folder()));
        }
        let bytes = doc.encode().map_err(|source| StoreError::Malformed {
            id: id.clone(),
            source,
        })?;
        let path = self.file_path(id);
        std::fs::write(&path, bytes).map_err(|e| StoreError::io_error(path, e))
    }

    fn list_dependencies(&self, id: &AssetId, recursive: bool) -> Result<Vec<AssetId>, StoreError> {
        if !id.kind().is_structured() {
            if self.exists(id) {
                return Ok(Vec::new());
            }
            return Err(StoreError::NotFound(id.clone()));
        }
        // Fail on the root itself; below it, unreadable documents are leaves.
        self.load(id)?;
        Ok(walk_dependencies(id, recursive, |node| {
            if !node.kind().is_structured() {
                return self.exists(node).then(Vec::new);
            }
            match self.load(node) {
                Ok(doc) => Some(doc.references().into_iter().cloned().collect()),
                Err(StoreError::NotFound(_)) => None,
                Err(e) => {
                    tracing::warn!("Skipping dependencies of {}: {}", node, e);
                    None
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MaterialDoc, MaterialProperty};

    fn id(s: &str) -> AssetId {
        AssetId::new(s).unwrap()
    }

    fn store() -> (tempfile::TempDir, FsStore) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Assets")).unwrap();
        let store = FsStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn open_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsStore::open(dir.path().join("missing")).is_err());
    }

    #[test]
    fn save_load_material_as_json() {
        let (dir, mut store) = store();
        let mat = AssetDocument::Material(MaterialDoc::default().with_property(
            "_MainTex",
            MaterialProperty::Texture(Some(id("Assets/Skin.png"))),
        ));
        store.save(&id("Assets/Hero.mat"), &mat).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("Assets").join("Hero.mat")).unwrap();
        assert!(raw.contains("Assets/Skin.png"));
        assert_eq!(store.load(&id("Assets/Hero.mat")).unwrap(), mat);
    }

    #[test]
    fn folders_and_copies() {
        let (dir, mut store) = store();
        store
            .save(&id("Assets/Skin.png"), &AssetDocument::blob(vec![1, 2, 3]))
            .unwrap();
        let exported = store
            .create_folder(&"Assets".parse::<AssetPath>().unwrap(), "Exported")
            .unwrap();
        assert!(store.folder_exists(&exported));
        assert!(matches!(
            store.create_folder(&"Assets".parse::<AssetPath>().unwrap(), "Exported"),
            Err(StoreError::FolderExists(_))
        ));

        let dst = exported.file("Skin.png").unwrap();
        store.copy(&id("Assets/Skin.png"), &dst).unwrap();
        assert_eq!(
            std::fs::read(dir.path().join("Assets/Exported/Skin.png")).unwrap(),
            vec![1, 2, 3]
        );
        assert!(matches!(
            store.copy(&id("Assets/Skin.png"), &dst),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn load_missing_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            store.load(&id("Assets/None.mat")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn malformed_material_is_reported() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("Assets/Broken.mat"), b"{").unwrap();
        assert!(matches!(
            store.load(&id("Assets/Broken.mat")),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn dependencies_follow_json_references() {
        let (_dir, mut store) = store();
        let mat = AssetDocument::Material(
            MaterialDoc::default()
                .with_shader(id("Assets/Lit.shader"))
                .with_property("_MainTex", MaterialProperty::Texture(Some(id("Assets/Skin.png")))),
        );
        store.save(&id("Assets/Hero.mat"), &mat).unwrap();
        store
            .save(&id("Assets/Skin.png"), &AssetDocument::blob(vec![0]))
            .unwrap();

        let deps: Vec<String> = store
            .list_dependencies(&id("Assets/Hero.mat"), true)
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(deps, vec!["Assets/Lit.shader", "Assets/Skin.png"]);
        assert!(store
            .list_dependencies(&id("Assets/Skin.png"), true)
            .unwrap()
            .is_empty());
    }
}
