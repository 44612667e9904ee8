//! Relocation engine
//!
//! Copies a root asset and its dependency closure into one destination
//! folder and rewrites the references inside the copies:
//!
//! 1. Resolve the closure and drop excluded kinds (scripts, shaders)
//! 2. Create the destination folder one segment at a time
//! 3. Copy the root, then every dependency, flattened by file name
//! 4. Rebind meshes, materials and texture properties in every model and
//!    material copy
//! 5. Save the copies that changed
//!
//! Copies never overwrite: an existing destination file is skipped, so
//! re-running an interrupted relocation resumes it. A destination file that
//! holds some other asset is reported as a name collision and left alone.

use crate::config::{CollisionPolicy, RelocationConfig};
use crate::error::CoreError;
use indexmap::IndexMap;
use relo_asset::{
    AnyAsset, AssetDocument, AssetHandle, AssetId, AssetPath, AssetStore, MaterialDoc, ModelDoc,
    StoreError,
};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Two sources in one closure that map to the same destination file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCollision {
    pub file_name: String,
    /// Source that owns the destination file, or the destination itself
    /// when an unrelated file is already there
    pub kept: AssetId,
    /// Source that is not copied
    pub dropped: AssetId,
}

impl Display for NameCollision {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} claimed by {} and {}; keeping the first",
            self.file_name, self.kept, self.dropped
        )
    }
}

/// Outcome of one idempotent copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// Destination already existed; nothing was written
    Skipped,
}

/// Everything a relocation would do, computed without touching the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationPlan {
    pub root: AssetId,
    pub destination: AssetPath,
    /// Original to destination identifier, root first then closure order
    pub mapping: IndexMap<AssetId, AssetId>,
    /// Dependencies left in place because of their kind
    pub excluded: Vec<AssetId>,
    pub collisions: Vec<NameCollision>,
}

impl RelocationPlan {
    /// Destination identifier of the root copy
    #[must_use]
    pub fn root_target(&self) -> Option<&AssetId> {
        self.mapping.get(&self.root)
    }
}

/// Result of one relocation run
#[derive(Debug, Clone, PartialEq)]
pub struct RelocationResult {
    /// Handle to the saved root copy
    pub root: AssetHandle<AnyAsset>,
    /// Original to destination identifier
    pub mapping: IndexMap<AssetId, AssetId>,
    /// Destination files written by this run
    pub copied: Vec<AssetId>,
    /// Destination files that already existed
    pub skipped: Vec<AssetId>,
    pub excluded: Vec<AssetId>,
    /// Copies whose references were rewritten and saved
    pub rewritten: Vec<AssetId>,
    pub collisions: Vec<NameCollision>,
}

impl RelocationResult {
    /// New identifier for `original`, if it was relocated
    #[must_use]
    pub fn relocated(&self, original: &AssetId) -> Option<&AssetId> {
        self.mapping.get(original)
    }
}

/// Relocates asset closures within one store
pub struct RelocationEngine<'s, S: AssetStore + ?Sized> {
    store: &'s mut S,
    config: RelocationConfig,
}

impl<'s, S: AssetStore + ?Sized> RelocationEngine<'s, S> {
    /// Create engine with default configuration
    pub fn new(store: &'s mut S) -> Self {
        Self {
            store,
            config: RelocationConfig::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: RelocationConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &RelocationConfig {
        &self.config
    }

    /// Compute the relocation of `root` into `destination` without mutating
    ///
    /// # Errors
    /// - `InvalidArguments` if `destination` is the store root
    /// - `ResolutionFailure` if the root or a dependency does not exist
    /// - `NameCollision` if collisions exist and the policy is `Fail`, or if
    ///   the root's destination already holds a different asset
    pub fn plan(&self, root: &AssetId, destination: &AssetPath) -> Result<RelocationPlan, CoreError> {
        if destination.is_root() {
            return Err(CoreError::invalid_arguments("destination folder is empty"));
        }
        if !self.store.exists(root) {
            return Err(CoreError::ResolutionFailure { id: root.clone() });
        }
        let dependencies = self
            .store
            .list_dependencies(root, true)
            .map_err(|e| match e {
                StoreError::NotFound(id) => CoreError::ResolutionFailure { id },
                other => other.into(),
            })?;

        let root_target = destination.file(root.file_name()).map_err(StoreError::from)?;
        let mut mapping = IndexMap::new();
        let mut claimed: IndexMap<String, AssetId> = IndexMap::new();
        claimed.insert(root.file_name().to_string(), root.clone());
        mapping.insert(root.clone(), root_target);

        let mut excluded = Vec::new();
        let mut collisions = Vec::new();
        for dependency in dependencies {
            if self.config.is_excluded(dependency.kind()) {
                excluded.push(dependency);
                continue;
            }
            if !self.store.exists(&dependency) {
                return Err(CoreError::ResolutionFailure { id: dependency });
            }
            let file_name = dependency.file_name().to_string();
            if let Some(kept) = claimed.get(&file_name) {
                collisions.push(NameCollision {
                    file_name,
                    kept: kept.clone(),
                    dropped: dependency,
                });
                continue;
            }
            let target = destination.file(&file_name).map_err(StoreError::from)?;
            claimed.insert(file_name, dependency.clone());
            mapping.insert(dependency, target);
        }

        // Destination files left by earlier runs must hold the same source.
        // Structured copies were rewritten without the foreign entries, so
        // those are found first and the check repeats once one is dropped.
        while let Some(collision) = self.find_foreign(&mapping)? {
            if &collision.dropped == root {
                return Err(CoreError::NameCollision(collision));
            }
            mapping.shift_remove(&collision.dropped);
            collisions.push(collision);
        }

        if self.config.collision_policy == CollisionPolicy::Fail {
            if let Some(first) = collisions.first() {
                return Err(CoreError::NameCollision(first.clone()));
            }
        }

        Ok(RelocationPlan {
            root: root.clone(),
            destination: destination.clone(),
            mapping,
            excluded,
            collisions,
        })
    }

    /// First mapping entry whose destination already holds another asset,
    /// raw files before structured documents
    fn find_foreign(
        &self,
        mapping: &IndexMap<AssetId, AssetId>,
    ) -> Result<Option<NameCollision>, CoreError> {
        let (raw, structured): (Vec<_>, Vec<_>) = mapping
            .iter()
            .filter(|(_, dst)| self.store.exists(dst))
            .partition(|(_, dst)| !dst.kind().is_structured());
        for (src, dst) in raw.into_iter().chain(structured) {
            if !self.holds_copy_of(src, dst, mapping)? {
                return Ok(Some(NameCollision {
                    file_name: dst.file_name().to_string(),
                    kept: dst.clone(),
                    dropped: src.clone(),
                }));
            }
        }
        Ok(None)
    }

    /// Whether `dst` holds `src`, as copied (and possibly rewritten) by an
    /// earlier run with the same `mapping`
    fn holds_copy_of(
        &self,
        src: &AssetId,
        dst: &AssetId,
        mapping: &IndexMap<AssetId, AssetId>,
    ) -> Result<bool, CoreError> {
        let existing = self.store.load(dst)?.content_hash()?;
        let mut source = self.store.load(src)?;
        if source.content_hash()? == existing {
            return Ok(true);
        }
        let rebound = match &mut source {
            AssetDocument::Model(model) => rebind_model(model, mapping),
            AssetDocument::Material(material) => rebind_material(material, mapping),
            AssetDocument::Blob(_) => false,
        };
        Ok(rebound && source.content_hash()? == existing)
    }

    /// Relocate `root` and its closure into `destination`
    ///
    /// Precondition failures leave the store untouched. A failure after
    /// copying started leaves the partial output in place; running the same
    /// relocation again skips what exists and finishes the rest.
    ///
    /// # Errors
    /// See [`RelocationEngine::plan`]; store failures are returned as-is.
    pub fn relocate(
        &mut self,
        root: &AssetId,
        destination: &AssetPath,
    ) -> Result<RelocationResult, CoreError> {
        let plan = self.plan(root, destination)?;
        tracing::info!(
            "Relocating {} into {} ({} assets, {} excluded)",
            root,
            destination,
            plan.mapping.len(),
            plan.excluded.len()
        );
        for collision in &plan.collisions {
            tracing::warn!("Name collision: {}", collision);
        }

        let mut copied = Vec::new();
        let mut skipped = Vec::new();
        let outcome = self.execute(&plan, &mut copied, &mut skipped);
        let rewritten = match outcome {
            Ok(rewritten) => rewritten,
            Err(e) => {
                tracing::error!(
                    "Relocation of {} aborted after {} copies: {}",
                    root,
                    copied.len(),
                    e
                );
                return Err(e);
            }
        };

        let root_target = plan
            .root_target()
            .cloned()
            .ok_or_else(|| CoreError::ResolutionFailure { id: root.clone() })?;
        let handle = AssetHandle::<AnyAsset>::load(&*self.store, &root_target)?;

        tracing::info!(
            "Relocated {} to {}: {} copied, {} skipped, {} rewritten",
            root,
            root_target,
            copied.len(),
            skipped.len(),
            rewritten.len()
        );
        Ok(RelocationResult {
            root: handle,
            mapping: plan.mapping,
            copied,
            skipped,
            excluded: plan.excluded,
            rewritten,
            collisions: plan.collisions,
        })
    }

    fn execute(
        &mut self,
        plan: &RelocationPlan,
        copied: &mut Vec<AssetId>,
        skipped: &mut Vec<AssetId>,
    ) -> Result<Vec<AssetId>, CoreError> {
        self.ensure_folder(&plan.destination)?;
        for (src, dst) in &plan.mapping {
            match self.copy_once(src, dst)? {
                CopyOutcome::Copied => copied.push(dst.clone()),
                CopyOutcome::Skipped => skipped.push(dst.clone()),
            }
        }
        if !self.config.rewrite_bindings {
            return Ok(Vec::new());
        }
        self.rewrite_copies(&plan.mapping)
    }

    /// Create every missing segment of `folder`, parent first
    fn ensure_folder(&mut self, folder: &AssetPath) -> Result<(), CoreError> {
        for (parent, segment) in folder.ancestry() {
            let current = parent.child(segment);
            if !self.store.folder_exists(&current) {
                self.store.create_folder(&parent, segment)?;
                tracing::debug!("Created folder {}", current);
            }
        }
        Ok(())
    }

    /// Copy unless the destination already exists
    fn copy_once(&mut self, src: &AssetId, dst: &AssetId) -> Result<CopyOutcome, CoreError> {
        if self.store.exists(dst) {
            tracing::debug!("Skipped {} (already at {})", src, dst);
            return Ok(CopyOutcome::Skipped);
        }
        self.store.copy(src, dst)?;
        tracing::debug!("Copied {} -> {}", src, dst);
        Ok(CopyOutcome::Copied)
    }

    /// Point every structured copy at the relocated assets, root first
    ///
    /// Copies left unrewritten by an interrupted run are picked up too, since
    /// every destination in `mapping` is revisited.
    fn rewrite_copies(
        &mut self,
        mapping: &IndexMap<AssetId, AssetId>,
    ) -> Result<Vec<AssetId>, CoreError> {
        let mut rewritten = Vec::new();
        for target in mapping.values() {
            if target.kind().is_structured() && self.rewrite_copy(target, mapping)? {
                rewritten.push(target.clone());
            }
        }
        Ok(rewritten)
    }

    /// Rebind the references of one copy and save it if anything changed
    fn rewrite_copy(
        &mut self,
        target: &AssetId,
        mapping: &IndexMap<AssetId, AssetId>,
    ) -> Result<bool, CoreError> {
        let mut document = self.store.load(target)?;
        let changed = match &mut document {
            AssetDocument::Model(model) => rebind_model(model, mapping),
            AssetDocument::Material(material) => rebind_material(material, mapping),
            AssetDocument::Blob(_) => false,
        };
        if changed {
            self.store.save(target, &document)?;
            tracing::debug!("Rewrote references in {}", target);
        }
        Ok(changed)
    }
}

/// Swap a reference for its relocated copy; true if it changed
fn rebind(slot: &mut AssetId, mapping: &IndexMap<AssetId, AssetId>) -> bool {
    match mapping.get(slot) {
        Some(new) if new != slot => {
            *slot = new.clone();
            true
        }
        _ => false,
    }
}

/// Rebind meshes, materials and behaviours of a model; true if any changed
fn rebind_model(model: &mut ModelDoc, mapping: &IndexMap<AssetId, AssetId>) -> bool {
    let mut changed = false;
    for renderer in &mut model.renderers {
        if let Some(mesh) = &mut renderer.mesh {
            changed |= rebind(mesh, mapping);
        }
        for material in renderer.materials.iter_mut().flatten() {
            changed |= rebind(material, mapping);
        }
    }
    for behaviour in &mut model.behaviours {
        changed |= rebind(behaviour, mapping);
    }
    changed
}

/// Rebind the shader and texture/environment properties of a material
///
/// Scalar, color and vector properties carry no reference and are left alone.
fn rebind_material(material: &mut MaterialDoc, mapping: &IndexMap<AssetId, AssetId>) -> bool {
    let mut changed = false;
    if let Some(shader) = &mut material.shader {
        changed |= rebind(shader, mapping);
    }
    for property in material.properties.values_mut() {
        if let Some(Some(texture)) = property.texture_slot_mut() {
            changed |= rebind(texture, mapping);
        }
    }
    changed
}
