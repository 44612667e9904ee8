//! Relo Asset Layer
//!
//! Identifiers, documents and the store contract shared by every engine.
//!
//! # Core Concepts
//!
//! - [`AssetId`]: Stable identifier of a stored asset (`Assets/Hero.model`)
//! - [`AssetPath`]: Folder inside a store
//! - [`AssetKind`]: Classification by extension (model, material, texture, ...)
//! - [`AssetDocument`]: Loaded content; models and materials carry references
//! - [`AssetHandle<T>`]: Typed live reference to a loaded asset
//! - [`AssetStore`]: External storage + dependency resolution capability
//!
//! # Example
//!
//! ```rust,ignore
//! use relo_asset::{AssetHandle, AssetId, MaterialAsset, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let id = AssetId::new("Assets/Hero.mat")?;
//! let material = AssetHandle::<MaterialAsset>::load(&store, &id)?;
//! println!("{} binds {:?}", material.id(), material.content().texture("_MainTex"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod document;
mod fs;
mod handle;
mod hash;
mod kind;
mod memory;
mod path;
mod store;
mod transform;

pub use document::{AssetDocument, Blob, MaterialDoc, MaterialProperty, ModelDoc, Renderer};
pub use fs::FsStore;
pub use handle::{
    AnyAsset, AssetClass, AssetHandle, BlobAsset, HandleError, MaterialAsset, ModelAsset,
};
pub use hash::{ContentHash, HashError};
pub use kind::{is_image_extension, AssetKind, IMAGE_EXTENSIONS};
pub use memory::MemoryStore;
pub use path::{AssetId, AssetPath, PathError};
pub use store::{AssetStore, StoreError};
pub use transform::Transform;

/// Re-exported math types used by [`Transform`]
pub use glam::{Quat, Vec3};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
