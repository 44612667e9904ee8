//! Relo Core - asset relocation and scene replacement
//!
//! The engines behind the editor tools:
//! - [`RelocationEngine`] copies an asset with its dependency closure into a
//!   new folder and rewrites the references inside the copies
//! - [`ReplacementEngine`] swaps scene nodes for instances of a model as one
//!   undoable step
//! - [`DependencyExplorer`] groups and filters dependency closures of
//!   selected assets and scene nodes for display
//!
//! Every engine receives its [`AssetStore`](relo_asset::AssetStore)
//! explicitly; nothing here keeps global state.
//!
//! # Example
//!
//! ```rust,ignore
//! use relo_core::prelude::*;
//!
//! let mut store = MemoryStore::new();
//! // ... seed the store ...
//! let root = AssetId::new("Assets/Hero.model")?;
//! let destination: AssetPath = "Assets/Exported".parse()?;
//!
//! let result = RelocationEngine::new(&mut store).relocate(&root, &destination)?;
//! println!("Copied {} files, skipped {}", result.copied.len(), result.skipped.len());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod closure;
pub mod config;
pub mod error;
pub mod explorer;
pub mod filter;
pub mod relocation;
pub mod replacement;

pub use closure::DependencyClosure;
pub use config::{CollisionPolicy, RelocationConfig, ReplaceOptions};
pub use error::CoreError;
pub use explorer::{DependencyExplorer, Exploration, Selection};
pub use filter::{FilterSpec, STANDARD_TOKENS, TEXTURE_TOKEN};
pub use relocation::{
    CopyOutcome, NameCollision, RelocationEngine, RelocationPlan, RelocationResult,
};
pub use replacement::ReplacementEngine;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Relo Core
    pub use crate::{
        CoreError, DependencyClosure, DependencyExplorer, FilterSpec, RelocationConfig,
        RelocationEngine, RelocationResult, ReplaceOptions, ReplacementEngine, Selection,
    };
    pub use relo_asset::{AssetId, AssetPath, AssetStore, MemoryStore};
    pub use relo_scene::{NodeId, SceneGraph, UndoLog};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
