//! Relo Scene Layer
//!
//! Hierarchy of placed nodes, prefab instancing and an explicit undo log.
//!
//! # Core Concepts
//!
//! - [`SceneGraph`]: Owns nodes and keeps parent/children links consistent
//! - [`SceneNode`]: Name, local [`Transform`](relo_asset::Transform), components
//! - [`Component`]: Mesh, material, behaviour and light records
//! - [`UndoLog`]: Grouped created/destroyed/modified records with undo and redo

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod graph;
mod node;
mod undo;

pub use error::SceneError;
pub use graph::{SceneGraph, Subtree};
pub use node::{Component, NodeId, SceneNode};
pub use undo::{UndoGroup, UndoLog, UndoRecord};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
