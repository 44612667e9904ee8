//! Explicit undo log
//!
//! Edits are recorded at checkpoints into named groups. A group is the unit
//! of undo and redo: creations, destructions and modifications recorded
//! between [`UndoLog::begin_group`] and [`UndoLog::commit`] are reverted
//! together, in reverse recording order.
//!
//! Checkpoints:
//! - [`UndoLog::record_created`] once a new node is fully set up
//! - [`UndoLog::record_destroyed`] right before a node is destroyed
//! - [`UndoLog::record_modified`] right before an existing node changes

use crate::error::SceneError;
use crate::graph::{SceneGraph, Subtree};
use crate::node::{NodeId, SceneNode};

/// One recorded scene edit
#[derive(Debug, Clone, PartialEq)]
pub enum UndoRecord {
    /// Node created; the subtree as it stood when recorded
    Created(Subtree),
    /// Node about to be destroyed
    Destroyed(Subtree),
    /// Node state before and after a change (`after` is set on commit)
    Modified {
        before: SceneNode,
        after: Option<SceneNode>,
    },
}

/// Records reverted and re-applied together
#[derive(Debug, Clone, PartialEq)]
pub struct UndoGroup {
    pub label: String,
    pub records: Vec<UndoRecord>,
}

/// Linear undo/redo history of record groups
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    groups: Vec<UndoGroup>,
    cursor: usize,
    open: Option<UndoGroup>,
}

impl UndoLog {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new group
    ///
    /// # Errors
    /// Returns `SceneError::GroupOpen` if a group is already open
    pub fn begin_group(&mut self, label: impl Into<String>) -> Result<(), SceneError> {
        if let Some(open) = &self.open {
            return Err(SceneError::GroupOpen(open.label.clone()));
        }
        self.open = Some(UndoGroup {
            label: label.into(),
            records: Vec::new(),
        });
        Ok(())
    }

    fn open_mut(&mut self) -> Result<&mut UndoGroup, SceneError> {
        self.open.as_mut().ok_or(SceneError::NoOpenGroup)
    }

    /// Record that `id` was created
    ///
    /// # Errors
    /// Returns error if no group is open or `id` is not in `scene`
    pub fn record_created(&mut self, scene: &SceneGraph, id: NodeId) -> Result<(), SceneError> {
        let subtree = scene.subtree(id)?;
        self.open_mut()?.records.push(UndoRecord::Created(subtree));
        Ok(())
    }

    /// Record that `id` is about to be destroyed
    ///
    /// # Errors
    /// Returns error if no group is open or `id` is not in `scene`
    pub fn record_destroyed(&mut self, scene: &SceneGraph, id: NodeId) -> Result<(), SceneError> {
        let subtree = scene.subtree(id)?;
        self.open_mut()?.records.push(UndoRecord::Destroyed(subtree));
        Ok(())
    }

    /// Record the state of `id` before it is modified
    ///
    /// # Errors
    /// Returns error if no group is open or `id` is not in `scene`
    pub fn record_modified(&mut self, scene: &SceneGraph, id: NodeId) -> Result<(), SceneError> {
        let before = scene.node(id).cloned().ok_or(SceneError::NodeNotFound(id))?;
        self.open_mut()?.records.push(UndoRecord::Modified { before, after: None });
        Ok(())
    }

    /// Close the open group and append it to the history
    ///
    /// Captures the final state of modified nodes and discards any redo
    /// history. Empty groups are dropped. Returns the number of records.
    ///
    /// # Errors
    /// Returns `SceneError::NoOpenGroup` if no group is open
    pub fn commit(&mut self, scene: &SceneGraph) -> Result<usize, SceneError> {
        let mut group = self.open.take().ok_or(SceneError::NoOpenGroup)?;
        for record in &mut group.records {
            if let UndoRecord::Modified { before, after } = record {
                *after = scene.node(before.id).cloned();
            }
        }
        let count = group.records.len();
        if count > 0 {
            self.groups.truncate(self.cursor);
            tracing::debug!("Committed undo group '{}' ({} records)", group.label, count);
            self.groups.push(group);
            self.cursor = self.groups.len();
        }
        Ok(count)
    }

    /// Drop the open group without recording it
    pub fn abandon(&mut self) -> Option<UndoGroup> {
        self.open.take()
    }

    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.groups.len()
    }

    /// Committed groups, oldest first (including undone ones)
    #[inline]
    #[must_use]
    pub fn groups(&self) -> &[UndoGroup] {
        &self.groups
    }

    /// Revert the most recent group; `Ok(false)` if there is none
    ///
    /// # Errors
    /// Returns error if the scene no longer matches the recorded state
    pub fn undo(&mut self, scene: &mut SceneGraph) -> Result<bool, SceneError> {
        if let Some(open) = &self.open {
            return Err(SceneError::GroupOpen(open.label.clone()));
        }
        if !self.can_undo() {
            return Ok(false);
        }
        let group = &self.groups[self.cursor - 1];
        for record in group.records.iter().rev() {
            match record {
                UndoRecord::Created(subtree) => {
                    if scene.contains(subtree.root) {
                        scene.destroy(subtree.root)?;
                    }
                }
                UndoRecord::Destroyed(subtree) => {
                    scene.restore(subtree.clone())?;
                }
                UndoRecord::Modified { before, .. } => scene.apply_state(before)?,
            }
        }
        tracing::debug!("Undid '{}'", group.label);
        self.cursor -= 1;
        Ok(true)
    }

    /// Re-apply the most recently undone group; `Ok(false)` if there is none
    ///
    /// # Errors
    /// Returns error if the scene no longer matches the recorded state
    pub fn redo(&mut self, scene: &mut SceneGraph) -> Result<bool, SceneError> {
        if let Some(open) = &self.open {
            return Err(SceneError::GroupOpen(open.label.clone()));
        }
        if !self.can_redo() {
            return Ok(false);
        }
        let group = &self.groups[self.cursor];
        for record in &group.records {
            match record {
                UndoRecord::Created(subtree) => {
                    scene.restore(subtree.clone())?;
                }
                UndoRecord::Destroyed(subtree) => {
                    scene.destroy(subtree.root)?;
                }
                UndoRecord::Modified { after, .. } => {
                    if let Some(after) = after {
                        scene.apply_state(after)?;
                    }
                }
            }
        }
        tracing::debug!("Redid '{}'", group.label);
        self.cursor += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use relo_asset::Transform;

    /// Root with children A, Target, B; returns (scene, root, target)
    fn scene() -> (SceneGraph, NodeId, NodeId) {
        let mut scene = SceneGraph::new();
        let root = scene.create_node("Root", None).unwrap();
        scene.create_node("A", Some(root)).unwrap();
        let target = scene.create_node("Target", Some(root)).unwrap();
        scene.create_node("Leaf", Some(target)).unwrap();
        scene.create_node("B", Some(root)).unwrap();
        (scene, root, target)
    }

    fn names(scene: &SceneGraph, parent: NodeId) -> Vec<String> {
        scene
            .children(parent)
            .iter()
            .map(|c| scene.node(*c).unwrap().name.clone())
            .collect()
    }

    /// Create a replacement under `root`, then destroy `target`
    fn swap(scene: &mut SceneGraph, log: &mut UndoLog, root: NodeId, target: NodeId) -> NodeId {
        log.begin_group("Replace").unwrap();
        let created = scene.create_node("New", None).unwrap();
        scene.set_parent(created, Some(root), true).unwrap();
        log.record_created(scene, created).unwrap();
        log.record_destroyed(scene, target).unwrap();
        scene.destroy(target).unwrap();
        log.commit(scene).unwrap();
        created
    }

    #[test]
    fn records_require_open_group() {
        let (scene, _, target) = scene();
        let mut log = UndoLog::new();
        assert_eq!(
            log.record_destroyed(&scene, target),
            Err(SceneError::NoOpenGroup)
        );
        log.begin_group("One").unwrap();
        assert!(matches!(log.begin_group("Two"), Err(SceneError::GroupOpen(_))));
        assert!(log.abandon().is_some());
        assert!(!log.is_open());
    }

    #[test]
    fn undo_restores_destroyed_and_removes_created() {
        let (mut scene, root, target) = scene();
        let mut log = UndoLog::new();
        let created = swap(&mut scene, &mut log, root, target);
        assert_eq!(names(&scene, root), vec!["A", "B", "New"]);

        assert!(log.undo(&mut scene).unwrap());
        assert!(!scene.contains(created));
        assert_eq!(names(&scene, root), vec!["A", "Target", "B"]);
        assert_eq!(names(&scene, target), vec!["Leaf"]);
        assert!(!log.undo(&mut scene).unwrap());
    }

    #[test]
    fn redo_reapplies_group() {
        let (mut scene, root, target) = scene();
        let mut log = UndoLog::new();
        let created = swap(&mut scene, &mut log, root, target);

        log.undo(&mut scene).unwrap();
        assert!(log.redo(&mut scene).unwrap());
        assert!(scene.contains(created));
        assert!(!scene.contains(target));
        assert_eq!(names(&scene, root), vec!["A", "B", "New"]);
        assert!(!log.can_redo());
    }

    #[test]
    fn new_group_discards_redo_history() {
        let (mut scene, root, target) = scene();
        let mut log = UndoLog::new();
        swap(&mut scene, &mut log, root, target);
        log.undo(&mut scene).unwrap();

        log.begin_group("Rename").unwrap();
        log.record_modified(&scene, root).unwrap();
        scene.rename(root, "World").unwrap();
        log.commit(&scene).unwrap();

        assert_eq!(log.groups().len(), 1);
        assert_eq!(log.groups()[0].label, "Rename");
        assert!(!log.can_redo());
    }

    #[test]
    fn modified_round_trip() {
        let (mut scene, root, _) = scene();
        let mut log = UndoLog::new();
        log.begin_group("Move").unwrap();
        log.record_modified(&scene, root).unwrap();
        scene
            .set_local(root, Transform::from_translation(Vec3::new(0.0, 4.0, 0.0)))
            .unwrap();
        scene.rename(root, "Moved").unwrap();
        assert_eq!(log.commit(&scene).unwrap(), 1);

        log.undo(&mut scene).unwrap();
        assert_eq!(scene.node(root).unwrap().name, "Root");
        assert_eq!(scene.node(root).unwrap().local, Transform::IDENTITY);

        log.redo(&mut scene).unwrap();
        assert_eq!(scene.node(root).unwrap().name, "Moved");
    }

    #[test]
    fn empty_group_is_dropped() {
        let (scene, _, _) = scene();
        let mut log = UndoLog::new();
        log.begin_group("Nothing").unwrap();
        assert_eq!(log.commit(&scene).unwrap(), 0);
        assert!(!log.can_undo());
    }
}
