//! Dirty-state tracking.
//!
//! [`ChangeTracker`] keeps the last known-good snapshot of the document (the
//! initially supplied path, replaced on every successful save) and the
//! revision that snapshot carries. Dirty detection is a revision-counter
//! comparison, not a structural diff: the document bumps its revision on
//! every effective mutation, so `recheck` is O(1).

use trailmap_core::LearningPath;

#[derive(Debug)]
pub struct ChangeTracker {
    /// Last known-good snapshot: the initial document until the first
    /// successful save, the saved document after.
    baseline: LearningPath,
    baseline_revision: u64,
    dirty: bool,
}

impl ChangeTracker {
    pub fn new(path: &LearningPath) -> Self {
        ChangeTracker {
            baseline: path.clone(),
            baseline_revision: path.revision(),
            dirty: false,
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Recomputes the dirty flag from the live document's revision. Returns
    /// the new flag value when it changed, `None` when it stayed put -- the
    /// session only announces transitions.
    pub fn recheck(&mut self, path: &LearningPath) -> Option<bool> {
        let dirty = path.revision() != self.baseline_revision;
        if dirty != self.dirty {
            self.dirty = dirty;
            tracing::debug!(dirty, "dirty state changed");
            Some(dirty)
        } else {
            None
        }
    }

    /// Records a successful save: the live document becomes the new
    /// baseline and the dirty flag clears.
    pub fn mark_saved(&mut self, path: &LearningPath) {
        self.baseline = path.clone();
        self.baseline_revision = path.revision();
        self.dirty = false;
    }

    /// A copy of the last known-good snapshot, for `reset`/`force_restore`.
    /// The copy carries the baseline revision, so a restored document
    /// compares clean.
    pub fn baseline(&self) -> LearningPath {
        self.baseline.clone()
    }

    /// Clears the dirty flag after a restore.
    pub fn mark_restored(&mut self) {
        self.dirty = false;
    }
}
