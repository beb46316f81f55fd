//! Linear undo/redo history of committed page states.

use crate::element::ElementInstance;
use std::sync::Arc;
use thiserror::Error;

/// Default maximum number of entries kept in the log.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// An immutable copy of the page's element list at one committed moment.
pub type HistorySnapshot = Arc<[ElementInstance]>;

/// History boundary errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NoOlderState,
    #[error("Nothing to redo")]
    NoNewerState,
}

/// Undo/redo log.
///
/// Invariant: `entries` is never empty and `cursor < entries.len()`.
/// Committing while the cursor is behind the newest entry drops the
/// entries after it; there is no redo tree.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: Vec<HistorySnapshot>,
    cursor: usize,
    max_entries: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(Vec::<ElementInstance>::new())
    }
}

impl HistoryLog {
    /// Create a log seeded with an initial state.
    pub fn new(initial: impl Into<HistorySnapshot>) -> Self {
        Self::with_capacity(initial, DEFAULT_MAX_HISTORY)
    }

    /// Create a log that keeps at most `max_entries` states.
    pub fn with_capacity(initial: impl Into<HistorySnapshot>, max_entries: usize) -> Self {
        Self {
            entries: vec![initial.into()],
            cursor: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// Record a new state as the newest entry.
    pub fn commit(&mut self, snapshot: impl Into<HistorySnapshot>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot.into());

        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
        log::debug!("History commit: {} entries", self.entries.len());
    }

    /// Step back one entry and return it.
    pub fn undo(&mut self) -> Result<&HistorySnapshot, HistoryError> {
        if !self.can_undo() {
            return Err(HistoryError::NoOlderState);
        }
        self.cursor -= 1;
        Ok(&self.entries[self.cursor])
    }

    /// Step forward one entry and return it.
    pub fn redo(&mut self) -> Result<&HistorySnapshot, HistoryError> {
        if !self.can_redo() {
            return Err(HistoryError::NoNewerState);
        }
        self.cursor += 1;
        Ok(&self.entries[self.cursor])
    }

    /// Discard all history and start over from `initial`.
    pub fn reset(&mut self, initial: impl Into<HistorySnapshot>) {
        self.entries.clear();
        self.entries.push(initial.into());
        self.cursor = 0;
    }

    /// The entry at the cursor.
    pub fn current(&self) -> &HistorySnapshot {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; the log holds at least its initial entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[HistorySnapshot] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ComponentRegistry;
    use kurbo::Point;

    fn page(xs: &[f64]) -> Vec<ElementInstance> {
        let registry = ComponentRegistry::with_builtins();
        let button = registry.find_by_name("Button").unwrap();
        xs.iter()
            .map(|&x| registry.instantiate(button, Point::new(x, 0.0), None))
            .collect()
    }

    #[test]
    fn test_new_log() {
        let log = HistoryLog::default();
        assert_eq!(log.len(), 1);
        assert_eq!(log.cursor(), 0);
        assert!(log.current().is_empty());
        assert!(!log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn test_undo_redo_at_boundaries() {
        let mut log = HistoryLog::default();
        assert_eq!(log.undo().unwrap_err(), HistoryError::NoOlderState);
        assert_eq!(log.redo().unwrap_err(), HistoryError::NoNewerState);
        assert_eq!(log.cursor(), 0);
    }

    #[test]
    fn test_commit_undo_redo() {
        let a = page(&[1.0]);
        let b = page(&[1.0, 2.0]);
        let mut log = HistoryLog::default();
        log.commit(a.clone());
        log.commit(b.clone());
        assert_eq!(log.len(), 3);
        assert_eq!(log.cursor(), 2);

        assert_eq!(&log.undo().unwrap()[..], &a[..]);
        assert_eq!(&log.undo().unwrap()[..], &[] as &[ElementInstance]);
        assert!(!log.can_undo());
        assert_eq!(&log.redo().unwrap()[..], &a[..]);
        assert_eq!(&log.redo().unwrap()[..], &b[..]);
        assert!(!log.can_redo());
    }

    #[test]
    fn test_commit_prunes_redo_branch() {
        let a = page(&[1.0]);
        let b = page(&[2.0]);
        let c = page(&[3.0]);
        let mut log = HistoryLog::default();
        log.commit(a.clone());
        log.commit(b);
        log.undo().unwrap();
        log.commit(c.clone());

        let entries: Vec<Vec<ElementInstance>> = log.entries().iter().map(|e| e.to_vec()).collect();
        assert_eq!(entries, vec![Vec::new(), a, c]);
        assert_eq!(log.redo().unwrap_err(), HistoryError::NoNewerState);
    }

    #[test]
    fn test_reset() {
        let mut log = HistoryLog::default();
        log.commit(page(&[1.0]));
        log.commit(page(&[2.0]));
        let loaded = page(&[5.0, 6.0]);
        log.reset(loaded.clone());
        assert_eq!(log.len(), 1);
        assert_eq!(log.cursor(), 0);
        assert_eq!(&log.current()[..], &loaded[..]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut log = HistoryLog::with_capacity(Vec::<ElementInstance>::new(), 3);
        for i in 0..5 {
            log.commit(page(&[i as f64]));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.cursor(), 2);
        assert_eq!(log.current()[0].position().x, 4.0);
        log.undo().unwrap();
        log.undo().unwrap();
        assert!(!log.can_undo());
        assert_eq!(log.current()[0].position().x, 2.0);
    }
}
