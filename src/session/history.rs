//! Bounded linear undo/redo history.
//!
//! Holds whole-timetable snapshots. A new edit clears the redo side, so
//! history never branches.

use std::collections::VecDeque;

use crate::models::Timetable;

/// Undo and redo stacks of timetable snapshots.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Timetable>,
    redo: Vec<Timetable>,
    limit: usize,
}

impl History {
    /// Creates an empty history keeping at most `limit` undo snapshots.
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Records the state before an edit and clears redo.
    pub fn record(&mut self, before: Timetable) {
        self.redo.clear();
        self.undo.push_back(before);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    /// Steps back: stores `current` for redo and returns the previous state.
    pub fn undo(&mut self, current: Timetable) -> Result<Timetable, Timetable> {
        match self.undo.pop_back() {
            Some(previous) => {
                self.redo.push(current);
                Ok(previous)
            }
            None => Err(current),
        }
    }

    /// Steps forward: stores `current` for undo and returns the next state.
    pub fn redo(&mut self, current: Timetable) -> Result<Timetable, Timetable> {
        match self.redo.pop() {
            Some(next) => {
                self.undo.push_back(current);
                while self.undo.len() > self.limit {
                    self.undo.pop_front();
                }
                Ok(next)
            }
            None => Err(current),
        }
    }

    /// Drops both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
