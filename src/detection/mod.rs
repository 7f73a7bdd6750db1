//! Conflict detection rules and detector.
//!
//! Provides independent, composable rules (teacher clash, room clash,
//! practical batching, cohort clash, roster membership) and a detector
//! that runs them over a full slot set.
//!
//! # Usage
//!
//! ```
//! use timetable_edit::detection::detect_all;
//! use timetable_edit::models::{Day, Slot};
//!
//! let slots = vec![
//!     Slot::new("a", Day::Monday, 1, "SE", "A").with_teacher("Neha").with_room("R1"),
//!     Slot::new("b", Day::Monday, 1, "SE", "B").with_teacher("Neha").with_room("R2"),
//! ];
//! let report = detect_all(&slots, None);
//! assert_eq!(report.summary.errors, 1);
//! ```
//!
//! # Purity
//! Detection reads an immutable slice and returns fresh data. Running it
//! twice on the same input yields the same (type, affected slots) multiset;
//! conflict ids are positional and only meaningful within one report.

mod context;
mod engine;
pub mod rules;

pub use context::DetectionContext;
pub use engine::ConflictDetector;

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::models::{Conflict, ConflictSummary, ConflictType, Roster, Slot};

/// A detection rule.
///
/// Rules are independent: each sees the full slot set and reports its
/// own violations. They never mutate input.
pub trait ConflictRule: Send + Sync + Debug {
    /// Rule name (e.g., "TEACHER_CLASH").
    fn name(&self) -> &'static str;

    /// Conflict family this rule reports.
    fn conflict_type(&self) -> ConflictType;

    /// Returns every violation of this rule in `slots`.
    fn check(&self, slots: &[Slot], context: &DetectionContext<'_>) -> Vec<Conflict>;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Output of one detection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub conflicts: Vec<Conflict>,
    pub summary: ConflictSummary,
}

impl DetectionReport {
    /// Builds a report, numbering conflicts by position.
    pub fn from_conflicts(mut conflicts: Vec<Conflict>) -> Self {
        for (index, conflict) in conflicts.iter_mut().enumerate() {
            conflict.id = index;
        }
        let summary = ConflictSummary::from_conflicts(&conflicts);
        Self { conflicts, summary }
    }

    /// Whether no rule fired.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Whether nothing blocks a save.
    pub fn is_save_eligible(&self) -> bool {
        self.summary.is_save_eligible()
    }

    /// Conflicts that list the given slot.
    pub fn involving(&self, slot_id: &str) -> Vec<&Conflict> {
        self.conflicts.iter().filter(|c| c.involves(slot_id)).collect()
    }

    /// Error-severity conflicts.
    pub fn errors(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| c.is_error())
    }

    /// Order-independent view of the report: sorted (type, sorted slot ids).
    ///
    /// Two passes over the same timetable have equal fingerprints.
    pub fn fingerprint(&self) -> Vec<(ConflictType, Vec<String>)> {
        let mut entries: Vec<(ConflictType, Vec<String>)> = self
            .conflicts
            .iter()
            .map(|c| {
                let mut ids = c.affected_slots.clone();
                ids.sort();
                (c.conflict_type, ids)
            })
            .collect();
        entries.sort();
        entries
    }
}

/// Runs every standard rule over `slots`.
///
/// The roster rule only fires when a roster is given.
pub fn detect_all(slots: &[Slot], roster: Option<&Roster>) -> DetectionReport {
    let context = DetectionContext::new().with_roster_opt(roster);
    ConflictDetector::standard().detect(slots, &context)
}
