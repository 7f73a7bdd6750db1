//! Timetable domain models.
//!
//! Provides the data types the detector, the auto-fix search and the
//! edit session share.
//!
//! # Glossary
//!
//! | Type | Meaning |
//! |------|---------|
//! | Slot | One class session (subject, teacher, room) at a (day, period) for a cohort |
//! | Cell | The (day, period, year, division) coordinate a slot occupies |
//! | Timetable | Ordered slots with unique ids |
//! | WeekGrid | The configured teaching days and periods |
//! | Roster | Declared teachers, subjects, cohorts, rooms and labs |
//! | Conflict | A rule violation derived from the slot set |

mod conflict;
mod grid;
mod roster;
mod slot;
mod timetable;

pub use conflict::{
    Conflict, ConflictDetails, ConflictSummary, ConflictType, PracticalIssue, RosterField,
    Severity,
};
pub use grid::{Placement, WeekGrid};
pub use roster::{Roster, RosterTeacher};
pub use slot::{normalize_assignee, Day, ParseDayError, Slot, SlotKind};
pub use timetable::{SlotChange, SlotPatch, Timetable, TimetableDiff};
