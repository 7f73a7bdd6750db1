//! Auto-fix search and fix suggestions.
//!
//! # Algorithm
//!
//! `AutoFixSearch` scans the week grid day-major, skipping the target's
//! current cell. A candidate (day, period) is accepted iff no *other* slot
//! at that time:
//! 1. has the target's teacher,
//! 2. has the target's room, or
//! 3. belongs to the target's cohort (year, division).
//!
//! Unassigned teachers and rooms never block a candidate. The first
//! accepted candidate wins; `None` means the grid is exhausted.
//!
//! # Complexity
//! O(D·P·N) where D·P = grid cells and N = slots. Grids are small (≤48
//! cells by default), so no indexing is done.
//!
//! # Scope
//! Only the target slot is ever moved. Swaps and multi-slot moves are
//! not attempted.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::detection::detect_all;
use crate::models::{
    ConflictType, Placement, Roster, Slot, SlotKind, SlotPatch, Timetable, WeekGrid,
};

/// Grid scan for a conflict-free placement of one slot.
#[derive(Debug, Clone, Default)]
pub struct AutoFixSearch {
    grid: WeekGrid,
}

impl AutoFixSearch {
    /// Creates a search over the given grid.
    pub fn new(grid: WeekGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &WeekGrid {
        &self.grid
    }

    /// Returns the first acceptable placement for `target`, or `None`.
    ///
    /// `target` is matched against `slots` by id; its own entry in `slots`
    /// is ignored.
    pub fn search(&self, target: &Slot, slots: &[Slot]) -> Option<Placement> {
        let current = target.placement();
        let found = self
            .grid
            .placements()
            .filter(|&candidate| candidate != current)
            .find(|&candidate| is_free_for(target, slots, candidate));

        match found {
            Some(p) => debug!("auto-fix for slot '{}': move to {p}", target.id),
            None => debug!(
                "auto-fix for slot '{}': no free cell among {}",
                target.id,
                self.grid.cell_count()
            ),
        }
        found
    }
}

/// Searches the default grid (Monday–Saturday, 8 periods).
pub fn search(target: &Slot, slots: &[Slot]) -> Option<Placement> {
    AutoFixSearch::default().search(target, slots)
}

/// Whether `target` could sit at `candidate` without a teacher, room or
/// cohort clash against the other slots there.
pub fn is_free_for(target: &Slot, slots: &[Slot], candidate: Placement) -> bool {
    slots
        .iter()
        .filter(|other| other.id != target.id && other.is_at(candidate))
        .all(|other| {
            let teacher_busy = target.teacher.is_some() && other.teacher == target.teacher;
            let room_busy = target.room.is_some() && other.room == target.room;
            let cohort_busy = other.same_cohort(target);
            !(teacher_busy || room_busy || cohort_busy)
        })
}

/// Roster teachers qualified for the slot's subject and free at its time.
///
/// The slot's current teacher is never suggested.
pub fn alternate_teachers(slot: &Slot, slots: &[Slot], roster: &Roster) -> Vec<String> {
    roster
        .teachers
        .iter()
        .filter(|t| t.can_teach(&slot.subject))
        .filter(|t| slot.teacher.as_deref() != Some(t.name.as_str()))
        .filter(|t| {
            !slots.iter().any(|other| {
                other.id != slot.id
                    && other.is_at(slot.placement())
                    && other.teacher.as_deref() == Some(t.name.as_str())
            })
        })
        .map(|t| t.name.clone())
        .collect()
}

/// Roster rooms (labs for practicals) free at the slot's time.
///
/// The slot's current room is never suggested.
pub fn alternate_rooms(slot: &Slot, slots: &[Slot], roster: &Roster) -> Vec<String> {
    let pool = match slot.kind {
        SlotKind::Practical => &roster.labs,
        SlotKind::Lecture => &roster.rooms,
    };
    pool.iter()
        .filter(|room| slot.room.as_deref() != Some(room.as_str()))
        .filter(|room| {
            !slots.iter().any(|other| {
                other.id != slot.id
                    && other.is_at(slot.placement())
                    && other.room.as_deref() == Some(room.as_str())
            })
        })
        .cloned()
        .collect()
}

/// A concrete repair for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value", rename_all = "camelCase")]
pub enum FixAction {
    /// Move the slot to another (day, period).
    Relocate(Placement),
    /// Keep the time, change the teacher.
    AlternateTeacher(String),
    /// Keep the time, change the room.
    AlternateRoom(String),
}

impl FixAction {
    /// The edit that applies this fix.
    pub fn to_patch(&self) -> SlotPatch {
        match self {
            FixAction::Relocate(p) => SlotPatch::relocate(*p),
            FixAction::AlternateTeacher(t) => SlotPatch::new().with_teacher(t),
            FixAction::AlternateRoom(r) => SlotPatch::new().with_room(r),
        }
    }
}

/// Outcome of [`suggest_fix`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixSuggestion {
    pub slot_id: String,
    /// `None` when nothing needs fixing or no strategy applies.
    pub action: Option<FixAction>,
    pub explanation: String,
}

impl FixSuggestion {
    fn none(slot_id: &str, explanation: impl Into<String>) -> Self {
        Self {
            slot_id: slot_id.to_string(),
            action: None,
            explanation: explanation.into(),
        }
    }

    fn with(slot_id: &str, action: FixAction, explanation: impl Into<String>) -> Self {
        Self {
            slot_id: slot_id.to_string(),
            action: Some(action),
            explanation: explanation.into(),
        }
    }
}

/// Picks a repair for the first conflict involving `slot_id`.
///
/// Error-severity conflicts are handled before warnings. Teacher and
/// room clashes first try a same-time reassignment from the roster,
/// accepted only if re-detection shows no remaining error for the slot;
/// relocation is the fallback. Cohort clashes can only be relocated.
/// Practical and roster problems need manual attention.
pub fn suggest_fix(
    slot_id: &str,
    timetable: &Timetable,
    roster: Option<&Roster>,
    search: &AutoFixSearch,
) -> FixSuggestion {
    let Some(slot) = timetable.get(slot_id) else {
        return FixSuggestion::none(slot_id, format!("Slot '{slot_id}' does not exist"));
    };

    let report = detect_all(timetable.slots(), roster);
    let mut relevant = report.involving(slot_id);
    if relevant.is_empty() {
        return FixSuggestion::none(slot_id, "No conflicts to fix");
    }
    relevant.sort_by_key(|c| c.severity);
    let primary = relevant[0].conflict_type;

    let reassigned = match (primary, roster) {
        (ConflictType::Teacher, Some(roster)) => alternate_teachers(slot, timetable.slots(), roster)
            .into_iter()
            .map(FixAction::AlternateTeacher)
            .find(|action| clears_errors(timetable, slot_id, action, roster)),
        (ConflictType::Room, Some(roster)) => alternate_rooms(slot, timetable.slots(), roster)
            .into_iter()
            .map(FixAction::AlternateRoom)
            .find(|action| clears_errors(timetable, slot_id, action, roster)),
        _ => None,
    };

    match (primary, reassigned) {
        (_, Some(FixAction::AlternateTeacher(name))) => FixSuggestion::with(
            slot_id,
            FixAction::AlternateTeacher(name.clone()),
            format!("Changed teacher to '{name}' (available at this time)"),
        ),
        (_, Some(FixAction::AlternateRoom(name))) => FixSuggestion::with(
            slot_id,
            FixAction::AlternateRoom(name.clone()),
            format!("Changed room to '{name}' (available at this time)"),
        ),
        (ConflictType::Teacher | ConflictType::Room | ConflictType::Cohort, _) => {
            match search.search(slot, timetable.slots()) {
                Some(p) => FixSuggestion::with(
                    slot_id,
                    FixAction::Relocate(p),
                    format!("Move to {p}, where teacher, room and cohort are free"),
                ),
                None => FixSuggestion::none(
                    slot_id,
                    "No free period found for this teacher, room and cohort",
                ),
            }
        }
        (ConflictType::Practical, _) => {
            FixSuggestion::none(slot_id, "Practical slots require manual adjustment")
        }
        (ConflictType::Structural, _) => FixSuggestion::none(
            slot_id,
            "No automatic fix available for this conflict type",
        ),
    }
}

fn clears_errors(timetable: &Timetable, slot_id: &str, action: &FixAction, roster: &Roster) -> bool {
    match timetable.patched(slot_id, &action.to_patch()) {
        Ok(Some(candidate)) => detect_all(candidate.slots(), Some(roster))
            .involving(slot_id)
            .iter()
            .all(|c| !c.is_error()),
        _ => false,
    }
}
