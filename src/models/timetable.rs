//! Timetable and slot-patch models.
//!
//! A timetable is an ordered list of slots with unique ids. Two
//! timetables are equal when they hold equal slots in the same order,
//! which is what an edit session's dirty flag compares.

use serde::{Deserialize, Serialize};

use super::{Day, Placement, Slot, SlotKind, WeekGrid};
use crate::validation::{validate_slots, InvalidTimetable};

/// Ordered collection of slots with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Slot>", into = "Vec<Slot>")]
pub struct Timetable {
    slots: Vec<Slot>,
}

impl Timetable {
    /// Builds a timetable, rejecting structurally invalid slot data.
    pub fn new(slots: Vec<Slot>) -> Result<Self, InvalidTimetable> {
        validate_slots(&slots, None)?;
        Ok(Self { slots })
    }

    /// Builds a timetable whose slots must also fit the grid.
    pub fn with_grid(slots: Vec<Slot>, grid: &WeekGrid) -> Result<Self, InvalidTimetable> {
        validate_slots(&slots, Some(grid))?;
        Ok(Self { slots })
    }

    /// Re-checks this timetable against a grid.
    pub fn check_grid(&self, grid: &WeekGrid) -> Result<(), InvalidTimetable> {
        validate_slots(&self.slots, Some(grid))?;
        Ok(())
    }

    /// All slots, in order.
    #[inline]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn into_slots(self) -> Vec<Slot> {
        self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Finds a slot by id.
    pub fn get(&self, slot_id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == slot_id)
    }

    /// Slots at one (day, period), across all cohorts.
    pub fn slots_at(&self, placement: Placement) -> Vec<&Slot> {
        self.slots.iter().filter(|s| s.is_at(placement)).collect()
    }

    /// Returns a copy with one slot patched.
    ///
    /// Returns `Ok(None)` if the slot does not exist, and an error if the
    /// patched data is structurally invalid.
    pub fn patched(
        &self,
        slot_id: &str,
        patch: &SlotPatch,
    ) -> Result<Option<Timetable>, InvalidTimetable> {
        let Some(index) = self.slots.iter().position(|s| s.id == slot_id) else {
            return Ok(None);
        };
        let mut slots = self.slots.clone();
        patch.apply_to(&mut slots[index]);
        validate_slots(&slots, None)?;
        Ok(Some(Timetable { slots }))
    }

    /// Returns a copy with one slot moved to a new (day, period).
    pub fn relocated(&self, slot_id: &str, placement: Placement) -> Option<Timetable> {
        let index = self.slots.iter().position(|s| s.id == slot_id)?;
        let mut slots = self.slots.clone();
        slots[index].day = placement.day;
        slots[index].period = placement.period;
        Some(Timetable { slots })
    }

    /// Slot-level changes from `self` to `newer`, matched by id.
    ///
    /// Lists follow slot order: removed and modified in `self`'s order,
    /// added in `newer`'s order. Reordering alone is not a change.
    pub fn diff(&self, newer: &Timetable) -> TimetableDiff {
        let mut diff = TimetableDiff::default();
        for before in &self.slots {
            match newer.get(&before.id) {
                None => diff.removed.push(before.clone()),
                Some(after) if after != before => diff.modified.push(SlotChange {
                    before: before.clone(),
                    after: after.clone(),
                }),
                Some(_) => {}
            }
        }
        diff.added = newer
            .slots
            .iter()
            .filter(|s| self.get(&s.id).is_none())
            .cloned()
            .collect();
        diff
    }
}

/// One slot as it was and as it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotChange {
    pub before: Slot,
    pub after: Slot,
}

impl SlotChange {
    pub fn id(&self) -> &str {
        &self.after.id
    }
}

/// Difference between two timetable snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableDiff {
    pub added: Vec<Slot>,
    pub removed: Vec<Slot>,
    pub modified: Vec<SlotChange>,
}

impl TimetableDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Number of changed slots.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    /// One-line description, e.g. "1 added, 0 removed, 2 modified".
    pub fn describe(&self) -> String {
        format!(
            "{} added, {} removed, {} modified",
            self.added.len(),
            self.removed.len(),
            self.modified.len()
        )
    }
}

impl TryFrom<Vec<Slot>> for Timetable {
    type Error = InvalidTimetable;

    fn try_from(slots: Vec<Slot>) -> Result<Self, Self::Error> {
        Self::new(slots)
    }
}

impl From<Timetable> for Vec<Slot> {
    fn from(timetable: Timetable) -> Self {
        timetable.slots
    }
}

/// Field changes for a single slot.
///
/// `None` leaves a field untouched. For the optional fields (teacher,
/// room, batch) `Some(None)` clears the assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlotPatch {
    pub day: Option<Day>,
    pub period: Option<u32>,
    pub subject: Option<String>,
    pub teacher: Option<Option<String>>,
    pub room: Option<Option<String>>,
    pub kind: Option<SlotKind>,
    pub batch: Option<Option<String>>,
}

impl SlotPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch that only moves the slot.
    pub fn relocate(placement: Placement) -> Self {
        Self::new()
            .with_day(placement.day)
            .with_period(placement.period)
    }

    pub fn with_day(mut self, day: Day) -> Self {
        self.day = Some(day);
        self
    }

    pub fn with_period(mut self, period: u32) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the teacher. Sentinel names clear it.
    pub fn with_teacher(mut self, teacher: impl AsRef<str>) -> Self {
        self.teacher = Some(super::normalize_assignee(teacher.as_ref()));
        self
    }

    pub fn without_teacher(mut self) -> Self {
        self.teacher = Some(None);
        self
    }

    /// Sets the room. Sentinel names clear it.
    pub fn with_room(mut self, room: impl AsRef<str>) -> Self {
        self.room = Some(super::normalize_assignee(room.as_ref()));
        self
    }

    pub fn without_room(mut self) -> Self {
        self.room = Some(None);
        self
    }

    pub fn with_kind(mut self, kind: SlotKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_batch(mut self, batch: impl AsRef<str>) -> Self {
        self.batch = Some(super::normalize_assignee(batch.as_ref()));
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes the patched fields into a slot.
    pub fn apply_to(&self, slot: &mut Slot) {
        if let Some(day) = self.day {
            slot.day = day;
        }
        if let Some(period) = self.period {
            slot.period = period;
        }
        if let Some(subject) = &self.subject {
            slot.subject = subject.clone();
        }
        if let Some(teacher) = &self.teacher {
            slot.teacher = teacher.clone();
        }
        if let Some(room) = &self.room {
            slot.room = room.clone();
        }
        if let Some(kind) = self.kind {
            slot.kind = kind;
        }
        if let Some(batch) = &self.batch {
            slot.batch = batch.clone();
        }
    }
}
