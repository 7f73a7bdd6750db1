//! Built-in conflict rules.
//!
//! # Rules
//!
//! | Rule | Type | Severity | Fires when |
//! |------|------|----------|-----------|
//! | `TeacherClash` | teacher | error | a teacher is in ≥2 slots of one (day, period) |
//! | `RoomClash` | room | warning | a room is in ≥2 slots of one (day, period) |
//! | `PracticalBatch` | practical | warning | parallel practicals lack batches, or a practical lacks a lab |
//! | `CohortClash` | cohort | error | a cell holds a lecture plus anything else, or repeats a batch |
//! | `RosterMembership` | structural | warning | a slot names something outside the roster |
//!
//! Unassigned teachers and rooms are `None` and never take part in a clash.
//! Groups are walked in sorted key order so output order is deterministic.

use std::collections::BTreeMap;

use super::{ConflictRule, DetectionContext};
use crate::models::{
    Conflict, ConflictType, Day, Placement, PracticalIssue, RosterField, Slot, SlotKind,
};

/// Groups slots by (day, period), keeping input order inside each group.
fn group_by_time(slots: &[Slot]) -> BTreeMap<Placement, Vec<&Slot>> {
    let mut groups: BTreeMap<Placement, Vec<&Slot>> = BTreeMap::new();
    for slot in slots {
        groups.entry(slot.placement()).or_default().push(slot);
    }
    groups
}

/// Reports every resource value shared by ≥2 slots of the same (day, period).
fn shared_resource_clashes<'a, F, C>(slots: &'a [Slot], resource: F, make: C) -> Vec<Conflict>
where
    F: Fn(&'a Slot) -> Option<&'a str>,
    C: Fn(&str, Day, u32, &[&Slot]) -> Conflict,
{
    let mut conflicts = Vec::new();
    for (at, group) in group_by_time(slots) {
        let mut by_resource: BTreeMap<&str, Vec<&Slot>> = BTreeMap::new();
        for slot in group {
            if let Some(name) = resource(slot) {
                by_resource.entry(name).or_default().push(slot);
            }
        }
        for (name, booked) in by_resource {
            if booked.len() > 1 {
                conflicts.push(make(name, at.day, at.period, &booked));
            }
        }
    }
    conflicts
}

// ======================== Resource clashes ========================

/// A teacher cannot take two sessions at once.
#[derive(Debug, Clone, Copy)]
pub struct TeacherClash;

impl ConflictRule for TeacherClash {
    fn name(&self) -> &'static str {
        "TEACHER_CLASH"
    }

    fn conflict_type(&self) -> ConflictType {
        ConflictType::Teacher
    }

    fn check(&self, slots: &[Slot], _context: &DetectionContext<'_>) -> Vec<Conflict> {
        shared_resource_clashes(slots, |s| s.teacher.as_deref(), Conflict::teacher_clash)
    }

    fn description(&self) -> &'static str {
        "A teacher cannot be assigned to more than one slot at the same time"
    }
}

/// A room booked twice at once. Advisory only.
#[derive(Debug, Clone, Copy)]
pub struct RoomClash;

impl ConflictRule for RoomClash {
    fn name(&self) -> &'static str {
        "ROOM_CLASH"
    }

    fn conflict_type(&self) -> ConflictType {
        ConflictType::Room
    }

    fn check(&self, slots: &[Slot], _context: &DetectionContext<'_>) -> Vec<Conflict> {
        shared_resource_clashes(slots, |s| s.room.as_deref(), Conflict::room_clash)
    }

    fn description(&self) -> &'static str {
        "A room should not host more than one class at the same time"
    }
}

// ======================== Cohort and practical rules ========================

/// Practical sessions must be told apart by batch and must have a lab.
///
/// Groups practicals by (subject, year, division, day, period). A group of
/// two or more where any member lacks a batch is ambiguous. Duplicate
/// explicit batches are left to [`CohortClash`].
#[derive(Debug, Clone, Copy)]
pub struct PracticalBatch;

impl ConflictRule for PracticalBatch {
    fn name(&self) -> &'static str {
        "PRACTICAL_BATCH"
    }

    fn conflict_type(&self) -> ConflictType {
        ConflictType::Practical
    }

    fn check(&self, slots: &[Slot], _context: &DetectionContext<'_>) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        let mut sessions: BTreeMap<(&str, &str, &str, Placement), Vec<&Slot>> = BTreeMap::new();

        for slot in slots.iter().filter(|s| s.kind == SlotKind::Practical) {
            sessions
                .entry((
                    slot.subject.as_str(),
                    slot.year.as_str(),
                    slot.division.as_str(),
                    slot.placement(),
                ))
                .or_default()
                .push(slot);
        }

        for group in sessions.values() {
            if group.len() > 1 && group.iter().any(|s| s.batch.is_none()) {
                conflicts.push(Conflict::practical(PracticalIssue::UnbatchedParallel, group));
            }
        }

        for slot in slots.iter().filter(|s| s.kind == SlotKind::Practical) {
            if slot.room.is_none() {
                conflicts.push(Conflict::practical(PracticalIssue::MissingRoom, &[slot]));
            }
        }

        conflicts
    }

    fn description(&self) -> &'static str {
        "Parallel practicals need distinct batches and every practical needs a lab"
    }
}

/// A cohort cannot attend two sessions at once.
///
/// Within one (day, period, year, division) cell:
/// - a lecture must be alone;
/// - practicals may share the cell only with distinct batches;
/// - an unbatched practical double-books the cohort unless every slot in
///   the cell is an unbatched practical of the same subject.
#[derive(Debug, Clone, Copy)]
pub struct CohortClash;

impl ConflictRule for CohortClash {
    fn name(&self) -> &'static str {
        "COHORT_CLASH"
    }

    fn conflict_type(&self) -> ConflictType {
        ConflictType::Cohort
    }

    fn check(&self, slots: &[Slot], _context: &DetectionContext<'_>) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        let mut cells: BTreeMap<(Placement, &str, &str), Vec<&Slot>> = BTreeMap::new();

        for slot in slots {
            cells
                .entry((slot.placement(), slot.year.as_str(), slot.division.as_str()))
                .or_default()
                .push(slot);
        }

        for cell in cells.values().filter(|c| c.len() > 1) {
            if cell.iter().any(|s| s.kind == SlotKind::Lecture) {
                conflicts.push(Conflict::cohort_clash(cell));
                continue;
            }

            let mut by_batch: BTreeMap<&str, Vec<&Slot>> = BTreeMap::new();
            let mut unbatched: Vec<&Slot> = Vec::new();
            for &slot in cell {
                match slot.batch.as_deref() {
                    Some(batch) => by_batch.entry(batch).or_default().push(slot),
                    None => unbatched.push(slot),
                }
            }

            for shared in by_batch.values().filter(|g| g.len() > 1) {
                conflicts.push(Conflict::cohort_clash(shared));
            }

            // Only same-subject parallels with no batch at all are left to
            // PracticalBatch.
            let Some(first) = unbatched.first() else {
                continue;
            };
            let mixed_subjects = cell.iter().any(|s| s.subject != first.subject);
            if !by_batch.is_empty() || mixed_subjects {
                conflicts.push(Conflict::cohort_clash(cell));
            }
        }

        conflicts
    }

    fn description(&self) -> &'static str {
        "A cohort cannot attend two sessions in the same period"
    }
}

// ======================== Structural rules ========================

/// Slots must refer to declared years, divisions, subjects and teachers.
///
/// Needs a roster in the context; without one it reports nothing.
#[derive(Debug, Clone, Copy)]
pub struct RosterMembership;

impl ConflictRule for RosterMembership {
    fn name(&self) -> &'static str {
        "ROSTER_MEMBERSHIP"
    }

    fn conflict_type(&self) -> ConflictType {
        ConflictType::Structural
    }

    fn check(&self, slots: &[Slot], context: &DetectionContext<'_>) -> Vec<Conflict> {
        let Some(roster) = context.roster else {
            return Vec::new();
        };

        let mut conflicts = Vec::new();
        for slot in slots {
            if !roster.knows_year(&slot.year) {
                conflicts.push(Conflict::roster_mismatch(RosterField::Year, &slot.year, slot));
            }
            if !roster.knows_division(&slot.division) {
                conflicts.push(Conflict::roster_mismatch(
                    RosterField::Division,
                    &slot.division,
                    slot,
                ));
            }
            if !slot.subject.is_empty() && !roster.knows_subject(&slot.subject) {
                conflicts.push(Conflict::roster_mismatch(
                    RosterField::Subject,
                    &slot.subject,
                    slot,
                ));
            }
            if let Some(teacher) = slot.teacher.as_deref() {
                if !roster.knows_teacher(teacher) {
                    conflicts.push(Conflict::roster_mismatch(RosterField::Teacher, teacher, slot));
                }
            }
        }
        conflicts
    }

    fn description(&self) -> &'static str {
        "Slots must match a known roster entry"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConflictDetails, Roster, RosterTeacher, Severity};

    fn lecture(id: &str, day: Day, period: u32, division: &str, teacher: &str, room: &str) -> Slot {
        Slot::new(id, day, period, "SE", division)
            .with_subject("DBMS")
            .with_teacher(teacher)
            .with_room(room)
    }

    fn lab(id: &str, subject: &str, batch: Option<&str>, room: &str) -> Slot {
        let s = Slot::new(id, Day::Tuesday, 3, "SE", "A")
            .with_subject(subject)
            .with_room(room)
            .practical();
        match batch {
            Some(b) => s.with_batch(b),
            None => s,
        }
    }

    fn check<R: ConflictRule>(rule: R, slots: &[Slot]) -> Vec<Conflict> {
        rule.check(slots, &DetectionContext::new())
    }

    #[test]
    fn test_teacher_clash() {
        let slots = vec![
            lecture("a", Day::Monday, 1, "A", "Neha", "R1"),
            lecture("b", Day::Monday, 1, "B", "Neha", "R2"),
            lecture("c", Day::Monday, 2, "C", "Neha", "R3"),
        ];
        let conflicts = check(TeacherClash, &slots);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].affected_slots, vec!["a", "b"]);
        assert_eq!(conflicts[0].severity, Severity::Error);
    }

    #[test]
    fn test_teacher_clash_three_way() {
        let slots = vec![
            lecture("a", Day::Monday, 1, "A", "Neha", "R1"),
            lecture("b", Day::Monday, 1, "B", "Neha", "R2"),
            lecture("c", Day::Monday, 1, "C", "Neha", "R3"),
        ];
        let conflicts = check(TeacherClash, &slots);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].affected_slots.len(), 3);
    }

    #[test]
    fn test_unassigned_never_clashes() {
        let slots = vec![
            lecture("a", Day::Monday, 1, "A", "TBA", "unassigned"),
            lecture("b", Day::Monday, 1, "B", "TBA", "unassigned"),
        ];
        assert!(check(TeacherClash, &slots).is_empty());
        assert!(check(RoomClash, &slots).is_empty());
    }

    #[test]
    fn test_room_clash_is_warning() {
        let slots = vec![
            lecture("a", Day::Friday, 4, "A", "Neha", "R1"),
            lecture("b", Day::Friday, 4, "B", "Ravi", "R1"),
        ];
        let conflicts = check(RoomClash, &slots);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].severity, Severity::Warning);
        match &conflicts[0].details {
            ConflictDetails::RoomClash { room, cohorts, .. } => {
                assert_eq!(room, "R1");
                assert_eq!(cohorts, &vec!["SE-A".to_string(), "SE-B".to_string()]);
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn test_practical_unbatched_parallel() {
        let slots = vec![lab("p1", "CN", None, "L1"), lab("p2", "CN", None, "L2")];
        let conflicts = check(PracticalBatch, &slots);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].affected_slots, vec!["p1", "p2"]);
        assert_eq!(conflicts[0].conflict_type, ConflictType::Practical);
    }

    #[test]
    fn test_practical_batched_is_fine() {
        let slots = vec![
            lab("p1", "CN", Some("B1"), "L1"),
            lab("p2", "CN", Some("B2"), "L2"),
        ];
        assert!(check(PracticalBatch, &slots).is_empty());
        assert!(check(CohortClash, &slots).is_empty());
    }

    #[test]
    fn test_practical_missing_room() {
        let slots = vec![lab("p1", "CN", Some("B1"), "TBA")];
        let conflicts = check(PracticalBatch, &slots);
        assert_eq!(conflicts.len(), 1);
        assert!(matches!(
            conflicts[0].details,
            ConflictDetails::Practical {
                issue: PracticalIssue::MissingRoom,
                ..
            }
        ));
    }

    #[test]
    fn test_unbatched_practical_beside_batched_one() {
        let slots = vec![
            lab("p1", "CN", Some("B1"), "L1"),
            lab("p2", "OS", None, "L2"),
        ];
        let conflicts = check(CohortClash, &slots);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].severity, Severity::Error);
        assert_eq!(conflicts[0].affected_slots, vec!["p1", "p2"]);
        assert!(check(PracticalBatch, &slots).is_empty());
    }

    #[test]
    fn test_lecture_must_be_alone() {
        let slots = vec![
            Slot::new("l", Day::Tuesday, 3, "SE", "A").with_subject("OS"),
            lab("p1", "CN", Some("B1"), "L1"),
        ];
        let conflicts = check(CohortClash, &slots);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].severity, Severity::Error);
        assert_eq!(conflicts[0].affected_slots, vec!["l", "p1"]);
    }

    #[test]
    fn test_duplicate_batch() {
        let slots = vec![
            lab("p1", "CN", Some("B1"), "L1"),
            lab("p2", "OS", Some("B1"), "L2"),
            lab("p3", "DBMS", Some("B2"), "L3"),
        ];
        let conflicts = check(CohortClash, &slots);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].affected_slots, vec!["p1", "p2"]);
    }

    #[test]
    fn test_unbatched_mixed_subjects() {
        let slots = vec![lab("p1", "CN", None, "L1"), lab("p2", "OS", None, "L2")];
        assert_eq!(check(CohortClash, &slots).len(), 1);
        // same subject is the practical rule's concern
        let same = vec![lab("p1", "CN", None, "L1"), lab("p2", "CN", None, "L2")];
        assert!(check(CohortClash, &same).is_empty());
    }

    #[test]
    fn test_different_divisions_share_time() {
        let slots = vec![
            lecture("a", Day::Monday, 1, "A", "Neha", "R1"),
            lecture("b", Day::Monday, 1, "B", "Ravi", "R2"),
        ];
        assert!(check(CohortClash, &slots).is_empty());
    }

    #[test]
    fn test_roster_membership() {
        let roster = Roster::new()
            .with_teacher(RosterTeacher::new("Neha"))
            .with_subject("DBMS")
            .with_year("SE")
            .with_division("A");
        let slots = vec![
            lecture("a", Day::Monday, 1, "A", "Neha", "R1"),
            lecture("b", Day::Monday, 2, "B", "Ghost", "R1"),
        ];

        let conflicts = RosterMembership.check(&slots, &DetectionContext::new().with_roster(&roster));
        assert_eq!(conflicts.len(), 2); // division B, teacher Ghost
        assert!(conflicts.iter().all(|c| c.affected_slots == vec!["b"]));
        assert!(conflicts
            .iter()
            .all(|c| c.conflict_type == ConflictType::Structural));
    }

    #[test]
    fn test_roster_rule_without_roster() {
        let slots = vec![lecture("a", Day::Monday, 1, "Z", "Anyone", "R1")];
        assert!(check(RosterMembership, &slots).is_empty());
    }
}
