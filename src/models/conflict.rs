//! Conflict model.
//!
//! Conflicts are derived data: they are recomputed from the full slot set
//! after every change and never stored. Conflict ids are positional within
//! one detection pass and must not be kept across edits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Day, Slot};

/// Rule family that produced a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    /// One teacher booked twice at the same time.
    Teacher,
    /// One room booked twice at the same time.
    Room,
    /// Ambiguous or incomplete practical session.
    Practical,
    /// One cohort booked into two sessions at the same time.
    Cohort,
    /// Slot refers to something outside the roster.
    Structural,
}

/// How strongly a conflict blocks saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks saving.
    Error,
    /// Displayed, never blocks.
    Warning,
}

impl ConflictType {
    /// Severity attached to this conflict family.
    ///
    /// Room clashes stay advisory: rooms may be shared across
    /// partially-overlapping cohorts.
    pub fn severity(self) -> Severity {
        match self {
            ConflictType::Teacher | ConflictType::Cohort => Severity::Error,
            ConflictType::Room | ConflictType::Practical | ConflictType::Structural => {
                Severity::Warning
            }
        }
    }
}

/// What is wrong with a practical session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PracticalIssue {
    /// Several parallel sessions with nothing telling their batches apart.
    UnbatchedParallel,
    /// Practical without a lab/room.
    MissingRoom,
}

/// Roster dimension a slot failed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RosterField {
    Year,
    Division,
    Subject,
    Teacher,
}

/// Structured, rule-specific conflict data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum ConflictDetails {
    #[serde(rename_all = "camelCase")]
    TeacherClash {
        teacher: String,
        day: Day,
        period: u32,
        cohorts: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    RoomClash {
        room: String,
        day: Day,
        period: u32,
        cohorts: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Practical {
        subject: String,
        year: String,
        division: String,
        day: Day,
        period: u32,
        issue: PracticalIssue,
    },
    #[serde(rename_all = "camelCase")]
    CohortClash {
        year: String,
        division: String,
        day: Day,
        period: u32,
    },
    #[serde(rename_all = "camelCase")]
    RosterMismatch { field: RosterField, value: String },
}

/// A detected rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Position in the detection pass that produced it.
    pub id: usize,
    /// Rule family.
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    pub details: ConflictDetails,
    /// Ids of every slot taking part in the violation.
    pub affected_slots: Vec<String>,
}

impl Conflict {
    fn new(
        conflict_type: ConflictType,
        message: String,
        details: ConflictDetails,
        slots: &[&Slot],
    ) -> Self {
        Self {
            id: 0,
            conflict_type,
            severity: conflict_type.severity(),
            message,
            details,
            affected_slots: slots.iter().map(|s| s.id.clone()).collect(),
        }
    }

    /// Same teacher in several slots of one (day, period).
    pub fn teacher_clash(teacher: &str, day: Day, period: u32, slots: &[&Slot]) -> Self {
        let cohorts = cohort_labels(slots);
        Self::new(
            ConflictType::Teacher,
            format!(
                "Teacher '{teacher}' is assigned to {} at {day} period {period}",
                cohorts.join(", ")
            ),
            ConflictDetails::TeacherClash {
                teacher: teacher.to_string(),
                day,
                period,
                cohorts,
            },
            slots,
        )
    }

    /// Same room in several slots of one (day, period).
    pub fn room_clash(room: &str, day: Day, period: u32, slots: &[&Slot]) -> Self {
        let cohorts = cohort_labels(slots);
        Self::new(
            ConflictType::Room,
            format!(
                "Room '{room}' is booked for {} at {day} period {period}",
                cohorts.join(", ")
            ),
            ConflictDetails::RoomClash {
                room: room.to_string(),
                day,
                period,
                cohorts,
            },
            slots,
        )
    }

    /// Practical session problem. `slots` must be non-empty.
    pub(crate) fn practical(issue: PracticalIssue, slots: &[&Slot]) -> Self {
        let first = slots[0];
        let message = match issue {
            PracticalIssue::UnbatchedParallel => format!(
                "{} parallel '{}' practicals for {} at {} period {} have no batch to tell them apart",
                slots.len(),
                first.subject,
                first.cohort_label(),
                first.day,
                first.period
            ),
            PracticalIssue::MissingRoom => format!(
                "Practical '{}' for {} at {} period {} has no lab assigned",
                first.subject,
                first.cohort_label(),
                first.day,
                first.period
            ),
        };
        Self::new(
            ConflictType::Practical,
            message,
            ConflictDetails::Practical {
                subject: first.subject.clone(),
                year: first.year.clone(),
                division: first.division.clone(),
                day: first.day,
                period: first.period,
                issue,
            },
            slots,
        )
    }

    /// Cohort booked into incompatible sessions. `slots` must be non-empty.
    pub(crate) fn cohort_clash(slots: &[&Slot]) -> Self {
        let first = slots[0];
        Self::new(
            ConflictType::Cohort,
            format!(
                "{} has {} overlapping sessions at {} period {}",
                first.cohort_label(),
                slots.len(),
                first.day,
                first.period
            ),
            ConflictDetails::CohortClash {
                year: first.year.clone(),
                division: first.division.clone(),
                day: first.day,
                period: first.period,
            },
            slots,
        )
    }

    /// Slot value missing from the roster.
    pub fn roster_mismatch(field: RosterField, value: &str, slot: &Slot) -> Self {
        let what = match field {
            RosterField::Year => "year",
            RosterField::Division => "division",
            RosterField::Subject => "subject",
            RosterField::Teacher => "teacher",
        };
        Self::new(
            ConflictType::Structural,
            format!("Slot '{}' has unknown {what} '{value}'", slot.id),
            ConflictDetails::RosterMismatch {
                field,
                value: value.to_string(),
            },
            &[slot],
        )
    }

    /// Whether the conflict lists the slot.
    pub fn involves(&self, slot_id: &str) -> bool {
        self.affected_slots.iter().any(|id| id == slot_id)
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

fn cohort_labels(slots: &[&Slot]) -> Vec<String> {
    slots.iter().map(|s| s.cohort_label()).collect()
}

/// Conflict counts for one detection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub by_type: BTreeMap<ConflictType, usize>,
}

impl ConflictSummary {
    /// Tallies a list of conflicts.
    pub fn from_conflicts(conflicts: &[Conflict]) -> Self {
        let mut summary = Self {
            total: conflicts.len(),
            ..Self::default()
        };
        for c in conflicts {
            match c.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
            }
            *summary.by_type.entry(c.conflict_type).or_insert(0) += 1;
        }
        summary
    }

    /// Whether nothing blocks a save.
    #[inline]
    pub fn is_save_eligible(&self) -> bool {
        self.errors == 0
    }

    /// Count for one conflict family.
    pub fn count(&self, conflict_type: ConflictType) -> usize {
        self.by_type.get(&conflict_type).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str, division: &str) -> Slot {
        Slot::new(id, Day::Monday, 1, "SE", division)
            .with_subject("DBMS")
            .with_teacher("Neha")
    }

    #[test]
    fn test_severity_by_type() {
        assert_eq!(ConflictType::Teacher.severity(), Severity::Error);
        assert_eq!(ConflictType::Cohort.severity(), Severity::Error);
        assert_eq!(ConflictType::Room.severity(), Severity::Warning);
        assert_eq!(ConflictType::Practical.severity(), Severity::Warning);
        assert_eq!(ConflictType::Structural.severity(), Severity::Warning);
    }

    #[test]
    fn test_teacher_clash_factory() {
        let a = slot("a", "A");
        let b = slot("b", "B");
        let c = Conflict::teacher_clash("Neha", Day::Monday, 1, &[&a, &b]);
        assert_eq!(c.conflict_type, ConflictType::Teacher);
        assert!(c.is_error());
        assert_eq!(c.affected_slots, vec!["a", "b"]);
        assert!(c.involves("b"));
        assert!(!c.involves("z"));
        assert!(c.message.contains("SE-A, SE-B"));
    }

    #[test]
    fn test_cell_factories() {
        let a = slot("a", "A");
        let b = slot("b", "A");
        let cohort = Conflict::cohort_clash(&[&a, &b]);
        assert_eq!(cohort.conflict_type, ConflictType::Cohort);
        assert!(cohort.message.starts_with("SE-A has 2 overlapping sessions"));

        let lab = Conflict::practical(PracticalIssue::MissingRoom, &[&a]);
        assert_eq!(lab.severity, Severity::Warning);
        assert_eq!(lab.affected_slots, vec!["a"]);
    }

    #[test]
    fn test_summary_counts() {
        let a = slot("a", "A");
        let b = slot("b", "B");
        let conflicts = vec![
            Conflict::teacher_clash("Neha", Day::Monday, 1, &[&a, &b]),
            Conflict::room_clash("R1", Day::Monday, 1, &[&a, &b]),
            Conflict::roster_mismatch(RosterField::Year, "SE", &a),
        ];
        let s = ConflictSummary::from_conflicts(&conflicts);
        assert_eq!(s.total, 3);
        assert_eq!(s.errors, 1);
        assert_eq!(s.warnings, 2);
        assert_eq!(s.count(ConflictType::Room), 1);
        assert_eq!(s.count(ConflictType::Cohort), 0);
        assert!(!s.is_save_eligible());
    }

    #[test]
    fn test_conflict_json_shape() {
        let a = slot("a", "A");
        let b = slot("b", "B");
        let c = Conflict::teacher_clash("Neha", Day::Monday, 1, &[&a, &b]);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["type"], "teacher");
        assert_eq!(v["severity"], "error");
        assert_eq!(v["affectedSlots"][1], "b");
        assert_eq!(v["details"]["rule"], "teacherClash");
        assert_eq!(v["details"]["day"], "Monday");
    }
}
