//! Roster model.
//!
//! The roster is the declared universe of teachers, subjects, cohorts,
//! rooms, and labs. It drives structural validation and the
//! alternate-teacher / alternate-room suggestions.
//!
//! An empty list leaves that dimension unconstrained, so a partial
//! roster (e.g. teachers only) still validates what it declares.

use serde::{Deserialize, Serialize};

/// A teacher entry with the subjects they can take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterTeacher {
    /// Teacher name, as used in slots.
    pub name: String,
    /// Subjects this teacher can take. Empty = any subject.
    #[serde(default)]
    pub subjects: Vec<String>,
}

impl RosterTeacher {
    /// Creates a teacher qualified for any subject.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subjects: Vec::new(),
        }
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    /// Whether the teacher can take the given subject.
    pub fn can_teach(&self, subject: &str) -> bool {
        self.subjects.is_empty() || self.subjects.iter().any(|s| s == subject)
    }
}

/// Declared set of valid teachers, subjects, years, divisions, rooms and labs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roster {
    pub teachers: Vec<RosterTeacher>,
    pub subjects: Vec<String>,
    pub years: Vec<String>,
    pub divisions: Vec<String>,
    /// Lecture rooms.
    pub rooms: Vec<String>,
    /// Practical labs.
    pub labs: Vec<String>,
}

impl Roster {
    /// Creates an empty (unconstrained) roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: RosterTeacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    /// Adds a year.
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.years.push(year.into());
        self
    }

    /// Adds a division.
    pub fn with_division(mut self, division: impl Into<String>) -> Self {
        self.divisions.push(division.into());
        self
    }

    /// Adds a lecture room.
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.rooms.push(room.into());
        self
    }

    /// Adds a lab.
    pub fn with_lab(mut self, lab: impl Into<String>) -> Self {
        self.labs.push(lab.into());
        self
    }

    pub fn knows_teacher(&self, name: &str) -> bool {
        self.teachers.is_empty() || self.teachers.iter().any(|t| t.name == name)
    }

    pub fn knows_subject(&self, subject: &str) -> bool {
        self.subjects.is_empty() || self.subjects.iter().any(|s| s == subject)
    }

    pub fn knows_year(&self, year: &str) -> bool {
        self.years.is_empty() || self.years.iter().any(|y| y == year)
    }

    pub fn knows_division(&self, division: &str) -> bool {
        self.divisions.is_empty() || self.divisions.iter().any(|d| d == division)
    }

    /// Finds a teacher entry by name.
    pub fn teacher(&self, name: &str) -> Option<&RosterTeacher> {
        self.teachers.iter().find(|t| t.name == name)
    }
}
