//! Slot model.
//!
//! A slot is one scheduled class session: a subject taught by a teacher
//! in a room, placed at a (day, period) for a cohort (year + division).
//! Practical sessions may be split into batches that share a cell.
//!
//! # Normalization
//! Upstream data marks missing teachers and rooms with sentinel strings
//! (`"TBA"`, `"unassigned"`, ...). These are folded into `None` on input
//! so a literal sentinel can never take part in a clash comparison.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Placement;

/// Sentinel strings that mean "nobody / nothing assigned".
const UNASSIGNED_SENTINELS: [&str; 6] = ["tba", "tbd", "unassigned", "-", "n/a", "none"];

/// Day of the teaching week.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

/// Error returned when a day name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day '{0}'")]
pub struct ParseDayError(pub String);

impl Day {
    /// All days, Monday first.
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Full English name.
    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Day {
    type Err = ParseDayError;

    /// Accepts full names and three-letter abbreviations, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let day = match lowered.as_str() {
            "monday" | "mon" => Day::Monday,
            "tuesday" | "tue" | "tues" => Day::Tuesday,
            "wednesday" | "wed" => Day::Wednesday,
            "thursday" | "thu" | "thur" | "thurs" => Day::Thursday,
            "friday" | "fri" => Day::Friday,
            "saturday" | "sat" => Day::Saturday,
            _ => return Err(ParseDayError(s.to_string())),
        };
        Ok(day)
    }
}

impl TryFrom<String> for Day {
    type Error = ParseDayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Session kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SlotKind {
    /// Whole-cohort session. Must be alone in its cell.
    #[default]
    #[serde(alias = "Theory", alias = "THEORY", alias = "LECTURE", alias = "lecture")]
    Lecture,
    /// Lab session, possibly run in parallel batches.
    #[serde(alias = "Lab", alias = "LAB", alias = "PRACTICAL", alias = "practical")]
    Practical,
}

/// One scheduled class session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Unique slot identifier.
    pub id: String,
    /// Teaching day.
    pub day: Day,
    /// 1-based period within the day.
    #[serde(alias = "slot")]
    pub period: u32,
    /// Cohort year (e.g. "SE").
    pub year: String,
    /// Cohort division (e.g. "A").
    pub division: String,
    /// Subject name.
    #[serde(default)]
    pub subject: String,
    /// Assigned teacher. `None` = unassigned.
    #[serde(default, deserialize_with = "deserialize_assignee")]
    pub teacher: Option<String>,
    /// Assigned room. `None` = unassigned.
    #[serde(default, deserialize_with = "deserialize_assignee")]
    pub room: Option<String>,
    /// Lecture or practical.
    #[serde(rename = "type", default)]
    pub kind: SlotKind,
    /// Batch label, only meaningful for practicals.
    #[serde(default, deserialize_with = "deserialize_assignee")]
    pub batch: Option<String>,
}

impl Slot {
    /// Creates an unassigned lecture slot.
    pub fn new(
        id: impl Into<String>,
        day: Day,
        period: u32,
        year: impl Into<String>,
        division: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            day,
            period,
            year: year.into(),
            division: division.into(),
            subject: String::new(),
            teacher: None,
            room: None,
            kind: SlotKind::Lecture,
            batch: None,
        }
    }

    /// Sets the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the teacher. Sentinel names leave the slot unassigned.
    pub fn with_teacher(mut self, teacher: impl AsRef<str>) -> Self {
        self.teacher = normalize_assignee(teacher.as_ref());
        self
    }

    /// Sets the room. Sentinel names leave the slot unassigned.
    pub fn with_room(mut self, room: impl AsRef<str>) -> Self {
        self.room = normalize_assignee(room.as_ref());
        self
    }

    /// Marks the slot as a practical without a batch.
    pub fn practical(mut self) -> Self {
        self.kind = SlotKind::Practical;
        self
    }

    /// Marks the slot as a practical for the given batch.
    pub fn with_batch(mut self, batch: impl AsRef<str>) -> Self {
        self.kind = SlotKind::Practical;
        self.batch = normalize_assignee(batch.as_ref());
        self
    }

    /// Current (day, period) position.
    #[inline]
    pub fn placement(&self) -> Placement {
        Placement::new(self.day, self.period)
    }

    /// Whether the slot sits at the given (day, period).
    #[inline]
    pub fn is_at(&self, placement: Placement) -> bool {
        self.day == placement.day && self.period == placement.period
    }

    /// Whether both slots belong to the same (year, division).
    #[inline]
    pub fn same_cohort(&self, other: &Slot) -> bool {
        self.year == other.year && self.division == other.division
    }

    /// Cohort label, e.g. `"SE-A"`.
    pub fn cohort_label(&self) -> String {
        format!("{}-{}", self.year, self.division)
    }

    pub fn is_practical(&self) -> bool {
        self.kind == SlotKind::Practical
    }
}

/// Folds sentinel and blank names into `None`; trims everything else.
pub fn normalize_assignee(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_ascii_lowercase();
    if UNASSIGNED_SENTINELS.contains(&lowered.as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn deserialize_assignee<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(normalize_assignee))
}
