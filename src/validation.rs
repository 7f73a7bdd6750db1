//! Input validation for timetables.
//!
//! Checks the structural integrity of slot data before it enters the
//! detector or an edit session. Detects:
//! - Duplicate and empty slot IDs
//! - Period numbers below 1
//! - Slots without a cohort
//! - Days or periods outside the configured week grid
//!
//! These are upstream data-contract breaches, not scheduling conflicts:
//! callers reject the whole timetable instead of reporting them as data.

use std::collections::HashSet;

use crate::models::{Slot, WeekGrid};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two slots share the same ID.
    DuplicateId,
    /// A slot has a blank ID.
    EmptyId,
    /// Period number is zero.
    InvalidPeriod,
    /// Year or division is blank.
    MissingCohort,
    /// Day is not one of the grid's days.
    DayOutsideGrid,
    /// Period is past the grid's last period.
    PeriodOutsideGrid,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A timetable rejected by validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid timetable ({} problem(s)): {}", .errors.len(), first_message(.errors))]
pub struct InvalidTimetable {
    pub errors: Vec<ValidationError>,
}

fn first_message(errors: &[ValidationError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("")
}

impl From<Vec<ValidationError>> for InvalidTimetable {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

/// Validates slot data.
///
/// Checks:
/// 1. No empty slot IDs
/// 2. No duplicate slot IDs
/// 3. Every period is 1-based
/// 4. Every slot names a year and a division
/// 5. With a grid: every day and period lies inside it
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_slots(slots: &[Slot], grid: Option<&WeekGrid>) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for slot in slots {
        if slot.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                format!("Slot at {} period {} has an empty ID", slot.day, slot.period),
            ));
        } else if !ids.insert(slot.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate slot ID: {}", slot.id),
            ));
        }

        if slot.period == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPeriod,
                format!("Slot '{}' has period 0 (periods start at 1)", slot.id),
            ));
        }

        if slot.year.trim().is_empty() || slot.division.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingCohort,
                format!("Slot '{}' is missing its year or division", slot.id),
            ));
        }

        if let Some(grid) = grid {
            if !grid.has_day(slot.day) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DayOutsideGrid,
                    format!("Slot '{}' is on {}, which is not a teaching day", slot.id, slot.day),
                ));
            }
            if slot.period > grid.periods_per_day {
                errors.push(ValidationError::new(
                    ValidationErrorKind::PeriodOutsideGrid,
                    format!(
                        "Slot '{}' is in period {}, past the last period {}",
                        slot.id, slot.period, grid.periods_per_day
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
