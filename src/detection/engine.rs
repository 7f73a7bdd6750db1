//! Conflict detector.
//!
//! Composes independent rules into one detection pass. Every pass
//! recomputes from scratch; there is no incremental diffing.

use std::sync::Arc;

use log::debug;

use super::rules::{CohortClash, PracticalBatch, RoomClash, RosterMembership, TeacherClash};
use super::{ConflictRule, DetectionContext, DetectionReport};
use crate::models::Slot;

/// A composable conflict detector.
///
/// # Example
/// ```
/// use timetable_edit::detection::{ConflictDetector, DetectionContext};
/// use timetable_edit::detection::rules;
///
/// let detector = ConflictDetector::new()
///     .with_rule(rules::TeacherClash)
///     .with_rule(rules::RoomClash);
/// let report = detector.detect(&[], &DetectionContext::new());
/// assert!(report.is_clean());
/// ```
#[derive(Clone)]
pub struct ConflictDetector {
    rules: Vec<Arc<dyn ConflictRule>>,
}

impl ConflictDetector {
    /// Creates a detector with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// All built-in rules, in reporting order.
    pub fn standard() -> Self {
        Self::new()
            .with_rule(TeacherClash)
            .with_rule(RoomClash)
            .with_rule(PracticalBatch)
            .with_rule(CohortClash)
            .with_rule(RosterMembership)
    }

    /// Adds a rule.
    pub fn with_rule<R: ConflictRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Names of the configured rules.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Runs every rule over `slots` and numbers the results.
    pub fn detect(&self, slots: &[Slot], context: &DetectionContext<'_>) -> DetectionReport {
        let mut conflicts = Vec::new();
        for rule in &self.rules {
            let found = rule.check(slots, context);
            if !found.is_empty() {
                debug!("{} reported {} conflict(s)", rule.name(), found.len());
            }
            conflicts.extend(found);
        }

        let report = DetectionReport::from_conflicts(conflicts);
        debug!(
            "detection over {} slot(s): {} error(s), {} warning(s)",
            slots.len(),
            report.summary.errors,
            report.summary.warnings
        );
        report
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ConflictDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictDetector")
            .field("rules", &self.rule_names())
            .finish()
    }
}
