//! Detection context passed to conflict rules.

use crate::models::Roster;

/// Optional inputs shared by every rule in a detection pass.
///
/// Borrowed for the duration of the pass so rules never own or mutate
/// session state.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectionContext<'a> {
    /// Declared universe for structural checks. `None` disables them.
    pub roster: Option<&'a Roster>,
}

impl<'a> DetectionContext<'a> {
    /// Creates a context without a roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the roster.
    pub fn with_roster(mut self, roster: &'a Roster) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn with_roster_opt(mut self, roster: Option<&'a Roster>) -> Self {
        self.roster = roster;
        self
    }
}
