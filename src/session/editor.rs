//! Edit session state machine.
//!
//! # States
//! - **Clean**: current timetable equals the saved baseline.
//! - **Dirty**: the two differ by value.
//!
//! # Transitions
//! | Operation | Requires | Effect |
//! |-----------|----------|--------|
//! | `edit` | known slot, valid result | record undo, clear redo, apply |
//! | `undo` | undo entries | current → redo, pop undo |
//! | `redo` | redo entries | current → undo, pop redo |
//! | `reset` | confirmation | clear history, current = saved |
//! | save | zero errors, no save in flight | saved = snapshot, clear history |
//!
//! Every state change reruns conflict detection synchronously and issues
//! a new [`ScoreRequest`]; the score itself arrives later.

use log::{debug, info, warn};

use super::collaborator::{
    EditContext, QualityScorer, SaveTicket, ScoreRequest, ScoreResponse, TimetableStore,
};
use super::error::{CollaboratorError, SessionError, SessionResult};
use super::history::History;
use crate::autofix::{suggest_fix, AutoFixSearch, FixAction, FixSuggestion};
use crate::config::EditorConfig;
use crate::detection::{ConflictDetector, DetectionContext, DetectionReport};
use crate::models::{
    Conflict, ConflictSummary, Placement, Roster, SlotPatch, Timetable, TimetableDiff,
};

/// Result of feeding a score response to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreUpdate {
    /// Score accepted. `delta` is `None` for the first score.
    Applied { score: f64, delta: Option<f64> },
    /// Response to a superseded request; ignored.
    Stale,
    /// Scoring failed; the previous score is kept.
    Failed { message: String },
}

/// An interactive editing session over one timetable.
///
/// Single-writer: all mutation goes through `&mut self`. Saving is split
/// into [`begin_save`](Self::begin_save) / [`finish_save`](Self::finish_save)
/// so local edits stay possible while the store call is pending.
#[derive(Debug)]
pub struct EditSession {
    current: Timetable,
    saved: Timetable,
    history: History,
    report: DetectionReport,
    detector: ConflictDetector,
    search: AutoFixSearch,
    roster: Option<Roster>,
    config: EditorConfig,
    score: Option<f64>,
    score_delta: Option<f64>,
    issued_seq: u64,
    applied_seq: u64,
    generation: u64,
    next_ticket: u64,
    save_in_flight: Option<u64>,
}

impl EditSession {
    /// Opens a session on a loaded timetable.
    ///
    /// Fails if any slot lies outside the configured grid.
    pub fn open(timetable: Timetable, config: EditorConfig) -> SessionResult<Self> {
        timetable.check_grid(&config.grid)?;
        let mut session = Self {
            saved: timetable.clone(),
            current: timetable,
            history: History::new(config.history_limit),
            report: DetectionReport::default(),
            detector: ConflictDetector::standard(),
            search: AutoFixSearch::new(config.grid.clone()),
            roster: None,
            config,
            score: None,
            score_delta: None,
            issued_seq: 0,
            applied_seq: 0,
            generation: 0,
            next_ticket: 0,
            save_in_flight: None,
        };
        session.redetect();
        info!("edit session opened with {} slot(s)", session.current.len());
        Ok(session)
    }

    /// Enables roster checks and roster-based fix suggestions.
    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = Some(roster);
        self.redetect();
        self
    }

    /// Replaces the rule set.
    pub fn with_detector(mut self, detector: ConflictDetector) -> Self {
        self.detector = detector;
        self.redetect();
        self
    }

    // ======================== Queries ========================

    pub fn current(&self) -> &Timetable {
        &self.current
    }

    pub fn saved(&self) -> &Timetable {
        &self.saved
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Conflicts of the current state, from the last detection pass.
    pub fn report(&self) -> &DetectionReport {
        &self.report
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.report.conflicts
    }

    pub fn summary(&self) -> &ConflictSummary {
        &self.report.summary
    }

    /// Whether the current timetable differs from the saved one.
    pub fn has_changes(&self) -> bool {
        self.current != self.saved
    }

    /// Slots added, removed or modified since the last save.
    pub fn unsaved_changes(&self) -> TimetableDiff {
        self.saved.diff(&self.current)
    }

    /// Whether the current timetable may be saved.
    ///
    /// Runs a fresh detection pass on every call.
    pub fn is_valid(&self) -> bool {
        self.detect_current().is_save_eligible()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Latest accepted quality score.
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// Change between the latest two accepted scores.
    pub fn score_delta(&self) -> Option<f64> {
        self.score_delta
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight.is_some()
    }

    // ======================== Edits ========================

    /// Applies field changes to one slot.
    pub fn edit(&mut self, slot_id: &str, patch: &SlotPatch) -> SessionResult<ScoreRequest> {
        let next = self
            .current
            .patched(slot_id, patch)?
            .ok_or_else(|| SessionError::UnknownSlot(slot_id.to_string()))?;
        next.check_grid(&self.config.grid)?;

        let before = std::mem::replace(&mut self.current, next);
        self.history.record(before);
        debug!("edited slot '{slot_id}'");
        Ok(self.after_change())
    }

    /// Moves one slot, e.g. to a placement found by the auto-fix search.
    pub fn apply_relocation(
        &mut self,
        slot_id: &str,
        placement: Placement,
    ) -> SessionResult<ScoreRequest> {
        self.edit(slot_id, &SlotPatch::relocate(placement))
    }

    /// Applies a suggested fix through the normal edit path.
    pub fn apply_fix(&mut self, slot_id: &str, action: &FixAction) -> SessionResult<ScoreRequest> {
        self.edit(slot_id, &action.to_patch())
    }

    /// Searches a conflict-free placement for one slot of the current state.
    pub fn find_placement(&self, slot_id: &str) -> SessionResult<Option<Placement>> {
        let slot = self
            .current
            .get(slot_id)
            .ok_or_else(|| SessionError::UnknownSlot(slot_id.to_string()))?;
        Ok(self.search.search(slot, self.current.slots()))
    }

    /// Suggests a repair for one slot of the current state.
    pub fn suggest_fix(&self, slot_id: &str) -> FixSuggestion {
        suggest_fix(slot_id, &self.current, self.roster.as_ref(), &self.search)
    }

    pub fn undo(&mut self) -> SessionResult<ScoreRequest> {
        let current = std::mem::take(&mut self.current);
        match self.history.undo(current) {
            Ok(previous) => {
                self.current = previous;
                debug!("undo ({} left)", self.history.undo_depth());
                Ok(self.after_change())
            }
            Err(current) => {
                self.current = current;
                Err(SessionError::NothingToUndo)
            }
        }
    }

    pub fn redo(&mut self) -> SessionResult<ScoreRequest> {
        let current = std::mem::take(&mut self.current);
        match self.history.redo(current) {
            Ok(next) => {
                self.current = next;
                debug!("redo ({} left)", self.history.redo_depth());
                Ok(self.after_change())
            }
            Err(current) => {
                self.current = current;
                Err(SessionError::NothingToRedo)
            }
        }
    }

    /// Discards every unsaved change. `confirmed` must be `true`.
    pub fn reset(&mut self, confirmed: bool) -> SessionResult<ScoreRequest> {
        if !confirmed {
            return Err(SessionError::ResetNotConfirmed);
        }
        self.history.clear();
        self.current = self.saved.clone();
        info!("edit session reset to saved state");
        Ok(self.after_change())
    }

    // ======================== Scoring ========================

    /// Issues a score request for the current state.
    ///
    /// Any earlier request becomes stale.
    pub fn request_score(&mut self) -> ScoreRequest {
        self.issued_seq += 1;
        ScoreRequest {
            seq: self.issued_seq,
            timetable: self.current.clone(),
        }
    }

    /// Accepts the response to the latest request; drops anything older.
    pub fn apply_score(&mut self, response: ScoreResponse) -> ScoreUpdate {
        if response.seq != self.issued_seq || response.seq <= self.applied_seq {
            warn!(
                "discarding stale score response #{} (latest #{})",
                response.seq, self.issued_seq
            );
            return ScoreUpdate::Stale;
        }
        self.applied_seq = response.seq;

        match response.result {
            Ok(score) => {
                let delta = self.score.map(|previous| score - previous);
                self.score = Some(score);
                self.score_delta = delta;
                ScoreUpdate::Applied { score, delta }
            }
            Err(err) => {
                warn!("quality scoring failed: {err}");
                ScoreUpdate::Failed {
                    message: err.user_message(),
                }
            }
        }
    }

    /// Requests, awaits and applies a score for the current state.
    pub async fn refresh_score(
        &mut self,
        scorer: &dyn QualityScorer,
        context: &EditContext,
    ) -> ScoreUpdate {
        let policy = self.config.scoring;
        let response = self.request_score().run(scorer, context, &policy).await;
        self.apply_score(response)
    }

    // ======================== Saving ========================

    /// Starts a save of the current state.
    ///
    /// Rejected while a save is pending or while any error-severity
    /// conflict exists (fresh detection pass).
    pub fn begin_save(&mut self) -> SessionResult<SaveTicket> {
        if self.save_in_flight.is_some() {
            return Err(SessionError::SaveInFlight);
        }
        let report = self.detect_current();
        if !report.is_save_eligible() {
            return Err(SessionError::SaveBlocked {
                errors: report.summary.errors,
            });
        }

        self.next_ticket += 1;
        self.save_in_flight = Some(self.next_ticket);
        Ok(SaveTicket {
            id: self.next_ticket,
            generation: self.generation,
            timetable: self.current.clone(),
        })
    }

    /// Completes a save started with [`begin_save`](Self::begin_save).
    ///
    /// On success the ticket's snapshot becomes the saved baseline. History
    /// is cleared only if nothing was edited while the save was pending.
    /// On failure nothing changes and the error is returned.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        outcome: Result<(), CollaboratorError>,
    ) -> SessionResult<()> {
        if self.save_in_flight != Some(ticket.id) {
            return Err(SessionError::NoSaveInFlight);
        }
        self.save_in_flight = None;

        match outcome {
            Ok(()) => {
                if ticket.generation == self.generation {
                    self.history.clear();
                }
                self.saved = ticket.timetable;
                info!("saved timetable with {} slot(s)", self.saved.len());
                Ok(())
            }
            Err(err) => {
                warn!("save failed: {err}");
                Err(SessionError::Collaborator(err))
            }
        }
    }

    /// Runs a complete save against `store`.
    pub async fn save(
        &mut self,
        store: &dyn TimetableStore,
        context: &EditContext,
    ) -> SessionResult<()> {
        let ticket = self.begin_save()?;
        let policy = self.config.saving;
        let outcome = ticket.persist(store, context, &policy).await;
        self.finish_save(ticket, outcome)
    }

    // ======================== Internals ========================

    fn detect_current(&self) -> DetectionReport {
        let context = DetectionContext::new().with_roster_opt(self.roster.as_ref());
        self.detector.detect(self.current.slots(), &context)
    }

    fn redetect(&mut self) {
        self.report = self.detect_current();
    }

    fn after_change(&mut self) -> ScoreRequest {
        self.generation += 1;
        self.redetect();
        self.request_score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, Slot, WeekGrid};
    use crate::session::SaveResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn clean_timetable() -> Timetable {
        Timetable::new(vec![
            Slot::new("a", Day::Monday, 1, "SE", "A")
                .with_subject("DBMS")
                .with_teacher("Neha")
                .with_room("R1"),
            Slot::new("b", Day::Monday, 2, "SE", "B")
                .with_subject("CN")
                .with_teacher("Neha")
                .with_room("R2"),
        ])
        .unwrap()
    }

    fn session() -> EditSession {
        EditSession::open(clean_timetable(), EditorConfig::default()).unwrap()
    }

    fn clash_patch() -> SlotPatch {
        SlotPatch::new().with_period(1)
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Vec<Timetable>>,
    }

    #[async_trait]
    impl TimetableStore for MemoryStore {
        async fn save(
            &self,
            timetable: &Timetable,
            _context: &EditContext,
        ) -> Result<SaveResponse, CollaboratorError> {
            self.saved.lock().unwrap().push(timetable.clone());
            Ok(SaveResponse::ok())
        }
    }

    struct FixedScorer(f64);

    #[async_trait]
    impl QualityScorer for FixedScorer {
        async fn request_score(
            &self,
            _timetable: &Timetable,
            _context: &EditContext,
        ) -> Result<f64, CollaboratorError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_open_clean() {
        let s = session();
        assert!(!s.has_changes());
        assert!(s.is_valid());
        assert!(s.report().is_clean());
        assert!(!s.can_undo());
        assert_eq!(s.score(), None);
    }

    #[test]
    fn test_open_rejects_outside_grid() {
        let config = EditorConfig::default().with_grid(WeekGrid::weekdays(1));
        let err = EditSession::open(clean_timetable(), config).unwrap_err();
        assert!(matches!(err, SessionError::Invalid(_)));
    }

    #[test]
    fn test_edit_detects_and_dirties() {
        let mut s = session();
        let req = s.edit("b", &clash_patch()).unwrap();

        assert_eq!(req.seq, 1);
        assert_eq!(req.timetable, *s.current());
        assert!(s.has_changes());
        assert_eq!(s.summary().errors, 1);
        assert!(!s.is_valid());
        assert!(s.can_undo());
    }

    #[test]
    fn test_edit_unknown_slot() {
        let mut s = session();
        assert_eq!(
            s.edit("zz", &clash_patch()).unwrap_err(),
            SessionError::UnknownSlot("zz".into())
        );
        assert!(!s.can_undo());
    }

    #[test]
    fn test_invalid_edit_leaves_state() {
        let mut s = session();
        assert!(matches!(
            s.edit("a", &SlotPatch::new().with_period(0)),
            Err(SessionError::Invalid(_))
        ));
        assert!(matches!(
            s.edit("a", &SlotPatch::new().with_period(9)),
            Err(SessionError::Invalid(_))
        ));
        assert!(!s.has_changes());
        assert!(!s.can_undo());
    }

    #[test]
    fn test_undo_redo() {
        let mut s = session();
        let original = s.current().clone();
        s.edit("b", &clash_patch()).unwrap();
        let edited = s.current().clone();

        s.undo().unwrap();
        assert_eq!(*s.current(), original);
        assert!(!s.has_changes());
        assert!(s.report().is_clean());

        s.redo().unwrap();
        assert_eq!(*s.current(), edited);
        assert_eq!(s.summary().errors, 1);

        assert!(s.redo().is_err());
    }

    #[test]
    fn test_undo_empty() {
        let mut s = session();
        assert_eq!(s.undo().unwrap_err(), SessionError::NothingToUndo);
        assert_eq!(s.redo().unwrap_err(), SessionError::NothingToRedo);
        assert_eq!(*s.current(), clean_timetable());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut s = session();
        s.edit("b", &clash_patch()).unwrap();
        s.undo().unwrap();
        assert!(s.can_redo());

        s.edit("a", &SlotPatch::new().with_room("R3")).unwrap();
        assert!(!s.can_redo());
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let mut s = session();
        s.edit("b", &clash_patch()).unwrap();

        assert_eq!(s.reset(false).unwrap_err(), SessionError::ResetNotConfirmed);
        assert!(s.has_changes());

        s.reset(true).unwrap();
        assert!(!s.has_changes());
        assert!(!s.can_undo());
        assert!(!s.can_redo());
        assert!(s.is_valid());
    }

    #[test]
    fn test_stale_score_discarded() {
        let mut s = session();
        let first = s.edit("a", &SlotPatch::new().with_room("R3")).unwrap();
        let second = s.edit("a", &SlotPatch::new().with_room("R4")).unwrap();

        let late = ScoreResponse {
            seq: first.seq,
            result: Ok(10.0),
        };
        let fresh = ScoreResponse {
            seq: second.seq,
            result: Ok(80.0),
        };

        assert_eq!(s.apply_score(fresh.clone()), ScoreUpdate::Applied { score: 80.0, delta: None });
        assert_eq!(s.apply_score(late), ScoreUpdate::Stale);
        assert_eq!(s.apply_score(fresh), ScoreUpdate::Stale);
        assert_eq!(s.score(), Some(80.0));
    }

    #[test]
    fn test_score_delta_and_failure() {
        let mut s = session();
        let r1 = s.request_score();
        s.apply_score(ScoreResponse {
            seq: r1.seq,
            result: Ok(60.0),
        });
        let r2 = s.edit("a", &SlotPatch::new().with_room("R3")).unwrap();
        let update = s.apply_score(ScoreResponse {
            seq: r2.seq,
            result: Ok(75.0),
        });
        assert_eq!(update, ScoreUpdate::Applied { score: 75.0, delta: Some(15.0) });
        assert_eq!(s.score_delta(), Some(15.0));

        let r3 = s.request_score();
        let failed = s.apply_score(ScoreResponse {
            seq: r3.seq,
            result: Err(CollaboratorError::Unavailable("down".into())),
        });
        assert!(matches!(failed, ScoreUpdate::Failed { .. }));
        assert_eq!(s.score(), Some(75.0));
    }

    #[test]
    fn test_save_blocked_by_errors() {
        let mut s = session();
        s.edit("b", &clash_patch()).unwrap();
        assert_eq!(
            s.begin_save().unwrap_err(),
            SessionError::SaveBlocked { errors: 1 }
        );
        assert!(!s.is_saving());
    }

    #[test]
    fn test_save_in_flight_rejects_second_save() {
        let mut s = session();
        s.edit("a", &SlotPatch::new().with_room("R3")).unwrap();
        let ticket = s.begin_save().unwrap();
        assert!(s.is_saving());
        assert_eq!(s.begin_save().unwrap_err(), SessionError::SaveInFlight);

        // local edits stay available
        s.edit("a", &SlotPatch::new().with_room("R4")).unwrap();
        s.undo().unwrap();

        s.finish_save(ticket, Ok(())).unwrap();
        assert!(!s.is_saving());
    }

    #[test]
    fn test_failed_save_keeps_state() {
        let mut s = session();
        s.edit("a", &SlotPatch::new().with_room("R3")).unwrap();
        let ticket = s.begin_save().unwrap();
        let err = s
            .finish_save(ticket, Err(CollaboratorError::Rejected("locked".into())))
            .unwrap_err();

        assert!(matches!(err, SessionError::Collaborator(_)));
        assert!(s.has_changes());
        assert!(s.can_undo());
        assert_eq!(*s.saved(), clean_timetable());
    }

    #[test]
    fn test_edit_during_save_keeps_history() {
        let mut s = session();
        s.edit("a", &SlotPatch::new().with_room("R3")).unwrap();
        let ticket = s.begin_save().unwrap();
        let snapshot = ticket.timetable.clone();
        s.edit("a", &SlotPatch::new().with_room("R4")).unwrap();

        s.finish_save(ticket, Ok(())).unwrap();
        assert_eq!(*s.saved(), snapshot);
        assert!(s.has_changes());
        assert!(s.can_undo());
    }

    #[test]
    fn test_finish_with_foreign_ticket() {
        let mut s = session();
        let ticket = s.begin_save().unwrap();
        s.finish_save(ticket.clone(), Ok(())).unwrap();
        assert_eq!(
            s.finish_save(ticket, Ok(())).unwrap_err(),
            SessionError::NoSaveInFlight
        );
    }

    #[test]
    fn test_find_placement_and_apply() {
        let mut s = session();
        s.edit("b", &clash_patch()).unwrap();
        let p = s.find_placement("b").unwrap().unwrap();
        assert_eq!(p, Placement::new(Day::Monday, 2));

        s.apply_relocation("b", p).unwrap();
        assert!(s.is_valid());
        assert!(s.find_placement("zz").is_err());
    }

    #[test]
    fn test_suggest_and_apply_fix() {
        let mut s = session().with_roster(Roster::new().with_room("R1").with_room("R5"));
        s.edit("b", &SlotPatch::new().with_period(1).with_teacher("Ravi").with_room("R1"))
            .unwrap();
        assert_eq!(s.summary().warnings, 1);

        let suggestion = s.suggest_fix("b");
        let action = suggestion.action.unwrap();
        assert_eq!(action, FixAction::AlternateRoom("R5".into()));

        s.apply_fix("b", &action).unwrap();
        assert!(s.report().is_clean());
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let store = MemoryStore::default();
        let mut s = session();
        s.edit("a", &SlotPatch::new().with_room("R3")).unwrap();

        s.save(&store, &EditContext::new()).await.unwrap();
        assert!(!s.has_changes());
        assert!(!s.can_undo());
        assert!(!s.can_redo());
        assert_eq!(store.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_clears_redo() {
        let store = MemoryStore::default();
        let mut s = session();
        s.edit("a", &SlotPatch::new().with_room("R3")).unwrap();
        s.edit("a", &SlotPatch::new().with_room("R4")).unwrap();
        s.undo().unwrap();
        assert!(s.can_undo());
        assert!(s.can_redo());

        s.save(&store, &EditContext::new()).await.unwrap();
        assert!(!s.can_undo());
        assert!(!s.can_redo());
        assert_eq!(s.saved().get("a").unwrap().room.as_deref(), Some("R3"));
        assert_eq!(s.redo().unwrap_err(), SessionError::NothingToRedo);
    }

    #[test]
    fn test_unsaved_changes() {
        let mut s = session();
        assert!(s.unsaved_changes().is_empty());

        s.edit("b", &SlotPatch::new().with_room("R7")).unwrap();
        let diff = s.unsaved_changes();
        assert_eq!(diff.modified.len(), 1);
        assert_eq!(diff.modified[0].id(), "b");
        assert_eq!(diff.modified[0].after.room.as_deref(), Some("R7"));
        assert!(diff.added.is_empty() && diff.removed.is_empty());

        s.undo().unwrap();
        assert!(s.unsaved_changes().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_score() {
        let mut s = session();
        let update = s.refresh_score(&FixedScorer(88.0), &EditContext::new()).await;
        assert_eq!(update, ScoreUpdate::Applied { score: 88.0, delta: None });
        assert_eq!(s.score(), Some(88.0));
    }
}
