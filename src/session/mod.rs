//! Versioned editing of a timetable.
//!
//! An [`EditSession`] owns the working copy, the last saved baseline and a
//! bounded undo/redo history. Conflict detection reruns after every change;
//! quality scoring and saving go through async collaborators.
//!
//! # Usage
//!
//! ```
//! use timetable_edit::config::EditorConfig;
//! use timetable_edit::models::{Day, Slot, SlotPatch, Timetable};
//! use timetable_edit::session::EditSession;
//!
//! let timetable = Timetable::new(vec![
//!     Slot::new("a", Day::Monday, 1, "SE", "A").with_teacher("Neha"),
//!     Slot::new("b", Day::Monday, 2, "SE", "B").with_teacher("Neha"),
//! ])
//! .unwrap();
//!
//! let mut session = EditSession::open(timetable, EditorConfig::default()).unwrap();
//! session.edit("b", &SlotPatch::new().with_period(1)).unwrap();
//! assert!(!session.is_valid());
//!
//! session.undo().unwrap();
//! assert!(session.is_valid());
//! assert!(!session.has_changes());
//! ```
//!
//! # Concurrency
//! The session is single-writer (`&mut self`). Collaborator calls run on
//! owned snapshots ([`ScoreRequest`], [`SaveTicket`]), so they can be
//! awaited or spawned without holding the session.

mod collaborator;
mod editor;
mod error;
mod history;

pub use collaborator::{
    call_with_policy, EditContext, QualityScorer, SaveResponse, SaveTicket, ScoreRequest,
    ScoreResponse, TimetableStore,
};
pub use editor::{EditSession, ScoreUpdate};
pub use error::{CollaboratorError, SessionError, SessionResult};
pub use history::History;
