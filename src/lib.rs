//! Validation, conflict resolution and versioned editing for weekly
//! class timetables.
//!
//! Works on an existing timetable: it detects rule violations, finds a
//! local repair for a flagged slot, and keeps an undoable editing session
//! in sync with external scoring and persistence services. Building a
//! timetable from scratch is not in scope.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Slot`, `Timetable`, `WeekGrid`, `Roster`,
//!   `Conflict`, `ConflictSummary`
//! - **`validation`**: Structural checks on slot data (ids, periods, grid)
//! - **`detection`**: Composable conflict rules and the `ConflictDetector`
//! - **`autofix`**: Grid search for a conflict-free placement, roster-based
//!   reassignment, fix suggestions
//! - **`session`**: `EditSession` with undo/redo, stale-safe scoring and
//!   guarded saves
//! - **`config`**: TOML-loadable editor settings
//!
//! # Control Flow
//!
//! ```text
//! edit ──▶ EditSession ──▶ ConflictDetector (sync)
//!              │
//!              ├──▶ QualityScorer (async, sequenced)
//!              ├──▶ AutoFixSearch ──▶ relocation ──▶ edit
//!              └──▶ TimetableStore (async, one at a time)
//! ```
//!
//! # Logging
//!
//! Uses the `log` facade. Detection and search log at `debug`, session
//! lifecycle at `info`, collaborator failures and stale scores at `warn`.

pub mod autofix;
pub mod config;
pub mod detection;
pub mod models;
pub mod session;
pub mod validation;

pub use autofix::{search, suggest_fix, AutoFixSearch, FixAction, FixSuggestion};
pub use config::{CollaboratorPolicy, ConfigError, EditorConfig};
pub use detection::{detect_all, ConflictDetector, DetectionReport};
pub use session::{EditSession, SessionError};
