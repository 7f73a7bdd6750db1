//! Editor configuration.
//!
//! Loaded from TOML. Every key is optional, including keys inside a
//! table; a missing key keeps its default:
//!
//! ```toml
//! history_limit = 50
//!
//! [grid]
//! days = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
//! periods_per_day = 7   # `periodsPerDay` also accepted
//!
//! [scoring]
//! timeout_ms = 5000
//! max_retries = 1
//!
//! [saving]
//! timeout_ms = 10000
//! max_retries = 0
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

use crate::models::WeekGrid;

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse editor config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid editor config: {0}")]
    Invalid(String),
}

/// Timeout and retry policy for one external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorPolicy {
    /// Per-attempt timeout (ms).
    pub timeout_ms: u64,
    /// Extra attempts after a retryable failure.
    pub max_retries: u32,
}

impl CollaboratorPolicy {
    pub fn new(timeout_ms: u64, max_retries: u32) -> Self {
        Self {
            timeout_ms,
            max_retries,
        }
    }

    /// Per-attempt timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Default policy for quality scoring.
    pub fn scoring() -> Self {
        Self::new(5_000, 1)
    }

    /// Default policy for saving. Saves are not retried.
    pub fn saving() -> Self {
        Self::new(10_000, 0)
    }
}

/// A policy table where every key is optional.
#[derive(Deserialize)]
struct PolicyTable {
    timeout_ms: Option<u64>,
    max_retries: Option<u32>,
}

impl PolicyTable {
    fn over(self, base: CollaboratorPolicy) -> CollaboratorPolicy {
        CollaboratorPolicy {
            timeout_ms: self.timeout_ms.unwrap_or(base.timeout_ms),
            max_retries: self.max_retries.unwrap_or(base.max_retries),
        }
    }
}

fn scoring_policy<'de, D: Deserializer<'de>>(d: D) -> Result<CollaboratorPolicy, D::Error> {
    Ok(PolicyTable::deserialize(d)?.over(CollaboratorPolicy::scoring()))
}

fn saving_policy<'de, D: Deserializer<'de>>(d: D) -> Result<CollaboratorPolicy, D::Error> {
    Ok(PolicyTable::deserialize(d)?.over(CollaboratorPolicy::saving()))
}

/// Edit-session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Teaching week: validation range and auto-fix candidates.
    pub grid: WeekGrid,
    /// Maximum undo depth. Oldest snapshots are dropped first.
    pub history_limit: usize,
    #[serde(deserialize_with = "scoring_policy")]
    pub scoring: CollaboratorPolicy,
    #[serde(deserialize_with = "saving_policy")]
    pub saving: CollaboratorPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid: WeekGrid::default(),
            history_limit: 50,
            scoring: CollaboratorPolicy::scoring(),
            saving: CollaboratorPolicy::saving(),
        }
    }
}

impl EditorConfig {
    /// Parses and checks a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the session cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.days.is_empty() {
            return Err(ConfigError::Invalid("grid has no days".into()));
        }
        if self.grid.periods_per_day == 0 {
            return Err(ConfigError::Invalid("grid has no periods".into()));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be at least 1".into()));
        }
        if self.scoring.timeout_ms == 0 || self.saving.timeout_ms == 0 {
            return Err(ConfigError::Invalid("collaborator timeouts must be positive".into()));
        }
        Ok(())
    }

    pub fn with_grid(mut self, grid: WeekGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_scoring(mut self, policy: CollaboratorPolicy) -> Self {
        self.scoring = policy;
        self
    }

    pub fn with_saving(mut self, policy: CollaboratorPolicy) -> Self {
        self.saving = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Day;

    #[test]
    fn test_defaults() {
        let c = EditorConfig::default();
        assert_eq!(c.grid.cell_count(), 48);
        assert_eq!(c.history_limit, 50);
        assert_eq!(c.scoring.max_retries, 1);
        assert_eq!(c.saving.max_retries, 0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let c = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(c, EditorConfig::default());
    }

    #[test]
    fn test_from_toml() {
        let c = EditorConfig::from_toml_str(
            r#"
            history_limit = 10

            [grid]
            days = ["Mon", "Tue", "Wed"]
            periodsPerDay = 6

            [scoring]
            timeout_ms = 250
            max_retries = 3
            "#,
        )
        .unwrap();

        assert_eq!(c.history_limit, 10);
        assert_eq!(c.grid.days, vec![Day::Monday, Day::Tuesday, Day::Wednesday]);
        assert_eq!(c.grid.periods_per_day, 6);
        assert_eq!(c.scoring.timeout(), Duration::from_millis(250));
        assert_eq!(c.saving, CollaboratorPolicy::saving());
    }

    #[test]
    fn test_partial_tables() {
        let c = EditorConfig::from_toml_str(
            r#"
            [grid]
            periods_per_day = 6

            [scoring]
            timeout_ms = 250

            [saving]
            max_retries = 2
            "#,
        )
        .unwrap();

        assert_eq!(c.grid.days, WeekGrid::default().days);
        assert_eq!(c.grid.periods_per_day, 6);
        assert_eq!(c.scoring, CollaboratorPolicy::new(250, 1));
        assert_eq!(c.saving, CollaboratorPolicy::new(10_000, 2));
        assert_eq!(c.history_limit, 50);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            EditorConfig::from_toml_str("history_limit = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EditorConfig::from_toml_str("[grid]\ndays = []\nperiodsPerDay = 4"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EditorConfig::from_toml_str("[grid]\ndays = [\"Sunday\"]\nperiodsPerDay = 4"),
            Err(ConfigError::Parse(_))
        ));
    }
}
