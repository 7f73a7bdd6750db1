//! External collaborators: quality scoring and persistence.
//!
//! Both are opaque async services. Every call goes through
//! [`call_with_policy`], which applies a per-attempt timeout and retries
//! retryable failures a bounded number of times.
//!
//! # Score sequencing
//! Each state change issues a [`ScoreRequest`] carrying a monotonic
//! sequence number and an owned snapshot, so the request can be run
//! anywhere (including a spawned task). The session only accepts the
//! response to the latest request it issued.

use std::future::Future;

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};

use super::error::CollaboratorError;
use crate::config::CollaboratorPolicy;
use crate::models::Timetable;

/// Opaque context forwarded to collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditContext {
    /// Branch / department the timetable belongs to.
    pub branch_id: Option<String>,
    /// Upstream data (branch settings, input roster, ...) passed through untouched.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl EditContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, branch_id: impl Into<String>) -> Self {
        self.branch_id = Some(branch_id.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Computes a 0–100 quality score for a timetable.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait QualityScorer: Send + Sync {
    /// Scores a timetable.
    ///
    /// # Returns
    /// * `Ok(score)` - Score, expected within `0.0..=100.0`
    /// * `Err(CollaboratorError)` - If the service fails
    async fn request_score(
        &self,
        timetable: &Timetable,
        context: &EditContext,
    ) -> Result<f64, CollaboratorError>;
}

/// Reply from the persistence service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl SaveResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Persists a timetable.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TimetableStore: Send + Sync {
    /// Saves a timetable as one atomic call.
    ///
    /// # Returns
    /// * `Ok(SaveResponse)` - Service reply; `success == false` is a rejection
    /// * `Err(CollaboratorError)` - If the service cannot be reached
    async fn save(
        &self,
        timetable: &Timetable,
        context: &EditContext,
    ) -> Result<SaveResponse, CollaboratorError>;
}

/// Runs `call` with a per-attempt timeout, retrying retryable failures
/// up to `policy.max_retries` times.
pub async fn call_with_policy<T, F, Fut>(
    operation: &'static str,
    policy: &CollaboratorPolicy,
    mut call: F,
) -> Result<T, CollaboratorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CollaboratorError>>,
{
    let mut attempt: u32 = 0;
    loop {
        let outcome = match tokio::time::timeout(policy.timeout(), call()).await {
            Ok(result) => result,
            Err(_) => Err(CollaboratorError::Timeout {
                operation,
                after_ms: policy.timeout_ms,
            }),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                warn!(
                    "{operation} attempt {attempt} failed ({err}); retrying ({} left)",
                    policy.max_retries - attempt + 1
                );
            }
            Err(err) => {
                warn!("{operation} failed: {err}");
                return Err(err);
            }
        }
    }
}

/// A pending quality-score request for one session state.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRequest {
    /// Monotonic sequence number within the issuing session.
    pub seq: u64,
    /// Snapshot to score.
    pub timetable: Timetable,
}

/// The answer to a [`ScoreRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResponse {
    pub seq: u64,
    pub result: Result<f64, CollaboratorError>,
}

impl ScoreRequest {
    /// Calls the scorer under `policy` and checks the score range.
    pub async fn run(
        self,
        scorer: &dyn QualityScorer,
        context: &EditContext,
        policy: &CollaboratorPolicy,
    ) -> ScoreResponse {
        let timetable = &self.timetable;
        let result = call_with_policy("scoring", policy, || {
            scorer.request_score(timetable, context)
        })
        .await
        .and_then(|score| {
            if score.is_finite() && (0.0..=100.0).contains(&score) {
                Ok(score)
            } else {
                Err(CollaboratorError::InvalidScore(score))
            }
        });
        ScoreResponse {
            seq: self.seq,
            result,
        }
    }
}

/// Permission to run one save, issued by `EditSession::begin_save`.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    pub(crate) id: u64,
    pub(crate) generation: u64,
    /// Snapshot being saved.
    pub timetable: Timetable,
}

impl SaveTicket {
    /// Sends the snapshot to the store under `policy`.
    ///
    /// A reply with `success == false` becomes [`CollaboratorError::Rejected`].
    pub async fn persist(
        &self,
        store: &dyn TimetableStore,
        context: &EditContext,
        policy: &CollaboratorPolicy,
    ) -> Result<(), CollaboratorError> {
        let timetable = &self.timetable;
        let response = call_with_policy("save", policy, || store.save(timetable, context)).await?;
        if response.success {
            Ok(())
        } else {
            Err(CollaboratorError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "save was not accepted".to_string()),
            ))
        }
    }
}
