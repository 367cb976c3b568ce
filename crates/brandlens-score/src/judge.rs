//! The language-model capability boundary.
//!
//! Scoring logic depends only on the [`Judge`] trait, so the hosted model
//! can be swapped or stubbed in tests without touching component scoring.

use futures::future::BoxFuture;

use crate::error::JudgeError;

/// One qualitative judgment request: a scoring rubric plus the structured
/// data to assess.
#[derive(Debug, Clone)]
pub struct JudgeRequest {
    pub rubric: &'static str,
    pub payload: serde_json::Value,
}

/// Structured judgment returned by the model.
#[derive(Debug, Clone)]
pub struct Judgment {
    /// Score in `[0, 10]` (clamped by the caller).
    pub score: f64,
    pub confidence: String,
    pub key_factors: Vec<String>,
}

/// Text/criteria in, structured judgment out.
pub trait Judge: Send + Sync {
    fn judge<'a>(&'a self, request: &'a JudgeRequest)
        -> BoxFuture<'a, Result<Judgment, JudgeError>>;
}
