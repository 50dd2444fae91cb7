//! Caller context: the `(user_id, period)` pair scoping every register operation
//!
//! Identity is established elsewhere (config, environment, a future session
//! collaborator); this crate only consumes the two values. Every query and
//! mutation filters on both, and a record whose stored pair differs from the
//! caller's is treated as not found.

use serde::{Deserialize, Serialize};

/// The active caller context. Constructed once at the composition root and
/// passed explicitly; there is no ambient/global context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterContext {
    pub user_id: String,
    pub period: String,
}

impl RegisterContext {
    pub fn new(user_id: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            period: period.into(),
        }
    }

    /// A copy of this context re-scoped to another period. Used by the
    /// monitoring flow, where eligibility follows the session's own period
    /// rather than the application's active one.
    pub fn with_period(&self, period: impl Into<String>) -> Self {
        Self {
            user_id: self.user_id.clone(),
            period: period.into(),
        }
    }

    /// Does a stored `(userId, period)` pair belong to this caller?
    pub fn owns(&self, user_id: &str, period: &str) -> bool {
        self.user_id == user_id && self.period == period
    }
}

impl std::fmt::Display for RegisterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.user_id, self.period)
    }
}
