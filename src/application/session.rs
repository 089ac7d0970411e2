//! Per-session calculation tally.

use crate::domain::{RiskCategory, ScoreResult};

/// Counts the calculations made during one interactive session.
///
/// Re-submitting an unchanged score (for example redrawing the same result)
/// does not count as a new calculation.
#[derive(Debug, Clone)]
pub struct SessionTally {
    session_id: String,
    calculations: u64,
    last: Option<ScoreResult>,
}

impl SessionTally {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_id: crate::domain::uuid_v4(),
            calculations: 0,
            last: None,
        }
    }

    /// Record a result. Returns `true` if it was counted.
    pub fn record(&mut self, result: &ScoreResult) -> bool {
        if self.last.is_some_and(|last| last.score == result.score) {
            return false;
        }
        self.calculations += 1;
        self.last = Some(*result);
        true
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub fn calculations(&self) -> u64 {
        self.calculations
    }

    #[must_use]
    pub fn last_score(&self) -> Option<f64> {
        self.last.map(|r| r.score)
    }

    #[must_use]
    pub fn last_category(&self) -> Option<RiskCategory> {
        self.last.map(|r| r.category)
    }
}

impl Default for SessionTally {
    fn default() -> Self {
        Self::new()
    }
}
