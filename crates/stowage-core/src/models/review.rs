//! Agent review domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StowageError, StowageResult};

pub const MIN_ASSESSMENT: u8 = 1;
pub const MAX_ASSESSMENT: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    /// The agent being reviewed.
    pub agent_id: Uuid,
    pub reviewer_id: Uuid,
    /// Rating in `1..=5`.
    pub assessment: u8,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A validated review ready to be persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReview {
    agent_id: Uuid,
    reviewer_id: Uuid,
    assessment: u8,
    description: String,
}

impl CreateReview {
    /// Fails with [`StowageError::IllegalArgument`] when `assessment` is
    /// outside `1..=5`.
    pub fn new(
        agent_id: Uuid,
        reviewer_id: Uuid,
        assessment: u8,
        description: impl Into<String>,
    ) -> StowageResult<Self> {
        if !(MIN_ASSESSMENT..=MAX_ASSESSMENT).contains(&assessment) {
            return Err(StowageError::IllegalArgument(format!(
                "assessment must be between {MIN_ASSESSMENT} and {MAX_ASSESSMENT}, got {assessment}"
            )));
        }
        Ok(Self {
            agent_id,
            reviewer_id,
            assessment,
            description: description.into(),
        })
    }

    pub fn agent_id(&self) -> Uuid {
        self.agent_id
    }

    pub fn reviewer_id(&self) -> Uuid {
        self.reviewer_id
    }

    pub fn assessment(&self) -> u8 {
        self.assessment
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        for a in [1, 2, 3, 4, 5] {
            assert!(CreateReview::new(Uuid::new_v4(), Uuid::new_v4(), a, "ok").is_ok());
        }
    }

    #[test]
    fn out_of_range_is_illegal() {
        for a in [0, 6, u8::MAX] {
            let err = CreateReview::new(Uuid::new_v4(), Uuid::new_v4(), a, "bad").unwrap_err();
            assert!(matches!(err, StowageError::IllegalArgument(_)));
        }
    }
}
