//! SurrealDB implementation of [`ReviewRepository`].

use chrono::{DateTime, Utc};
use stowage_core::error::StowageResult;
use stowage_core::models::review::{CreateReview, Review};
use stowage_core::repository::ReviewRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::row::parse_uuid;
use crate::transaction::in_transaction;

/// Store the review and append its id to the agent's collection.
const PERSIST_TX: &str = "\
LET $agent = (SELECT VALUE meta::id(id) FROM type::record('user', $agent_id) \
    WHERE role = 'Agent');
IF array::len($agent) = 0 {
    THROW 'reviewed user is not an agent';
};
CREATE type::record('review', $review_id) SET \
    agent_id = $agent_id, reviewer_id = $reviewer_id, \
    assessment = $assessment, description = $description;
UPDATE type::record('user', $agent_id) SET \
    received_reviews += $review_id, updated_at = time::now();
";

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ReviewRow {
    record_id: String,
    agent_id: String,
    reviewer_id: String,
    assessment: i64,
    description: String,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn try_into_review(self) -> Result<Review, DbError> {
        let assessment = u8::try_from(self.assessment)
            .map_err(|e| DbError::decode("review", format!("invalid assessment: {e}")))?;
        Ok(Review {
            id: parse_uuid("review", "record", &self.record_id)?,
            agent_id: parse_uuid("review", "agent", &self.agent_id)?,
            reviewer_id: parse_uuid("review", "reviewer", &self.reviewer_id)?,
            assessment,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Review repository.
#[derive(Clone)]
pub struct SurrealReviewRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReviewRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ReviewRepository for SurrealReviewRepository<C> {
    async fn persist(&self, input: CreateReview) -> StowageResult<Review> {
        let review_id = Uuid::new_v4();
        let review_id_str = review_id.to_string();

        in_transaction(&self.db, PERSIST_TX, |q| {
            q.bind(("review_id", review_id_str.clone()))
                .bind(("agent_id", input.agent_id().to_string()))
                .bind(("reviewer_id", input.reviewer_id().to_string()))
                .bind(("assessment", i64::from(input.assessment())))
                .bind(("description", input.description().to_string()))
        })
        .await?;

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('review', $id)")
            .bind(("id", review_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("review", review_id_str))?;

        Ok(row.try_into_review()?)
    }

    async fn list_for_agent(&self, agent_id: Uuid) -> StowageResult<Vec<Review>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM review \
                 WHERE agent_id = $agent_id ORDER BY created_at ASC",
            )
            .bind(("agent_id", agent_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;

        let reviews = rows
            .into_iter()
            .map(|row| row.try_into_review())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(reviews)
    }
}
