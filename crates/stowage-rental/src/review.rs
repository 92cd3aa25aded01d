//! Review service — agents receive ratings from owners and tenants.

use stowage_core::error::{StowageError, StowageResult};
use stowage_core::models::review::{CreateReview, Review};
use stowage_core::models::session::SessionContext;
use stowage_core::repository::ReviewRepository;
use tracing::info;
use uuid::Uuid;

use crate::error::LifecycleOp;

pub struct ReviewService<V: ReviewRepository> {
    review_repo: V,
}

impl<V: ReviewRepository> ReviewService<V> {
    pub fn new(review_repo: V) -> Self {
        Self { review_repo }
    }

    /// Rate `agent_id` as the acting user.
    ///
    /// The assessment is validated when the review value is built and
    /// fails with [`StowageError::IllegalArgument`] outside `1..=5`.
    pub async fn create_and_persist_review(
        &self,
        ctx: &SessionContext,
        agent_id: Uuid,
        assessment: u8,
        description: &str,
    ) -> StowageResult<Review> {
        let review = CreateReview::new(agent_id, ctx.user_id, assessment, description)?;
        if agent_id == ctx.user_id {
            return Err(StowageError::denied("agents cannot review themselves"));
        }

        let review = self
            .review_repo
            .persist(review)
            .await
            .map_err(|e| LifecycleOp::PersistReview.fail(e))?;

        info!(review_id = %review.id, agent_id = %agent_id, "Review persisted");

        Ok(review)
    }

    pub async fn reviews_for_agent(&self, agent_id: Uuid) -> StowageResult<Vec<Review>> {
        self.review_repo.list_for_agent(agent_id).await
    }
}
