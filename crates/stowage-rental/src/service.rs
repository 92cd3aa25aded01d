//! Rental lifecycle service — request rounds, acceptance, decline and
//! agreement creation.

use std::collections::HashSet;

use chrono::NaiveDate;
use stowage_core::error::{StowageError, StowageResult};
use stowage_core::models::rental_agreement::{
    CreateRentalAgreement, NewRentalAgreement, RentalAgreement,
};
use stowage_core::models::rental_request::{
    CreateRequestDetails, RentalRequest, RequestDetails, RequestStatus,
};
use stowage_core::models::session::SessionContext;
use stowage_core::models::tenant::NewTenant;
use stowage_core::models::user::UserRole;
use stowage_core::models::warehouse::{Warehouse, WarehouseStatus};
use stowage_core::repository::{
    RentalAgreementRepository, RentalRequestRepository, UserRepository, WarehouseRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::config::RentalConfig;
use crate::error::LifecycleOp;

/// Input for sending a warehouse to a set of agents.
#[derive(Debug, Clone)]
pub struct RentalRequestInput {
    pub warehouse_id: Uuid,
    pub agent_ids: Vec<Uuid>,
    /// Monthly price in cents.
    pub monthly_price_cents: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// The records created by one request round.
#[derive(Debug, Clone)]
pub struct RequestRound {
    pub details: RequestDetails,
    pub requests: Vec<RentalRequest>,
}

/// Rental lifecycle service.
///
/// Generic over repository implementations so that the lifecycle layer
/// has no dependency on the database crate. Every operation takes the
/// acting session explicitly.
pub struct RentalService<U, W, R, A>
where
    U: UserRepository,
    W: WarehouseRepository,
    R: RentalRequestRepository,
    A: RentalAgreementRepository,
{
    user_repo: U,
    warehouse_repo: W,
    request_repo: R,
    agreement_repo: A,
    config: RentalConfig,
}

impl<U, W, R, A> RentalService<U, W, R, A>
where
    U: UserRepository,
    W: WarehouseRepository,
    R: RentalRequestRepository,
    A: RentalAgreementRepository,
{
    pub fn new(
        user_repo: U,
        warehouse_repo: W,
        request_repo: R,
        agreement_repo: A,
        config: RentalConfig,
    ) -> Self {
        Self {
            user_repo,
            warehouse_repo,
            request_repo,
            agreement_repo,
            config,
        }
    }

    /// Ask every agent in `input.agent_ids` to find a tenant for the
    /// warehouse.
    ///
    /// The warehouse must be `Available`. All requests are persisted
    /// before the warehouse moves to `PendingRental`; if that last step
    /// fails the requests stay in place and an error is returned.
    pub async fn create_rental_requests(
        &self,
        ctx: &SessionContext,
        input: RentalRequestInput,
    ) -> StowageResult<RequestRound> {
        let op = LifecycleOp::CreateRequests;

        // 1. Load the warehouse and check ownership and status.
        let warehouse = self
            .warehouse_repo
            .get_by_id(input.warehouse_id)
            .await
            .map_err(|e| op.fail(e))?;
        ctx.require_self_or_admin(warehouse.owner_id, "solicit agents for this warehouse")?;

        if !warehouse.accepts_requests() {
            return Err(op.reject(format!(
                "warehouse {} is {:?}{}, not Available",
                warehouse.id,
                warehouse.status,
                if warehouse.deleted { " (deleted)" } else { "" },
            )));
        }

        // 2. Field-level validation.
        let details = CreateRequestDetails {
            warehouse_id: warehouse.id,
            monthly_price_cents: input.monthly_price_cents,
            start_date: input.start_date,
            end_date: input.end_date,
        };
        details.validate(self.config.min_lease_days)?;
        self.validate_agents(&input.agent_ids).await?;

        // 3. Persist details and one request per agent, all or nothing.
        let (details, requests) = self
            .request_repo
            .create_batch(details, &input.agent_ids)
            .await
            .map_err(|e| op.fail(e))?;

        // 4. Only now move the warehouse out of Available.
        let moved = self
            .warehouse_repo
            .transition_status(
                warehouse.id,
                WarehouseStatus::Available,
                WarehouseStatus::PendingRental,
            )
            .await
            .map_err(|e| op.fail(e))?;
        if !moved {
            return Err(op.reject(format!(
                "warehouse {} left Available while requests were created",
                warehouse.id
            )));
        }

        info!(
            warehouse_id = %warehouse.id,
            agents = requests.len(),
            "Rental requests created"
        );

        Ok(RequestRound { details, requests })
    }

    async fn validate_agents(&self, agent_ids: &[Uuid]) -> StowageResult<()> {
        if agent_ids.is_empty() {
            return Err(StowageError::validation("at least one agent is required"));
        }
        if agent_ids.len() > self.config.max_agents_per_request {
            return Err(StowageError::validation(format!(
                "at most {} agents may be asked at once",
                self.config.max_agents_per_request
            )));
        }
        let unique: HashSet<_> = agent_ids.iter().collect();
        if unique.len() != agent_ids.len() {
            return Err(StowageError::validation("agent list contains duplicates"));
        }

        for agent_id in agent_ids {
            let user = match self.user_repo.get_by_id(*agent_id).await {
                Ok(user) => user,
                Err(StowageError::NotFound { .. }) => {
                    return Err(StowageError::validation(format!(
                        "agent {agent_id} does not exist"
                    )));
                }
                Err(e) => return Err(LifecycleOp::CreateRequests.fail(e)),
            };
            if user.role != UserRole::Agent {
                return Err(StowageError::validation(format!(
                    "user {agent_id} is not an agent"
                )));
            }
        }

        Ok(())
    }

    /// Accept a pending request on behalf of its agent.
    ///
    /// Acceptance is atomic: the request flips to `Accepted` only if it is
    /// still pending and valid, and the other agents' requests for the
    /// warehouse are invalidated in the same step. An agent that lost the
    /// race gets a "taken by another agent" error.
    pub async fn accept_rental_request(
        &self,
        ctx: &SessionContext,
        request_id: Uuid,
    ) -> StowageResult<RentalRequest> {
        let op = LifecycleOp::AcceptRequest;

        let request = self.load_request(op, request_id).await?;
        ctx.require_self_or_admin(request.agent_id, "accept this rental request")?;

        let accepted = self
            .request_repo
            .accept(request_id)
            .await
            .map_err(|e| op.fail(e))?;

        if !accepted.is_accepted() {
            return Err(op.reject(format!(
                "rental request {request_id} was taken by another agent"
            )));
        }

        info!(
            request_id = %request_id,
            warehouse_id = %accepted.warehouse_id,
            agent_id = %accepted.agent_id,
            "Rental request accepted"
        );

        Ok(accepted)
    }

    /// Decline a request on behalf of its agent.
    ///
    /// The request is marked declined and invalid. When it was the last
    /// valid request of its warehouse, the warehouse returns to
    /// `Available`.
    pub async fn decline_rental_request(
        &self,
        ctx: &SessionContext,
        request_id: Uuid,
    ) -> StowageResult<RentalRequest> {
        let op = LifecycleOp::DeclineRequest;

        let request = self.load_request(op, request_id).await?;
        ctx.require_self_or_admin(request.agent_id, "decline this rental request")?;

        let declined = self
            .request_repo
            .decline(request_id)
            .await
            .map_err(|e| op.fail(e))?;

        info!(
            request_id = %request_id,
            warehouse_id = %declined.warehouse_id,
            "Rental request declined"
        );

        Ok(declined)
    }

    /// Turn an accepted request into a rental agreement.
    ///
    /// A new tenant is always created from the supplied details. The
    /// agreement, the tenant, the request invalidation and the warehouse
    /// moving to `Rented` are recorded in a single transaction.
    pub async fn create_rental_agreement(
        &self,
        ctx: &SessionContext,
        input: CreateRentalAgreement,
    ) -> StowageResult<RentalAgreement> {
        let op = LifecycleOp::CreateAgreement;

        validate_tenant(&input.tenant)?;
        ctx.require_self_or_admin(input.agent_id, "record an agreement for this agent")?;

        // 1. The originating request must be this agent's open acceptance.
        let request = self
            .request_repo
            .get_by_id(input.request_id)
            .await
            .map_err(|e| op.fail(e))?;
        if request.agent_id != input.agent_id || request.warehouse_id != input.warehouse_id {
            return Err(op.reject(format!(
                "rental request {} does not belong to agent {} and warehouse {}",
                request.id, input.agent_id, input.warehouse_id
            )));
        }
        if !request.is_accepted() {
            return Err(op.reject(format!(
                "rental request {} is not an open accepted request",
                request.id
            )));
        }

        // 2. Dates and price come from the request round.
        let details = self
            .request_repo
            .get_details(request.details_id)
            .await
            .map_err(|e| op.fail(e))?;

        // 3. Record everything at once.
        let agreement = self
            .agreement_repo
            .save(NewRentalAgreement {
                request_id: request.id,
                warehouse_id: request.warehouse_id,
                agent_id: request.agent_id,
                tenant: input.tenant,
                start_date: details.start_date,
                end_date: details.end_date,
                monthly_price_cents: details.monthly_price_cents,
            })
            .await
            .map_err(|e| op.fail(e))?;

        info!(
            agreement_id = %agreement.id,
            warehouse_id = %agreement.warehouse_id,
            tenant_id = %agreement.tenant_id,
            "Rental agreement created"
        );

        Ok(agreement)
    }

    /// Warehouses of the acting owner that can be offered to agents.
    pub async fn available_warehouses(&self, ctx: &SessionContext) -> StowageResult<Vec<Warehouse>> {
        self.warehouse_repo.find_available_by_owner(ctx.user_id).await
    }

    /// Open requests addressed to the acting agent.
    pub async fn pending_requests_for_agent(
        &self,
        ctx: &SessionContext,
    ) -> StowageResult<Vec<RentalRequest>> {
        ctx.require_role(UserRole::Agent, "listing rental requests")?;
        self.request_repo
            .find_all_by_status_and_agent(RequestStatus::Pending, ctx.user_id)
            .await
    }

    /// Accepted requests of the acting agent still waiting for an agreement.
    pub async fn accepted_requests_for_agent(
        &self,
        ctx: &SessionContext,
    ) -> StowageResult<Vec<RentalRequest>> {
        ctx.require_role(UserRole::Agent, "listing rental requests")?;
        self.request_repo
            .find_all_by_status_and_agent(RequestStatus::Accepted, ctx.user_id)
            .await
    }

    /// Requests of a warehouse, visible to its owner.
    pub async fn requests_for_warehouse(
        &self,
        ctx: &SessionContext,
        warehouse_id: Uuid,
        include_invalid: bool,
    ) -> StowageResult<Vec<RentalRequest>> {
        let warehouse = self.warehouse_repo.get_by_id(warehouse_id).await?;
        ctx.require_self_or_admin(warehouse.owner_id, "view requests of this warehouse")?;
        self.request_repo
            .find_all_by_warehouse(warehouse_id, include_invalid)
            .await
    }

    async fn load_request(&self, op: LifecycleOp, request_id: Uuid) -> StowageResult<RentalRequest> {
        match self.request_repo.get_by_id(request_id).await {
            Ok(request) => Ok(request),
            Err(StowageError::NotFound { .. }) => {
                Err(op.reject(format!("rental request {request_id} not found")))
            }
            Err(e) => Err(op.fail(e)),
        }
    }
}

fn validate_tenant(tenant: &NewTenant) -> StowageResult<()> {
    for (field, value) in [
        ("first name", &tenant.first_name),
        ("last name", &tenant.last_name),
        ("company", &tenant.company),
    ] {
        if value.trim().is_empty() {
            return Err(StowageError::validation(format!(
                "tenant {field} must not be empty"
            )));
        }
    }
    Ok(())
}
