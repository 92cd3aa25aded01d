//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations perform each
//! call as its own short-lived unit of work; the multi-step lifecycle
//! writes (`accept`, `decline`, agreement `save`, review `persist`) are
//! atomic.

use uuid::Uuid;

use crate::error::StowageResult;
use crate::models::{
    rental_agreement::{NewRentalAgreement, RentalAgreement},
    rental_request::{CreateRequestDetails, RentalRequest, RequestDetails, RequestStatus},
    review::{CreateReview, Review},
    tenant::Tenant,
    user::{CreateUser, User, UserRole},
    warehouse::{CreateWarehouse, UpdateWarehouse, Warehouse, WarehouseStatus},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = StowageResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StowageResult<User>> + Send;
    fn get_by_username(&self, username: &str)
    -> impl Future<Output = StowageResult<User>> + Send;
    fn list_by_role(&self, role: UserRole) -> impl Future<Output = StowageResult<Vec<User>>> + Send;
}

pub trait TenantRepository: Send + Sync {
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StowageResult<Tenant>> + Send;
}

// ---------------------------------------------------------------------------
// Warehouses
// ---------------------------------------------------------------------------

pub trait WarehouseRepository: Send + Sync {
    fn create(&self, input: CreateWarehouse)
    -> impl Future<Output = StowageResult<Warehouse>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StowageResult<Warehouse>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateWarehouse,
    ) -> impl Future<Output = StowageResult<Warehouse>> + Send;
    /// Soft-delete: sets `deleted`. Refused while a rental is pending.
    fn delete(&self, id: Uuid) -> impl Future<Output = StowageResult<()>> + Send;
    fn list_by_owner(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = StowageResult<PaginatedResult<Warehouse>>> + Send;
    /// Non-deleted warehouses of `owner_id` in status `Available`.
    fn find_available_by_owner(
        &self,
        owner_id: Uuid,
    ) -> impl Future<Output = StowageResult<Vec<Warehouse>>> + Send;
    /// Unconditionally set the status.
    fn update_status(
        &self,
        id: Uuid,
        status: WarehouseStatus,
    ) -> impl Future<Output = StowageResult<()>> + Send;
    /// Set the status only if it currently equals `from`.
    ///
    /// Returns `false` when the warehouse was not in `from`.
    fn transition_status(
        &self,
        id: Uuid,
        from: WarehouseStatus,
        to: WarehouseStatus,
    ) -> impl Future<Output = StowageResult<bool>> + Send;
}

// ---------------------------------------------------------------------------
// Rental requests
// ---------------------------------------------------------------------------

pub trait RentalRequestRepository: Send + Sync {
    /// Persist one details record and one `Pending` request per agent,
    /// all or nothing.
    fn create_batch(
        &self,
        details: CreateRequestDetails,
        agent_ids: &[Uuid],
    ) -> impl Future<Output = StowageResult<(RequestDetails, Vec<RentalRequest>)>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StowageResult<RentalRequest>> + Send;
    fn get_details(
        &self,
        details_id: Uuid,
    ) -> impl Future<Output = StowageResult<RequestDetails>> + Send;
    fn find_all_by_warehouse(
        &self,
        warehouse_id: Uuid,
        include_invalid: bool,
    ) -> impl Future<Output = StowageResult<Vec<RentalRequest>>> + Send;
    /// Valid requests of `agent_id` in `status`.
    fn find_all_by_status_and_agent(
        &self,
        status: RequestStatus,
        agent_id: Uuid,
    ) -> impl Future<Output = StowageResult<Vec<RentalRequest>>> + Send;
    fn set_status(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> impl Future<Output = StowageResult<()>> + Send;
    fn set_invalid(&self, id: Uuid, invalid: bool)
    -> impl Future<Output = StowageResult<()>> + Send;

    /// Atomically accept `id` if it is still pending and valid, and
    /// invalidate every other agent's valid request for the same
    /// warehouse. Returns the request as stored afterwards; if acceptance
    /// lost a race the returned request is not accepted.
    fn accept(&self, id: Uuid) -> impl Future<Output = StowageResult<RentalRequest>> + Send;

    /// Atomically mark `id` declined and invalid. If no valid request is
    /// left for the warehouse, move it from `PendingRental` back to
    /// `Available`. Returns the declined request.
    fn decline(&self, id: Uuid) -> impl Future<Output = StowageResult<RentalRequest>> + Send;
}

// ---------------------------------------------------------------------------
// Agreements & reviews
// ---------------------------------------------------------------------------

pub trait RentalAgreementRepository: Send + Sync {
    /// Record a rent-out in one transaction: create the tenant, create
    /// the agreement, invalidate the originating (accepted) request and
    /// mark the warehouse `Rented`.
    fn save(
        &self,
        input: NewRentalAgreement,
    ) -> impl Future<Output = StowageResult<RentalAgreement>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StowageResult<RentalAgreement>> + Send;
    fn list_by_agent(
        &self,
        agent_id: Uuid,
    ) -> impl Future<Output = StowageResult<Vec<RentalAgreement>>> + Send;
    fn list_by_warehouse(
        &self,
        warehouse_id: Uuid,
    ) -> impl Future<Output = StowageResult<Vec<RentalAgreement>>> + Send;
}

pub trait ReviewRepository: Send + Sync {
    /// Store the review and append its id to the agent's received reviews.
    fn persist(&self, input: CreateReview) -> impl Future<Output = StowageResult<Review>> + Send;
    fn list_for_agent(
        &self,
        agent_id: Uuid,
    ) -> impl Future<Output = StowageResult<Vec<Review>>> + Send;
}
