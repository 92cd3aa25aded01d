//! SurrealDB repository implementations.

mod rental_agreement;
mod rental_request;
mod review;
mod row;
mod tenant;
mod user;
mod warehouse;

pub use rental_agreement::SurrealRentalAgreementRepository;
pub use rental_request::SurrealRentalRequestRepository;
pub use review::SurrealReviewRepository;
pub use tenant::SurrealTenantRepository;
pub use user::SurrealUserRepository;
pub use warehouse::SurrealWarehouseRepository;
