//! Stowage Rental — the rental request / agreement lifecycle and agent
//! reviews, on top of the `stowage-core` repository traits.

pub mod config;
pub mod error;
pub mod review;
pub mod service;

pub use config::RentalConfig;
pub use error::LifecycleOp;
pub use review::ReviewService;
pub use service::{RentalRequestInput, RentalService, RequestRound};
