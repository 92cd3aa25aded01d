//! Domain models for Stowage.
//!
//! These are the core types shared across all crates.

pub mod rental_agreement;
pub mod rental_request;
pub mod review;
pub mod session;
pub mod tenant;
pub mod user;
pub mod warehouse;
