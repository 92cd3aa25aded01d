//! Stowage Core — domain models, error taxonomy and repository traits
//! for the warehouse rental lifecycle.

pub mod error;
pub mod models;
pub mod repository;
