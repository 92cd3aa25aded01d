//! Rental lifecycle configuration.

/// Configuration for the rental services.
#[derive(Debug, Clone)]
pub struct RentalConfig {
    /// Upper bound on agents solicited in one request round (default: 10).
    pub max_agents_per_request: usize,
    /// Shortest lease accepted, in days (default: 1).
    pub min_lease_days: i64,
}

impl Default for RentalConfig {
    fn default() -> Self {
        Self {
            max_agents_per_request: 10,
            min_lease_days: 1,
        }
    }
}
