//! Core data types, forecast aggregation and alert rules for Skycast
//!
//! Everything in this crate except [`dashboard`] is a pure transform over
//! its arguments: no I/O, no shared state. Network access is delegated to
//! the collaborator traits in [`pipeline`].

pub mod alerts;
pub mod conditions;
pub mod dashboard;
pub mod forecast;
pub mod pipeline;
pub mod rainfall;
pub mod rollups;
pub mod types;
pub mod units;

pub use alerts::*;
pub use conditions::*;
pub use dashboard::*;
pub use forecast::*;
pub use pipeline::*;
pub use rainfall::*;
pub use rollups::*;
pub use types::*;
pub use units::*;

use thiserror::Error;

/// Errors raised at the geocoding / weather-data boundary.
///
/// Aggregation and alert evaluation never produce these; they are surfaced
/// to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl DashboardError {
    /// Whether a later attempt could plausibly succeed. Nothing in the
    /// core retries; this is for callers deciding what to show.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed(_))
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fetch_failures_are_retryable() {
        assert!(DashboardError::FetchFailed("timeout".into()).is_retryable());
        assert!(!DashboardError::LocationNotFound("Atlantis".into()).is_retryable());
        assert!(!DashboardError::MalformedResponse("no main".into()).is_retryable());
    }

    #[test]
    fn error_messages_carry_context() {
        let err = DashboardError::LocationNotFound("Atlantis".into());
        assert_eq!(err.to_string(), "Location not found: Atlantis");
    }
}
