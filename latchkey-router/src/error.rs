//! Router-layer errors, distinct from the domain error taxonomy a tool
//! call surfaces — these are about reaching and parsing a model backend,
//! not about filesystem outcomes.

use std::time::Duration;
use thiserror::Error;

/// Errors from routing a message to a model or talking to a backend.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RouterError {
    /// No worker models are registered or reachable at all.
    #[error("no worker models available")]
    NoWorkersAvailable,

    /// The backend HTTP request failed outright.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The backend returned a non-2xx status.
    #[error("backend error (status {status}): {body}")]
    BackendStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The backend's response body could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request exceeded its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl From<RouterError> for latchkey_core::error::DomainError {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::Timeout(d) => Self::Timeout(format!("router: {d:?}")),
            other => Self::ModelUnavailable(other.to_string()),
        }
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> RouterError {
    if err.is_timeout() {
        RouterError::Timeout(Duration::from_secs(30))
    } else {
        RouterError::RequestFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_domain_timeout() {
        let domain: latchkey_core::error::DomainError = RouterError::Timeout(Duration::from_secs(5)).into();
        assert!(matches!(domain, latchkey_core::error::DomainError::Timeout(_)));
    }

    #[test]
    fn backend_status_maps_to_model_unavailable() {
        let domain: latchkey_core::error::DomainError =
            RouterError::BackendStatus { status: 500, body: "oops".into() }.into();
        assert!(matches!(domain, latchkey_core::error::DomainError::ModelUnavailable(_)));
    }
}
