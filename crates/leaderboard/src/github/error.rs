//! GitHub API error types.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Primary or secondary quota exhausted (HTTP 403 or 429).
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The request never produced a usable response (network failure,
    /// unparseable body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("GitHub API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A single repository detail lookup failed.
    #[error("Failed to fetch details for {full_name}: {reason}")]
    DetailNotFound { full_name: String, reason: String },
}

impl GitHubError {
    /// Check if this error is a rate limit error.
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

impl From<HttpError> for GitHubError {
    fn from(e: HttpError) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Status codes GitHub uses to signal an exhausted quota.
#[inline]
pub fn is_rate_limit_status(status: u16) -> bool {
    status == 403 || status == 429
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_statuses() {
        assert!(is_rate_limit_status(403));
        assert!(is_rate_limit_status(429));
        assert!(!is_rate_limit_status(401));
        assert!(!is_rate_limit_status(404));
        assert!(!is_rate_limit_status(200));
    }

    #[test]
    fn is_rate_limited_only_for_rate_limited_variant() {
        assert!(GitHubError::RateLimited("slow down".into()).is_rate_limited());
        assert!(!GitHubError::Transport("reset".into()).is_rate_limited());
        assert!(
            !GitHubError::Api {
                status: 422,
                message: "Validation Failed".into()
            }
            .is_rate_limited()
        );
    }

    #[test]
    fn http_errors_become_transport_errors() {
        let err: GitHubError = HttpError::Transport("connection refused".into()).into();
        match err {
            GitHubError::Transport(msg) => assert!(msg.contains("connection refused")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn detail_not_found_names_the_repository() {
        let err = GitHubError::DetailNotFound {
            full_name: "octo/app".into(),
            reason: "Not Found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("octo/app"));
        assert!(msg.contains("Not Found"));
    }
}
