//! Retry policy for transient database failures.
//!
//! Network requests are never retried; pacing is handled up front by
//! [`crate::rate_limit`]. Only catalog writes go through this module.

use std::time::Duration;

use backon::ExponentialBuilder;
use sea_orm::DbErr;

/// Default number of retry attempts for catalog writes.
pub const DEFAULT_DB_RETRIES: usize = 3;

/// Initial backoff delay for catalog write retries.
pub const DEFAULT_DB_BACKOFF_MS: u64 = 100;

const MAX_DB_BACKOFF_MS: u64 = 2_000;

/// Configuration for retry operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Minimum delay between retries.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(DEFAULT_DB_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_DB_BACKOFF_MS),
            max_retries: DEFAULT_DB_RETRIES,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Default delays with a custom attempt count.
    #[must_use]
    pub fn with_max_retries(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Set whether to use jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Whether a database error is transient and worth retrying.
///
/// Covers SQLite lock contention, dropped connections and timeouts.
pub fn is_retryable_db_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(_) | DbErr::Query(_) => {
            let err_str = err.to_string().to_lowercase();
            err_str.contains("locked")
                || err_str.contains("busy")
                || err_str.contains("timeout")
                || err_str.contains("connection")
                || err_str.contains("temporarily unavailable")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;

    #[test]
    fn default_config_uses_db_constants() {
        let config = RetryConfig::default();
        assert_eq!(config.min_delay, Duration::from_millis(DEFAULT_DB_BACKOFF_MS));
        assert_eq!(config.max_delay, Duration::from_millis(MAX_DB_BACKOFF_MS));
        assert_eq!(config.max_retries, DEFAULT_DB_RETRIES);
        assert!(config.with_jitter);
    }

    #[test]
    fn with_max_retries_keeps_delays() {
        let config = RetryConfig::with_max_retries(7).with_jitter(false);
        assert_eq!(config.max_retries, 7);
        assert_eq!(config.min_delay, Duration::from_millis(DEFAULT_DB_BACKOFF_MS));
        assert!(!config.with_jitter);
        let _backoff = config.into_backoff();
    }

    #[test]
    fn lock_and_connection_errors_are_retryable() {
        assert!(is_retryable_db_error(&DbErr::Conn(RuntimeErr::Internal(
            "refused".into()
        ))));
        assert!(is_retryable_db_error(&DbErr::Exec(RuntimeErr::Internal(
            "database is locked".into()
        ))));
        assert!(is_retryable_db_error(&DbErr::Query(RuntimeErr::Internal(
            "statement timeout".into()
        ))));
    }

    #[test]
    fn logic_errors_are_not_retryable() {
        assert!(!is_retryable_db_error(&DbErr::Exec(RuntimeErr::Internal(
            "UNIQUE constraint failed".into()
        ))));
        assert!(!is_retryable_db_error(&DbErr::RecordNotFound("x".into())));
        assert!(!is_retryable_db_error(&DbErr::Custom("bad".into())));
    }
}
