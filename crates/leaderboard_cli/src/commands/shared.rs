use std::sync::Arc;
use std::time::Duration;

use leaderboard::db;
use leaderboard::github::GitHubClient;
use leaderboard::http::reqwest_transport::ReqwestTransport;
use leaderboard::rate_limit::{ApiRateLimiter, Pacer, Unpaced};
use leaderboard::sync::{Discovery, SyncOptions};

use crate::config::Config;

/// Per-request timeout for GitHub API calls.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the GitHub client from configuration.
pub(crate) fn build_client(
    config: &Config,
    no_rate_limit: bool,
) -> Result<GitHubClient, Box<dyn std::error::Error>> {
    let transport = ReqwestTransport::with_timeout(HTTP_TIMEOUT)?;
    let pacer: Arc<dyn Pacer> = if no_rate_limit {
        Arc::new(Unpaced)
    } else {
        Arc::new(ApiRateLimiter::default())
    };

    Ok(
        GitHubClient::new(Arc::new(transport), config.github_token(), pacer)
            .with_api_base(config.github.api_base.as_str()),
    )
}

/// Connect to the catalog, migrate it, and wire up a discovery engine.
pub(crate) async fn build_discovery(
    config: &Config,
    database_url: &str,
    no_rate_limit: bool,
) -> Result<Arc<Discovery>, Box<dyn std::error::Error>> {
    let db = db::connect_and_migrate(database_url).await?;
    let client = build_client(config, no_rate_limit)?;

    if !client.has_token() {
        tracing::info!("No GitHub token configured, only tagged repositories will be found");
    }

    let options = SyncOptions {
        topic: config.sync.topic.clone(),
        ..SyncOptions::default()
    };

    Ok(Arc::new(Discovery::new(client, db, options)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_uses_configured_api_base() {
        let mut config = Config::default();
        config.github.api_base = "http://localhost:9999/".to_string();
        config.github.token = Some("ghp_x".to_string());

        let client = build_client(&config, true).unwrap();
        assert_eq!(client.api_base(), "http://localhost:9999");
        assert!(client.has_token());
    }

    #[test]
    fn test_build_client_treats_empty_token_as_none() {
        let mut config = Config::default();
        config.github.token = Some(String::new());

        let client = build_client(&config, false).unwrap();
        assert!(!client.has_token());
    }

    #[tokio::test]
    async fn test_build_discovery_migrates_and_applies_topic() {
        let mut config = Config::default();
        config.sync.topic = "pinokio-app".to_string();
        config.github.token = Some(String::new());

        let discovery = build_discovery(&config, "sqlite::memory:", true)
            .await
            .unwrap();
        assert_eq!(discovery.options().topic, "pinokio-app");
        assert_eq!(leaderboard::catalog::count(discovery.db()).await.unwrap(), 0);
    }
}
