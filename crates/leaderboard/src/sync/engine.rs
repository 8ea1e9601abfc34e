//! The discovery orchestrator.
//!
//! A sync runs five strictly sequential phases:
//!
//! 1. tag search (required; failure aborts the sync)
//! 2. code search for each configured filename (only with a token)
//! 3. detail lookups for repositories only code search found
//! 4. merge, one entry per repository ID, later phases winning
//! 5. classify and upsert into the catalog

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::catalog::{self, CatalogEntry};
use crate::entity::catalog_tier::CatalogTier;
use crate::github::{GitHubClient, RepoMap, to_catalog_entry};

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{
    CodeSearchReport, DiscoveryResult, PhaseResult, SyncError, SyncOptions, SyncOutcome,
    SyncSummary,
};

/// Merge per-phase maps in order; a later map overwrites earlier entries
/// with the same ID.
pub fn merge_phases<'a>(phases: impl IntoIterator<Item = &'a RepoMap>) -> RepoMap {
    let mut merged = RepoMap::new();
    for phase in phases {
        merged.extend(phase.iter().map(|(id, repo)| (*id, repo.clone())));
    }
    merged
}

/// `owner/name` of every code-search hit not already found by tag search.
fn backfill_candidates(tagged: &RepoMap, code_hits: &RepoMap) -> Vec<String> {
    let mut seen = BTreeSet::new();
    code_hits
        .iter()
        .filter(|(id, _)| !tagged.contains_key(*id))
        .map(|(_, repo)| repo.full_name.clone())
        .filter(|full_name| seen.insert(full_name.clone()))
        .collect()
}

/// Runs syncs against one GitHub client and one catalog database.
///
/// Only one sync runs at a time; an overlapping call is rejected.
pub struct Discovery {
    client: GitHubClient,
    db: DatabaseConnection,
    options: SyncOptions,
    in_flight: Mutex<()>,
}

impl Discovery {
    pub fn new(client: GitHubClient, db: DatabaseConnection, options: SyncOptions) -> Self {
        Self {
            client,
            db,
            options,
            in_flight: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Discover, classify and persist.
    ///
    /// Never returns an error: failures become [`SyncOutcome::Failed`] and a
    /// call made while another sync runs becomes [`SyncOutcome::Rejected`].
    pub async fn sync(&self, on_progress: Option<&ProgressCallback>) -> SyncOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Sync requested while another sync is running");
            return SyncOutcome::failed(&SyncError::AlreadyRunning);
        };

        let started = Instant::now();
        match self.run(on_progress).await {
            Ok(summary) => {
                info!(
                    total = summary.total,
                    verified = summary.verified,
                    community = summary.community,
                    from_tag_search = summary.from_tag_search,
                    from_code_search = summary.from_code_search,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Sync complete"
                );
                SyncOutcome::Completed(summary)
            }
            Err(e) => {
                error!(error = %e, "Sync failed");
                SyncOutcome::failed(&e)
            }
        }
    }

    /// Sync only if the catalog has no entries yet.
    ///
    /// Returns `None` when the catalog is already populated.
    pub async fn sync_if_empty(&self, on_progress: Option<&ProgressCallback>) -> Option<SyncOutcome> {
        match catalog::count(&self.db).await {
            Ok(0) => {
                info!("Catalog is empty, running initial sync");
                Some(self.sync(on_progress).await)
            }
            Ok(existing) => {
                debug!(existing, "Catalog already populated, skipping initial sync");
                None
            }
            Err(e) => Some(SyncOutcome::failed(&SyncError::Catalog(e))),
        }
    }

    async fn run(&self, on_progress: Option<&ProgressCallback>) -> Result<SyncSummary, SyncError> {
        let discovered = self.discover(on_progress).await?;

        let entries: Vec<CatalogEntry> = discovered.repos.values().map(to_catalog_entry).collect();
        let verified = entries
            .iter()
            .filter(|e| e.tier == CatalogTier::Verified)
            .count();

        emit(on_progress, SyncProgress::Persisting { count: entries.len() });
        catalog::upsert_entries_with_retry(&self.db, &entries, Utc::now(), self.options.db_retries)
            .await?;

        let summary = SyncSummary {
            verified,
            community: entries.len() - verified,
            total: entries.len(),
            from_tag_search: discovered.from_tag_search,
            from_code_search: discovered.from_code_search(),
            code_search_skipped: discovered.code_search_skipped,
            code_search_failures: discovered
                .code_search
                .iter()
                .filter(|r| r.error.is_some())
                .count(),
            detail_failures: discovered.detail_failures,
        };

        emit(
            on_progress,
            SyncProgress::SyncComplete {
                total: summary.total,
                verified: summary.verified,
                community: summary.community,
            },
        );
        Ok(summary)
    }

    /// Run the network phases and merge, without touching the catalog.
    pub async fn discover(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<DiscoveryResult, SyncError> {
        let tagged = self.tag_search(on_progress).await?;

        let code_search_skipped = !self.client.has_token();
        let (code_hits, code_search) = if code_search_skipped {
            info!("No GitHub token configured, skipping code search");
            emit(on_progress, SyncProgress::CodeSearchSkipped);
            (PhaseResult::new(RepoMap::new()), Vec::new())
        } else {
            self.code_search(on_progress).await
        };

        let candidates = backfill_candidates(&tagged, &code_hits.data);
        let details = self.fetch_details(&candidates, on_progress).await;

        let repos = merge_phases([&tagged, &details.data]);
        let from_tag_search = repos.keys().filter(|id| tagged.contains_key(*id)).count();

        Ok(DiscoveryResult {
            repos,
            from_tag_search,
            code_search_skipped,
            code_search,
            detail_failures: details.errors.len(),
        })
    }

    async fn tag_search(&self, on_progress: Option<&ProgressCallback>) -> Result<RepoMap, SyncError> {
        let topic = self.options.topic.as_str();
        info!(topic, "Searching repositories by topic");
        emit(
            on_progress,
            SyncProgress::TagSearchStarted {
                topic: topic.to_string(),
            },
        );

        let repos = self
            .client
            .search_by_topic(topic)
            .await
            .map_err(SyncError::TagSearch)?;

        let tagged: RepoMap = repos.into_iter().map(|r| (r.id, r)).collect();
        info!(topic, found = tagged.len(), "Topic search complete");
        emit(
            on_progress,
            SyncProgress::TagSearchComplete {
                found: tagged.len(),
            },
        );
        Ok(tagged)
    }

    async fn code_search(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> (PhaseResult<RepoMap>, Vec<CodeSearchReport>) {
        let mut phase = PhaseResult::new(RepoMap::new());
        let mut reports = Vec::with_capacity(self.options.code_search_filenames.len());

        for filename in &self.options.code_search_filenames {
            info!(filename, "Crawling code search");
            emit(
                on_progress,
                SyncProgress::CodeSearchStarted {
                    filename: filename.clone(),
                },
            );

            let outcome = self.client.crawl_code_search(filename, on_progress).await;
            let error = outcome.error.as_ref().map(ToString::to_string);
            if let Some(message) = &error {
                warn!(filename, error = %message, "Code search ended early");
            }

            let report = CodeSearchReport {
                filename: filename.clone(),
                found: outcome.repos.len(),
                pages: outcome.pages_fetched,
                exhausted: outcome.exhausted,
                error: error.clone(),
            };
            info!(
                filename,
                found = report.found,
                pages = report.pages,
                "Code search complete"
            );
            emit(
                on_progress,
                SyncProgress::CodeSearchComplete {
                    filename: filename.clone(),
                    found: report.found,
                    pages: report.pages,
                    error,
                },
            );

            phase.data.extend(outcome.repos);
            phase.errors.extend(outcome.error);
            reports.push(report);
        }

        (phase, reports)
    }

    async fn fetch_details(
        &self,
        candidates: &[String],
        on_progress: Option<&ProgressCallback>,
    ) -> PhaseResult<RepoMap> {
        let mut phase = PhaseResult::new(RepoMap::new());
        if candidates.is_empty() {
            return phase;
        }

        info!(count = candidates.len(), "Fetching details for code-search repositories");
        emit(
            on_progress,
            SyncProgress::FetchingDetails {
                count: candidates.len(),
            },
        );

        let batch_size = self.options.detail_batch_size.max(1);
        for (index, full_name) in candidates.iter().enumerate() {
            match self.client.get_repo(full_name).await {
                Ok(repo) if repo.fork => {
                    debug!(full_name, "Skipping fork found by detail lookup");
                }
                Ok(repo) => {
                    phase.data.insert(repo.id, repo);
                }
                Err(e) => {
                    warn!(full_name, error = %e, "Detail lookup failed, skipping");
                    emit(
                        on_progress,
                        SyncProgress::DetailFailed {
                            full_name: full_name.clone(),
                            error: e.to_string(),
                        },
                    );
                    phase.errors.push(e);
                }
            }

            let done = index + 1;
            if done % batch_size == 0 || done == candidates.len() {
                debug!(done, total = candidates.len(), "Detail batch complete");
                emit(
                    on_progress,
                    SyncProgress::DetailBatchComplete {
                        done,
                        total: candidates.len(),
                    },
                );
            }
        }

        emit(
            on_progress,
            SyncProgress::DetailsComplete {
                fetched: phase.data.len(),
                failed: phase.errors.len(),
            },
        );
        phase
    }
}


#[cfg(all(test, feature = "sqlite", feature = "migrate"))]
mod sync_tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use sea_orm::EntityTrait;
    use serde_json::{Value, json};

    use super::*;
    use crate::db::connect_and_migrate;
    use crate::entity::catalog_entry::Entity as CatalogEntryEntity;
    use crate::github::testing::repo_json;
    use crate::http::MockTransport;
    use crate::rate_limit::testing::RecordingPacer;
    use crate::rate_limit::{Lane, Pacer, Unpaced};

    async fn setup(token: Option<&str>) -> (MockTransport, Discovery) {
        setup_paced(token, Arc::new(Unpaced)).await
    }

    async fn setup_paced(token: Option<&str>, pacer: Arc<dyn Pacer>) -> (MockTransport, Discovery) {
        let transport = MockTransport::new();
        let client = GitHubClient::new(
            Arc::new(transport.clone()),
            token.map(str::to_string),
            pacer,
        );
        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("in-memory database");
        (transport, Discovery::new(client, db, SyncOptions::default()))
    }

    fn search_page(items: Vec<Value>) -> Value {
        json!({"total_count": items.len(), "incomplete_results": false, "items": items})
    }

    fn code_page(repos: Vec<Value>) -> Value {
        let items: Vec<Value> = repos
            .into_iter()
            .map(|repo| json!({"path": "pinokio.js", "repository": repo}))
            .collect();
        json!({"total_count": items.len(), "items": items})
    }

    /// Code search shape: no counters or topics.
    fn code_repo(id: i64, owner: &str, name: &str, fork: bool) -> Value {
        json!({
            "id": id,
            "name": name,
            "full_name": format!("{owner}/{name}"),
            "html_url": format!("https://github.com/{owner}/{name}"),
            "owner": {"login": owner, "avatar_url": ""},
            "fork": fork
        })
    }

    fn push_tagged(transport: &MockTransport, discovery: &Discovery, items: Vec<Value>) {
        transport.push_json(
            discovery.client().topic_search_url("pinokio"),
            200,
            search_page(items),
        );
    }

    fn push_code(transport: &MockTransport, discovery: &Discovery, filename: &str, repos: Vec<Value>) {
        transport.push_json(
            discovery.client().code_search_url(filename, 1),
            200,
            code_page(repos),
        );
    }

    async fn catalog_ids(discovery: &Discovery) -> Vec<i64> {
        CatalogEntryEntity::find()
            .all(discovery.db())
            .await
            .expect("query")
            .into_iter()
            .map(|m| m.id)
            .collect()
    }

    #[tokio::test]
    async fn without_token_only_tag_search_runs() {
        let (transport, discovery) = setup(None).await;
        push_tagged(
            &transport,
            &discovery,
            vec![
                repo_json(1, "cocktailpeanut", "a", 50, false),
                repo_json(2, "someone", "b", 10, false),
            ],
        );

        let outcome = discovery.sync(None).await;

        let summary = outcome.summary().expect("sync should succeed");
        assert_eq!(summary.total, 2);
        assert_eq!(summary.from_tag_search, 2);
        assert_eq!(summary.from_code_search, 0);
        assert_eq!(summary.verified, 1);
        assert_eq!(summary.community, 1);
        assert!(summary.code_search_skipped);
        assert_eq!(transport.requests().len(), 1);

        let a = catalog::find_by_id(discovery.db(), 1).await.expect("query").expect("A");
        assert_eq!(a.tier, CatalogTier::Verified);
        assert_eq!(a.stars, 50);
        let b = catalog::find_by_id(discovery.db(), 2).await.expect("query").expect("B");
        assert_eq!(b.tier, CatalogTier::Community);
    }

    #[tokio::test]
    async fn code_search_adds_new_repositories_and_drops_forks() {
        let (transport, discovery) = setup(Some("token")).await;
        push_tagged(&transport, &discovery, vec![repo_json(1, "facefusion", "a", 50, false)]);
        push_code(
            &transport,
            &discovery,
            "pinokio.js",
            vec![code_repo(2, "someone", "b", false), code_repo(1, "facefusion", "a", false)],
        );
        push_code(
            &transport,
            &discovery,
            "pinokio.json",
            vec![code_repo(3, "other", "c", true)],
        );
        transport.push_json(
            discovery.client().repo_url("someone/b"),
            200,
            repo_json(2, "someone", "b", 7, false),
        );

        let outcome = discovery.sync(None).await;

        let summary = outcome.summary().expect("sync should succeed");
        assert_eq!(summary.total, 2);
        assert_eq!(summary.from_tag_search, 1);
        assert_eq!(summary.from_code_search, 1);
        assert!(!summary.code_search_skipped);
        assert_eq!(catalog_ids(&discovery).await, vec![1, 2]);

        let urls = transport.requested_urls();
        assert!(!urls.contains(&discovery.client().repo_url("facefusion/a")));
        assert!(!urls.contains(&discovery.client().repo_url("other/c")));

        // Tag-search data is kept for repositories code search also found.
        let a = catalog::find_by_id(discovery.db(), 1).await.expect("query").expect("A");
        assert_eq!(a.stars, 50);
        let b = catalog::find_by_id(discovery.db(), 2).await.expect("query").expect("B");
        assert_eq!(b.stars, 7);
    }

    #[tokio::test]
    async fn failed_detail_lookup_skips_only_that_repository() {
        let (transport, discovery) = setup(Some("token")).await;
        push_tagged(&transport, &discovery, vec![repo_json(1, "someone", "a", 5, false)]);
        push_code(
            &transport,
            &discovery,
            "pinokio.js",
            vec![code_repo(2, "x", "b", false), code_repo(4, "y", "d", false)],
        );
        push_code(&transport, &discovery, "pinokio.json", Vec::new());
        transport.push_json(
            discovery.client().repo_url("x/b"),
            200,
            repo_json(2, "x", "b", 3, false),
        );
        transport.push_error(discovery.client().repo_url("y/d"), "connection reset");

        let outcome = discovery.sync(None).await;

        let summary = outcome.summary().expect("sync should succeed");
        assert_eq!(summary.total, 2);
        assert_eq!(summary.detail_failures, 1);
        assert_eq!(catalog_ids(&discovery).await, vec![1, 2]);
    }

    #[tokio::test]
    async fn detail_lookups_share_the_search_lane() {
        let pacer = Arc::new(RecordingPacer::default());
        let (transport, discovery) = setup_paced(Some("token"), pacer.clone()).await;
        push_tagged(&transport, &discovery, vec![repo_json(1, "someone", "a", 5, false)]);
        push_code(
            &transport,
            &discovery,
            "pinokio.js",
            vec![code_repo(2, "x", "b", false), code_repo(3, "y", "c", false)],
        );
        push_code(&transport, &discovery, "pinokio.json", Vec::new());
        transport.push_json(
            discovery.client().repo_url("x/b"),
            200,
            repo_json(2, "x", "b", 3, false),
        );
        transport.push_json(
            discovery.client().repo_url("y/c"),
            200,
            repo_json(3, "y", "c", 4, false),
        );

        assert!(discovery.sync(None).await.is_success());

        // One tag search plus one lookup per code-search-only repository.
        assert_eq!(pacer.count(Lane::Search), 3);
        assert_eq!(pacer.count(Lane::CodeSearch), 2);
        assert_eq!(
            pacer.lanes(),
            vec![
                Lane::Search,
                Lane::CodeSearch,
                Lane::CodeSearch,
                Lane::Search,
                Lane::Search
            ]
        );
    }

    #[tokio::test]
    async fn detail_lookup_returning_a_fork_is_dropped() {
        let (transport, discovery) = setup(Some("token")).await;
        push_tagged(&transport, &discovery, Vec::new());
        push_code(&transport, &discovery, "pinokio.js", vec![code_repo(2, "x", "b", false)]);
        push_code(&transport, &discovery, "pinokio.json", Vec::new());
        transport.push_json(
            discovery.client().repo_url("x/b"),
            200,
            repo_json(2, "x", "b", 3, true),
        );

        let outcome = discovery.sync(None).await;

        assert_eq!(outcome.summary().expect("success").total, 0);
        assert!(catalog_ids(&discovery).await.is_empty());
    }

    #[tokio::test]
    async fn code_search_failure_keeps_other_phases() {
        let (transport, discovery) = setup(Some("token")).await;
        push_tagged(&transport, &discovery, vec![repo_json(1, "someone", "a", 5, false)]);
        transport.push_json(
            discovery.client().code_search_url("pinokio.js", 1),
            403,
            json!({"message": "secondary rate limit"}),
        );
        push_code(&transport, &discovery, "pinokio.json", vec![code_repo(2, "x", "b", false)]);
        transport.push_json(
            discovery.client().repo_url("x/b"),
            200,
            repo_json(2, "x", "b", 3, false),
        );

        let outcome = discovery.sync(None).await;

        let summary = outcome.summary().expect("sync should succeed");
        assert_eq!(summary.total, 2);
        assert_eq!(summary.code_search_failures, 1);
        assert_eq!(summary.from_code_search, 1);
    }

    #[tokio::test]
    async fn tag_search_failure_fails_the_sync_without_writing() {
        let (transport, discovery) = setup(Some("token")).await;
        transport.push_json(
            discovery.client().topic_search_url("pinokio"),
            429,
            json!({"message": "API rate limit exceeded"}),
        );

        let outcome = discovery.sync(None).await;

        match outcome {
            SyncOutcome::Failed { reason } => {
                assert!(reason.contains("API rate limit exceeded"), "{reason}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(transport.requests().len(), 1);
        assert!(catalog_ids(&discovery).await.is_empty());
    }

    #[tokio::test]
    async fn overlapping_sync_is_rejected() {
        let (_transport, discovery) = setup(None).await;
        let _held = discovery.in_flight.lock().await;

        let outcome = discovery.sync(None).await;

        assert_eq!(
            outcome,
            SyncOutcome::Rejected {
                reason: "sync already in progress".to_string()
            }
        );
    }

    #[tokio::test]
    async fn sync_if_empty_runs_once() {
        let (transport, discovery) = setup(None).await;
        push_tagged(&transport, &discovery, vec![repo_json(1, "someone", "a", 5, false)]);

        let first = discovery.sync_if_empty(None).await;
        assert!(first.is_some_and(|o| o.is_success()));

        let second = discovery.sync_if_empty(None).await;
        assert!(second.is_none());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn resync_preserves_first_seen_and_advances_last_synced() {
        let (transport, discovery) = setup(None).await;
        push_tagged(&transport, &discovery, vec![repo_json(1, "someone", "a", 5, false)]);
        push_tagged(&transport, &discovery, vec![repo_json(1, "someone", "a", 8, false)]);

        assert!(discovery.sync(None).await.is_success());
        let before = catalog::find_by_id(discovery.db(), 1).await.expect("query").expect("row");

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(discovery.sync(None).await.is_success());
        let after = catalog::find_by_id(discovery.db(), 1).await.expect("query").expect("row");

        assert_eq!(catalog::count(discovery.db()).await.expect("count"), 1);
        assert_eq!(after.first_seen_at, before.first_seen_at);
        assert!(after.last_synced_at > before.last_synced_at);
        assert_eq!(after.stars, 8);
    }

    #[tokio::test]
    async fn emits_phase_events_in_order() {
        let (transport, discovery) = setup(None).await;
        push_tagged(&transport, &discovery, vec![repo_json(1, "someone", "a", 5, false)]);

        let events = Arc::new(StdMutex::new(Vec::new()));
        let sink = events.clone();
        let callback: ProgressCallback = Box::new(move |event| {
            let name = match event {
                SyncProgress::TagSearchStarted { .. } => "tag_started",
                SyncProgress::TagSearchComplete { .. } => "tag_complete",
                SyncProgress::CodeSearchSkipped => "code_skipped",
                SyncProgress::Persisting { .. } => "persisting",
                SyncProgress::SyncComplete { .. } => "complete",
                _ => "other",
            };
            sink.lock().unwrap().push(name);
        });

        assert!(discovery.sync(Some(&callback)).await.is_success());

        assert_eq!(
            *events.lock().unwrap(),
            vec!["tag_started", "tag_complete", "code_skipped", "persisting", "complete"]
        );
    }
}
