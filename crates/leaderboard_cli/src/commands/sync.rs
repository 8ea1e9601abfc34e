use std::sync::Arc;

use console::{Term, style};
use leaderboard::sync::{SyncOutcome, SyncResponse, SyncSummary};

use crate::commands::shared::build_discovery;
use crate::config::Config;
use crate::progress::ProgressReporter;

/// Run one discovery pass and write the results to the catalog.
pub(crate) async fn handle_sync(
    no_rate_limit: bool,
    json: bool,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let no_rate_limit = no_rate_limit || config.sync.no_rate_limit;
    let discovery = build_discovery(config, database_url, no_rate_limit).await?;

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let outcome = discovery.sync(Some(&callback)).await;
    reporter.finish();

    if json {
        let response = SyncResponse::from(outcome.clone());
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else if Term::stdout().is_term() {
        print_outcome(&outcome);
    }

    match outcome {
        SyncOutcome::Completed(summary) => {
            tracing::info!(
                total = summary.total,
                verified = summary.verified,
                community = summary.community,
                "Catalog updated"
            );
            Ok(())
        }
        SyncOutcome::Rejected { reason } | SyncOutcome::Failed { reason } => Err(reason.into()),
    }
}

fn print_outcome(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::Completed(summary) => {
            println!();
            println!("{}", style("Sync complete").bold().green());
            for line in summary_lines(summary) {
                println!("  {}", line);
            }
        }
        SyncOutcome::Rejected { reason } => {
            eprintln!("{} {}", style("Sync skipped:").bold().yellow(), reason);
        }
        SyncOutcome::Failed { reason } => {
            eprintln!("{} {}", style("Sync failed:").bold().red(), reason);
        }
    }
}

fn summary_lines(summary: &SyncSummary) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} scripts ({} verified, {} community)",
            summary.total, summary.verified, summary.community
        ),
        format!("{} from topic search", summary.from_tag_search),
    ];

    if summary.code_search_skipped {
        lines.push("code search skipped (no GitHub token)".to_string());
    } else {
        lines.push(format!("{} from code search", summary.from_code_search));
    }

    if summary.code_search_failures > 0 {
        lines.push(format!(
            "{} code search crawl(s) ended early, results are partial",
            summary.code_search_failures
        ));
    }
    if summary.detail_failures > 0 {
        lines.push(format!(
            "{} repository lookup(s) failed",
            summary.detail_failures
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lines_without_token() {
        let summary = SyncSummary {
            verified: 1,
            community: 1,
            total: 2,
            from_tag_search: 2,
            from_code_search: 0,
            code_search_skipped: true,
            code_search_failures: 0,
            detail_failures: 0,
        };

        assert_eq!(
            summary_lines(&summary),
            vec![
                "2 scripts (1 verified, 1 community)",
                "2 from topic search",
                "code search skipped (no GitHub token)",
            ]
        );
    }

    #[test]
    fn test_summary_lines_report_partial_results() {
        let summary = SyncSummary {
            verified: 0,
            community: 5,
            total: 5,
            from_tag_search: 3,
            from_code_search: 2,
            code_search_skipped: false,
            code_search_failures: 1,
            detail_failures: 2,
        };

        let lines = summary_lines(&summary);
        assert_eq!(lines[2], "2 from code search");
        assert!(lines[3].starts_with("1 code search crawl(s) ended early"));
        assert_eq!(lines[4], "2 repository lookup(s) failed");
    }
}
