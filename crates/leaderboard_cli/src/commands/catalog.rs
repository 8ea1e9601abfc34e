//! Read-only catalog commands: `list`, `stats` and `publishers`.

use clap::ValueEnum;
use leaderboard::catalog::{self, CatalogStats, LeaderboardQuery};
use leaderboard::{CatalogEntryModel, CatalogTier, VERIFIED_PUBLISHERS, db};
use serde::Serialize;

/// Output format for catalog listings.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// Tier filter accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum TierFilter {
    Verified,
    Community,
}

impl From<TierFilter> for CatalogTier {
    fn from(tier: TierFilter) -> Self {
        match tier {
            TierFilter::Verified => CatalogTier::Verified,
            TierFilter::Community => CatalogTier::Community,
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, Serialize, tabled::Tabled)]
pub(crate) struct LeaderboardRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Repository")]
    full_name: String,
    #[tabled(rename = "Stars")]
    stars: i32,
    #[tabled(rename = "Forks")]
    forks: i32,
    #[tabled(rename = "Tier")]
    tier: CatalogTier,
    #[tabled(rename = "Description")]
    description: String,
}

/// Longest description shown in a table cell.
const DESCRIPTION_WIDTH: usize = 60;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

impl LeaderboardRow {
    fn new(rank: usize, model: &CatalogEntryModel) -> Self {
        Self {
            rank,
            full_name: model.full_name.clone(),
            stars: model.stars,
            forks: model.forks,
            tier: model.tier,
            description: truncate(
                model.description.as_deref().unwrap_or_default(),
                DESCRIPTION_WIDTH,
            ),
        }
    }
}

/// Aggregate catalog numbers.
#[derive(Debug, Clone, Serialize, tabled::Tabled)]
pub(crate) struct StatsRow {
    #[tabled(rename = "Scripts")]
    total: u64,
    #[tabled(rename = "Verified")]
    verified: u64,
    #[tabled(rename = "Community")]
    community: u64,
    #[tabled(rename = "Total Stars")]
    total_stars: i64,
    #[tabled(rename = "Last Synced")]
    last_synced: String,
}

impl From<CatalogStats> for StatsRow {
    fn from(stats: CatalogStats) -> Self {
        Self {
            total: stats.total,
            verified: stats.verified,
            community: stats.community,
            total_stars: stats.total_stars,
            last_synced: stats
                .last_synced_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "never".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, tabled::Tabled)]
struct PublisherRow {
    #[tabled(rename = "Verified Publisher")]
    login: &'static str,
}

fn print_table<T: tabled::Tabled>(rows: impl IntoIterator<Item = T>) {
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    println!("{}", table);
}

/// Print the ranked catalog.
pub(crate) async fn handle_list(
    tier: Option<TierFilter>,
    search: Option<String>,
    limit: u64,
    output: OutputFormat,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect_and_migrate(database_url).await?;
    let query = LeaderboardQuery {
        tier: tier.map(CatalogTier::from),
        search,
        limit,
    };
    let models = catalog::leaderboard(&db, &query).await?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&models)?),
        OutputFormat::Table if models.is_empty() => {
            println!("No scripts in the catalog match. Run `leaderboard sync` to populate it.");
        }
        OutputFormat::Table => print_table(
            models
                .iter()
                .enumerate()
                .map(|(i, model)| LeaderboardRow::new(i + 1, model)),
        ),
    }

    Ok(())
}

/// Print catalog totals.
pub(crate) async fn handle_stats(
    output: OutputFormat,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect_and_migrate(database_url).await?;
    let stats = catalog::stats(&db).await?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Table => print_table([StatsRow::from(stats)]),
    }

    Ok(())
}

/// Print the verified publisher list. Needs no database.
pub(crate) fn handle_publishers(output: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&VERIFIED_PUBLISHERS)?),
        OutputFormat::Table => print_table(
            VERIFIED_PUBLISHERS
                .iter()
                .map(|login| PublisherRow { login: *login }),
        ),
    }
    Ok(())
}
