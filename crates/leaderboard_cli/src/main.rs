//! Leaderboard CLI - discover, catalog and serve Pinokio scripts from GitHub.

mod commands;
mod config;
mod progress;
mod shutdown;

use clap::{Parser, Subcommand};
use console::Term;
use leaderboard::catalog::DEFAULT_LEADERBOARD_LIMIT;
use tracing_subscriber::EnvFilter;

use crate::commands::catalog::{OutputFormat, TierFilter};

#[derive(Parser)]
#[command(name = "leaderboard")]
#[command(version)]
#[command(about = "A leaderboard of Pinokio scripts published on GitHub")]
#[command(
    long_about = "Leaderboard discovers Pinokio scripts on GitHub, both repositories tagged \
with the `pinokio` topic and (with a token) repositories containing a pinokio.js or \
pinokio.json manifest. Results are ranked by stars, split into verified and community \
tiers, stored in a local catalog and served over a small JSON API."
)]
#[command(after_long_help = r#"EXAMPLES
    Populate the catalog:
        $ leaderboard sync

    Show the top verified scripts:
        $ leaderboard list --tier verified --limit 10

    Search the catalog as JSON:
        $ leaderboard list --search comfy --output json

    Enable code search:
        $ leaderboard configure --github-token ghp_...

    Serve the API on port 8080:
        $ leaderboard serve --port 8080

CONFIGURATION
    Leaderboard reads configuration from:
      1. ~/.config/leaderboard/config.toml (or $XDG_CONFIG_HOME/leaderboard/config.toml)
      2. ./leaderboard.toml
      3. Environment variables (LEADERBOARD_* prefix, e.g., LEADERBOARD_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    LEADERBOARD_DATABASE_URL    Database connection string (default: ~/.local/state/leaderboard/leaderboard.db)
    LEADERBOARD_GITHUB_TOKEN    GitHub personal access token (enables code search)
    GITHUB_TOKEN                Used when no token is configured
    LEADERBOARD_SERVER_HOST     Address for `serve` (default: 127.0.0.1)
    LEADERBOARD_SERVER_PORT     Port for `serve` (default: 3000)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Discover scripts on GitHub and update the catalog
    Sync {
        /// Disable proactive rate limiting (may cause API throttling)
        #[arg(short = 'R', long)]
        no_rate_limit: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List catalog entries ranked by stars
    List {
        /// Only show one tier
        #[arg(short, long, value_enum)]
        tier: Option<TierFilter>,

        /// Case-insensitive match against name, description and owner
        #[arg(short, long)]
        search: Option<String>,

        /// Maximum number of entries
        #[arg(short, long, default_value_t = DEFAULT_LEADERBOARD_LIMIT)]
        limit: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Show catalog totals
    Stats {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// List verified publishers
    Publishers {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Serve the JSON API
    Serve {
        /// Address to bind (default from config or 127.0.0.1)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind (default from config or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Don't sync on startup even if the catalog is empty
        #[arg(long)]
        no_initial_sync: bool,
    },
    /// Save settings to the config file
    Configure {
        /// GitHub token for code search; pass "" to disable code search
        #[arg(long)]
        github_token: String,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Progress bars cover the TTY case; structured logs everywhere else.
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("leaderboard=info,leaderboard_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();

    let cli = Cli::parse();

    // Commands that don't touch the database
    match &cli.command {
        Commands::Publishers { output } => {
            return commands::catalog::handle_publishers(*output);
        }
        Commands::Configure { github_token } => {
            return commands::configure::handle_configure(github_token);
        }
        _ => {}
    }

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database location; set LEADERBOARD_DATABASE_URL")?;

    ensure_sqlite_dir(&database_url)?;

    match cli.command {
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Sync {
            no_rate_limit,
            json,
        } => {
            commands::sync::handle_sync(no_rate_limit, json, &config, &database_url).await?;
        }
        Commands::List {
            tier,
            search,
            limit,
            output,
        } => {
            commands::catalog::handle_list(tier, search, limit, output, &database_url).await?;
        }
        Commands::Stats { output } => {
            commands::catalog::handle_stats(output, &database_url).await?;
        }
        Commands::Serve {
            host,
            port,
            no_initial_sync,
        } => {
            commands::serve::handle_serve(host, port, no_initial_sync, &config, &database_url)
                .await?;
        }
        Commands::Publishers { .. } | Commands::Configure { .. } => {}
    }

    Ok(())
}

/// Create the parent directory of a file-backed SQLite database.
fn ensure_sqlite_dir(database_url: &str) -> std::io::Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    // Strip query parameters (e.g., ?mode=rwc) before path operations
    let db_path = db_path.split('?').next().unwrap_or(db_path);
    let db_path = std::path::Path::new(db_path);

    if db_path.is_relative() && !db_path.as_os_str().is_empty() {
        tracing::warn!(
            "Database path '{}' is relative - behavior depends on current directory. \
             Consider using an absolute path.",
            db_path.display()
        );
    }

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_defaults() {
        let cli = Cli::try_parse_from(["leaderboard", "list"]).unwrap();
        match cli.command {
            Commands::List {
                tier,
                search,
                limit,
                output,
            } => {
                assert!(tier.is_none());
                assert!(search.is_none());
                assert_eq!(limit, 50);
                assert!(matches!(output, OutputFormat::Table));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_list_with_filters() {
        let cli = Cli::try_parse_from([
            "leaderboard",
            "list",
            "--tier",
            "verified",
            "--search",
            "comfy",
            "--limit",
            "5",
            "--output",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::List {
                tier,
                search,
                limit,
                output,
            } => {
                assert!(matches!(tier, Some(TierFilter::Verified)));
                assert_eq!(search.as_deref(), Some("comfy"));
                assert_eq!(limit, 5);
                assert!(matches!(output, OutputFormat::Json));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_unknown_tier_is_rejected() {
        assert!(Cli::try_parse_from(["leaderboard", "list", "--tier", "gold"]).is_err());
    }

    #[test]
    fn test_configure_accepts_empty_token() {
        let cli = Cli::try_parse_from(["leaderboard", "configure", "--github-token", ""]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Configure { github_token } if github_token.is_empty()
        ));
    }

    #[test]
    fn test_serve_overrides() {
        let cli =
            Cli::try_parse_from(["leaderboard", "serve", "-H", "0.0.0.0", "-p", "8080"]).unwrap();
        match cli.command {
            Commands::Serve {
                host,
                port,
                no_initial_sync,
            } => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
                assert!(!no_initial_sync);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_ensure_sqlite_dir_ignores_other_schemes() {
        ensure_sqlite_dir("postgres://localhost/leaderboard").unwrap();
        ensure_sqlite_dir("sqlite::memory:").unwrap();
    }

    #[test]
    fn test_ensure_sqlite_dir_creates_parent() {
        let dir = std::env::temp_dir().join(format!("leaderboard-main-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let url = format!("sqlite://{}?mode=rwc", dir.join("db").join("leaderboard.db").display());

        ensure_sqlite_dir(&url).unwrap();
        assert!(dir.join("db").is_dir());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
