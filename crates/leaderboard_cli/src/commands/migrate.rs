use leaderboard::migration::{Migrator, MigratorTrait};
use leaderboard::{catalog, db};

use crate::MigrateAction;

pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(&db).await?.len();
            if pending == 0 {
                println!("Catalog schema is up to date.");
            } else {
                println!("Applying {} migration(s)...", pending);
                Migrator::up(&db, None).await?;
                println!("Migrations applied successfully.");
            }
            println!("{} catalog entries.", catalog::count(&db).await?);
        }
        MigrateAction::Down => {
            println!("Rolling back last migration...");
            Migrator::down(&db, Some(1)).await?;
            println!("Rollback complete.");
        }
        MigrateAction::Status => {
            println!("Migration status:");
            Migrator::status(&db).await?;
        }
        MigrateAction::Fresh => {
            println!("Dropping the catalog and reapplying migrations...");
            Migrator::fresh(&db).await?;
            println!("Fresh migration complete. The catalog is empty until the next sync.");
        }
    }

    Ok(())
}
