#![cfg(test)]
use migration::MigratorTrait;
use models::db::{config_from_env, connect_with_config};
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

/// Connection to the Postgres named by `DATABASE_URL`, or `None` when
/// database tests are disabled or no database is reachable.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let Some(mut cfg) = config_from_env() else {
        eprintln!("DATABASE_URL missing; skip database tests");
        return Ok(None);
    };

    // Run migrations exactly once, with a throwaway connection
    let migrated = *MIGRATED
        .get_or_init(|| {
            let cfg = cfg.clone();
            async move {
                let db = match connect_with_config(&cfg).await {
                    Ok(db) => db,
                    Err(e) => {
                        eprintln!("skip: cannot connect to db: {}", e);
                        return false;
                    }
                };
                migration::Migrator::up(&db, None).await.is_ok()
            }
        })
        .await;
    if !migrated {
        return Ok(None);
    }

    // Return a fresh connection for the current test's runtime
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.acquire_timeout_secs = 10;
    let db = connect_with_config(&cfg).await?;
    Ok(Some(db))
}
