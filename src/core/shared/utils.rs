use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::PgConnection;
use log::warn;

use crate::core::config::DatabaseConfig;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Builds the pool and waits for its first connection.
pub fn create_conn(config: &DatabaseConfig) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(config.connection_string());
    Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(config.connect_timeout)
        .build(manager)
}

/// Builds the pool without touching the database; connections are opened on first checkout.
pub fn create_lazy_conn(config: &DatabaseConfig) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(config.connection_string());
    Pool::builder()
        .max_size(config.pool_size)
        .min_idle(Some(0))
        .connection_timeout(config.connect_timeout)
        .build_unchecked(manager)
}

pub fn create_conn_or_lazy(config: &DatabaseConfig) -> DbPool {
    match create_conn(config) {
        Ok(pool) => pool,
        Err(e) => {
            warn!("Database not reachable at startup ({e}), continuing with a lazy pool");
            create_lazy_conn(config)
        }
    }
}

/// Run database migrations
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS).map_err(
        |e| -> Box<dyn std::error::Error + Send + Sync> {
            Box::new(std::io::Error::other(format!("Migration error: {}", e)))
        },
    )?;
    Ok(())
}
