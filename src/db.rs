use crate::config::AppConfig;
use crate::entities;
use sea_orm::{
    ActiveValue::Set, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, Schema,
};
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for the shared database connection pool.
pub type DbPool = DatabaseConnection;

/// Establishes a connection pool from application configuration.
pub async fn establish_connection(cfg: &AppConfig) -> Result<DbPool, DbErr> {
    let mut options = ConnectOptions::new(cfg.database_url.clone());
    options
        .max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_connections)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(url = %redact_url(&cfg.database_url), "database connection established");
    Ok(db)
}

/// Synchronizes the schema from entity definitions.
///
/// Schema migration proper is owned by an external pipeline; this creates
/// missing tables for development and test databases and seeds the
/// order-number counter row.
pub async fn sync_schema(db: &DbPool) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    macro_rules! create_table {
        ($entity:expr) => {{
            let mut stmt = schema.create_table_from_entity($entity);
            stmt.if_not_exists();
            db.execute(backend.build(&stmt)).await?;
        }};
    }

    create_table!(entities::company::Entity);
    create_table!(entities::user::Entity);
    create_table!(entities::customer::Entity);
    create_table!(entities::vehicle::Entity);
    create_table!(entities::part::Entity);
    create_table!(entities::warranty::Entity);
    create_table!(entities::order::Entity);
    create_table!(entities::order_task::Entity);
    create_table!(entities::order_task_part::Entity);
    create_table!(entities::order_photo::Entity);
    create_table!(entities::order_status_history::Entity);
    create_table!(entities::order_counter::Entity);

    seed_order_counter(db).await?;
    debug!("schema synchronized");
    Ok(())
}

/// Ensures the order-number counter row exists, starting at 0.
async fn seed_order_counter(db: &DbPool) -> Result<(), DbErr> {
    use entities::order_counter::{self, ORDER_NUMBER_COUNTER};

    let existing = order_counter::Entity::find_by_id(ORDER_NUMBER_COUNTER)
        .one(db)
        .await?;
    if existing.is_none() {
        let row = order_counter::ActiveModel {
            name: Set(ORDER_NUMBER_COUNTER.to_string()),
            value: Set(0),
        };
        order_counter::Entity::insert(row).exec(db).await?;
    }
    Ok(())
}

fn redact_url(url: &str) -> String {
    match url.split_once('@') {
        Some((_, host)) => format!("***@{host}"),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_credentials_in_connection_urls() {
        assert_eq!(
            redact_url("postgres://user:pw@db.local/app"),
            "***@db.local/app"
        );
        assert_eq!(redact_url("sqlite::memory:"), "sqlite::memory:");
    }
}
