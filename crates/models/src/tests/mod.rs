use configs::DatabaseConfig;
use sea_orm::DatabaseConnection;

use crate::db::{connect_with_config, create_schema};



/// Single-connection in-memory SQLite with the schema in place.
pub(crate) async fn memory_db() -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let db = connect_with_config(&cfg).await?;
    create_schema(&db).await?;
    Ok(db)
}
