// src/db.rs
use crate::config::AppConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

/// 設定に従って接続プールを作成（DB_SCHEMA 指定時はスキーマを用意して search_path に設定）
pub async fn create_db_pool(config: &AppConfig) -> Result<DbPool, DbErr> {
    match &config.db_schema {
        Some(schema) => {
            let base = Database::connect(&config.database_url).await?;
            if !schema_exists(&base, schema).await? {
                tracing::info!(schema = %schema, "Schema does not exist, creating it");
                create_schema(&base, schema).await?;
            }
            base.close().await?;
            create_db_pool_with_schema(config, schema).await
        }
        None => Database::connect(&config.database_url).await,
    }
}

pub async fn create_db_pool_with_schema(
    config: &AppConfig,
    schema: &str,
) -> Result<DbPool, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.clone());

    // 接続オプションを設定
    opt.max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8 * 60))
        .set_schema_search_path(schema.to_string());

    Database::connect(opt).await
}

pub async fn schema_exists(conn: &DbPool, schema: &str) -> Result<bool, DbErr> {
    let result = conn
        .query_one(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT EXISTS (SELECT 1 FROM information_schema.schemata WHERE schema_name = $1) AS exists",
            [schema.into()],
        ))
        .await?;

    match result {
        Some(row) => row.try_get("", "exists"),
        None => Ok(false),
    }
}

pub async fn create_schema(conn: &DbPool, schema: &str) -> Result<(), DbErr> {
    let create_schema = format!("CREATE SCHEMA IF NOT EXISTS \"{}\";", schema.replace('"', ""));
    conn.execute(Statement::from_string(
        sea_orm::DatabaseBackend::Postgres,
        create_schema,
    ))
    .await?;
    Ok(())
}
