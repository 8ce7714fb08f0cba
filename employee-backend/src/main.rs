// src/main.rs
use employee_backend::config::AppConfig;
use employee_backend::db::create_db_pool;
use employee_backend::logging::{init_tracing, DEFAULT_FILTER};
use employee_backend::repository::SeaOrmUnitOfWorkFactory;
use employee_backend::utils::jwt::JwtManager;
use employee_backend::utils::password::PasswordManager;
use employee_backend::EmployeeDirectory;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // トレーシングの設定
    init_tracing(DEFAULT_FILTER);

    tracing::info!("Starting employee backend...");

    // 設定を読み込む
    let app_config = AppConfig::from_env()?;
    tracing::info!(
        environment = %app_config.environment,
        schema = ?app_config.db_schema,
        "Configuration loaded"
    );

    // データベース接続を作成
    let db_pool = create_db_pool(&app_config).await?;
    tracing::info!("Database pool created successfully.");

    // マイグレーションを適用
    Migrator::up(&db_pool, None).await?;
    tracing::info!("Migrations applied.");

    let directory = EmployeeDirectory::new(
        Arc::new(SeaOrmUnitOfWorkFactory::new(db_pool.clone())),
        Arc::new(PasswordManager::new(app_config.argon2.clone())?),
        Arc::new(JwtManager::new(app_config.jwt.clone())?),
    );

    // Ctrl+C で進行中の処理を中断
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Shutdown signal received");
            signal.cancel();
        }
    });

    // 初期ディレクターの投入
    if directory
        .seed_initial_director(&app_config.seed, &shutdown)
        .await?
    {
        tracing::info!(
            email = %app_config.seed.director_email,
            "Seeded initial director account"
        );
    } else {
        tracing::info!("Employees already present, skipping seed");
    }

    db_pool.close().await?;
    tracing::info!("Bootstrap completed.");
    Ok(())
}
