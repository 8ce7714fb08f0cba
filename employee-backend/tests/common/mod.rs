// tests/common/mod.rs
#![allow(dead_code)]

pub mod db;
pub mod test_data;

use employee_backend::config::{AppConfig, SeedConfig};
use employee_backend::repository::InMemoryEmployeeStore;
use employee_backend::utils::jwt::JwtManager;
use employee_backend::utils::password::{Argon2Config, PasswordManager};
use employee_backend::EmployeeDirectory;
use std::sync::{Arc, Once};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

// テスト環境の初期化を一度だけ実行
static INIT: Once = Once::new();

/// テスト環境を初期化
pub fn init_test_env() {
    INIT.call_once(|| {
        // .env.testファイルから環境変数を読み込む
        if std::path::Path::new(".env.test").exists() {
            dotenvy::from_filename(".env.test").ok();
        } else if std::path::Path::new("../.env.test").exists() {
            // employee-backendディレクトリから実行される場合
            dotenvy::from_filename("../.env.test").ok();
        } else {
            dotenvy::dotenv().ok();
        }

        // テスト用のログ設定
        let _ = tracing_subscriber::fmt()
            .with_env_filter("employee_backend=debug")
            .with_test_writer()
            .try_init();
    });
}

/// インメモリストアに載せたディレクトリ
pub struct TestDirectory {
    pub directory: EmployeeDirectory,
    pub store: InMemoryEmployeeStore,
    pub jwt: JwtManager,
    pub cancel: CancellationToken,
}

/// 軽量なArgon2パラメータでディレクトリを組み立てる
pub fn setup_directory() -> TestDirectory {
    init_test_env();

    let config = AppConfig::for_testing();
    let store = InMemoryEmployeeStore::new();
    let jwt = JwtManager::new(config.jwt).unwrap();
    let passwords = PasswordManager::new(Argon2Config::for_testing()).unwrap();

    let directory = EmployeeDirectory::new(
        Arc::new(store.clone()),
        Arc::new(passwords),
        Arc::new(jwt.clone()),
    );

    TestDirectory {
        directory,
        store,
        jwt,
        cancel: CancellationToken::new(),
    }
}

/// 初期ディレクターを投入し、そのIDを返す
pub async fn seed_director(ctx: &TestDirectory) -> Uuid {
    let seed = SeedConfig::default();
    assert!(ctx
        .directory
        .seed_initial_director(&seed, &ctx.cancel)
        .await
        .unwrap());

    let employees = ctx.directory.list_active_employees(&ctx.cancel).await.unwrap();
    employees
        .iter()
        .find(|e| e.email == seed.director_email)
        .map(|e| e.id)
        .expect("seeded director")
}
