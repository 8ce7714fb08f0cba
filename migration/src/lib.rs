// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// 社員・電話番号テーブル
mod m20250801_000001_create_employees_table;
mod m20250801_000002_create_phones_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. 社員テーブル（自己参照の上司FKを含む）
            Box::new(m20250801_000001_create_employees_table::Migration),
            // 2. 電話番号テーブル（社員に依存）
            Box::new(m20250801_000002_create_phones_table::Migration),
        ]
    }
}
