use super::m20250801_000001_create_employees_table::Employees;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Phones::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Phones::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Phones::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(Phones::Number).string_len(20).not_null())
                    .col(ColumnDef::new(Phones::PhoneType).string_len(50).null())
                    .col(
                        ColumnDef::new(Phones::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Phones::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // 電話番号は社員と運命を共にする
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_phones_employee_id")
                            .from(Phones::Table, Phones::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Phones::Table)
                    .name("idx_phones_employee_id")
                    .col(Phones::EmployeeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .if_exists()
                    .table(Phones::Table)
                    .name("idx_phones_employee_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Phones::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Phones {
    Table,
    Id,
    EmployeeId,
    Number,
    PhoneType,
    CreatedAt,
    UpdatedAt,
}
