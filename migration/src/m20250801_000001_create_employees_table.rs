use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employees::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Employees::FirstName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employees::LastName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employees::Email)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employees::DocumentNumber)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employees::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Employees::BirthDate).date().not_null())
                    .col(ColumnDef::new(Employees::Role).integer().not_null())
                    .col(
                        ColumnDef::new(Employees::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Employees::ManagerId).uuid().null())
                    .col(
                        ColumnDef::new(Employees::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Employees::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // 上司が物理削除された場合は参照だけ外す
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_manager_id")
                            .from(Employees::Table, Employees::ManagerId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 一意インデックス（同時リクエストでの重複登録を防ぐ最終防衛線）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Employees::Table)
                    .name("ux_employees_email")
                    .col(Employees::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Employees::Table)
                    .name("ux_employees_document_number")
                    .col(Employees::DocumentNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 部下一覧の検索用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Employees::Table)
                    .name("idx_employees_manager_id")
                    .col(Employees::ManagerId)
                    .to_owned(),
            )
            .await?;

        // 有効社員の名前順一覧用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Employees::Table)
                    .name("idx_employees_active_name")
                    .col(Employees::IsActive)
                    .col(Employees::FirstName)
                    .col(Employees::LastName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_employees_active_name",
            "idx_employees_manager_id",
            "ux_employees_document_number",
            "ux_employees_email",
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .if_exists()
                        .table(Employees::Table)
                        .name(name)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(DeriveIden)]
pub enum Employees {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    DocumentNumber,
    PasswordHash,
    BirthDate,
    Role,
    IsActive,
    ManagerId,
    CreatedAt,
    UpdatedAt,
}
