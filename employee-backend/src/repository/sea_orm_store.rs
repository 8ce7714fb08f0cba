// src/repository/sea_orm_store.rs

use super::employee_repository::{EmployeeRepository, UnitOfWork, UnitOfWorkFactory};
use crate::db::DbPool;
use crate::domain::employee_model::{self, Entity as EmployeeEntity};
use crate::domain::phone_model::{self, Entity as PhoneEntity};
use crate::domain::Employee;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use sea_orm::entity::*;
use sea_orm::{
    DatabaseTransaction, DbErr, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::HashMap;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use uuid::Uuid;

/// キャンセル信号と競合させて実行する。キャンセル時は未完了の処理を破棄する
async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> AppResult<T>
where
    F: Future<Output = Result<T, DbErr>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        result = fut => result.map_err(AppError::from),
    }
}

/// Postgres 上のユニットオブワーク生成
#[derive(Clone)]
pub struct SeaOrmUnitOfWorkFactory {
    db: DbPool,
}

impl SeaOrmUnitOfWorkFactory {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UnitOfWorkFactory for SeaOrmUnitOfWorkFactory {
    async fn begin(&self, cancel: &CancellationToken) -> AppResult<Box<dyn UnitOfWork>> {
        let txn = cancellable(cancel, self.db.begin()).await?;
        debug!("Starting database transaction");
        Ok(Box::new(SeaOrmUnitOfWork {
            txn,
            records_affected: 0,
        }))
    }
}

/// 1トランザクション分のリポジトリ。drop されると sea-orm がロールバックする
pub struct SeaOrmUnitOfWork {
    txn: DatabaseTransaction,
    records_affected: u64,
}

impl SeaOrmUnitOfWork {
    async fn load_phones(
        &self,
        employee_ids: Vec<Uuid>,
        cancel: &CancellationToken,
    ) -> AppResult<HashMap<Uuid, Vec<phone_model::Model>>> {
        if employee_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let phones = cancellable(
            cancel,
            PhoneEntity::find()
                .filter(phone_model::Column::EmployeeId.is_in(employee_ids))
                .order_by_asc(phone_model::Column::CreatedAt)
                .all(&self.txn),
        )
        .await?;

        let mut grouped: HashMap<Uuid, Vec<phone_model::Model>> = HashMap::new();
        for phone in phones {
            grouped.entry(phone.employee_id).or_default().push(phone);
        }
        Ok(grouped)
    }

    async fn hydrate(
        &self,
        rows: Vec<employee_model::Model>,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<Employee>> {
        let mut phones = self
            .load_phones(rows.iter().map(|row| row.id).collect(), cancel)
            .await?;

        rows.into_iter()
            .map(|row| {
                let owned = phones.remove(&row.id).unwrap_or_default();
                row.into_employee(owned).map_err(AppError::from)
            })
            .collect()
    }

    async fn find_one(
        &self,
        row: Option<employee_model::Model>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Employee>> {
        match row {
            Some(row) => Ok(self.hydrate(vec![row], cancel).await?.pop()),
            None => Ok(None),
        }
    }

    async fn replace_phones(
        &mut self,
        employee: &Employee,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        cancellable(
            cancel,
            PhoneEntity::delete_many()
                .filter(phone_model::Column::EmployeeId.eq(employee.id()))
                .exec(&self.txn),
        )
        .await?;

        if employee.phones().is_empty() {
            return Ok(());
        }

        let rows = employee
            .phones()
            .iter()
            .map(|phone| phone_model::ActiveModel::from_phone(employee.id(), phone));
        cancellable(cancel, PhoneEntity::insert_many(rows).exec(&self.txn)).await?;

        self.records_affected += employee.phones().len() as u64;
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for SeaOrmUnitOfWork {
    async fn find_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Employee>> {
        let row = cancellable(cancel, EmployeeEntity::find_by_id(id).one(&self.txn)).await?;
        self.find_one(row, cancel).await
    }

    async fn find_by_email(
        &self,
        email: &str,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Employee>> {
        let row = cancellable(
            cancel,
            EmployeeEntity::find()
                .filter(employee_model::Column::Email.eq(email))
                .one(&self.txn),
        )
        .await?;
        self.find_one(row, cancel).await
    }

    async fn find_by_document_number(
        &self,
        document_number: &str,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Employee>> {
        let row = cancellable(
            cancel,
            EmployeeEntity::find()
                .filter(employee_model::Column::DocumentNumber.eq(document_number))
                .one(&self.txn),
        )
        .await?;
        self.find_one(row, cancel).await
    }

    async fn list_active(&self, cancel: &CancellationToken) -> AppResult<Vec<Employee>> {
        let rows = cancellable(
            cancel,
            EmployeeEntity::find()
                .filter(employee_model::Column::IsActive.eq(true))
                .order_by_asc(employee_model::Column::FirstName)
                .order_by_asc(employee_model::Column::LastName)
                .all(&self.txn),
        )
        .await?;
        self.hydrate(rows, cancel).await
    }

    async fn list_by_manager(
        &self,
        manager_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<Employee>> {
        let rows = cancellable(
            cancel,
            EmployeeEntity::find()
                .filter(employee_model::Column::ManagerId.eq(manager_id))
                .filter(employee_model::Column::IsActive.eq(true))
                .order_by_asc(employee_model::Column::FirstName)
                .order_by_asc(employee_model::Column::LastName)
                .all(&self.txn),
        )
        .await?;
        self.hydrate(rows, cancel).await
    }

    async fn count(&self, cancel: &CancellationToken) -> AppResult<u64> {
        cancellable(cancel, EmployeeEntity::find().count(&self.txn)).await
    }

    async fn exists_by_email(&self, email: &str, cancel: &CancellationToken) -> AppResult<bool> {
        let count = cancellable(
            cancel,
            EmployeeEntity::find()
                .filter(employee_model::Column::Email.eq(email))
                .count(&self.txn),
        )
        .await?;
        Ok(count > 0)
    }

    async fn exists_by_document_number(
        &self,
        document_number: &str,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        let count = cancellable(
            cancel,
            EmployeeEntity::find()
                .filter(employee_model::Column::DocumentNumber.eq(document_number))
                .count(&self.txn),
        )
        .await?;
        Ok(count > 0)
    }

    async fn insert(&mut self, employee: &Employee, cancel: &CancellationToken) -> AppResult<()> {
        let model = employee_model::ActiveModel::from(employee);
        cancellable(cancel, EmployeeEntity::insert(model).exec(&self.txn)).await?;
        self.records_affected += 1;

        self.replace_phones(employee, cancel).await
    }

    async fn mark_dirty(
        &mut self,
        employee: &Employee,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let model = employee_model::ActiveModel::from(employee);
        cancellable(cancel, model.update(&self.txn)).await?;
        self.records_affected += 1;

        self.replace_phones(employee, cancel).await
    }
}

#[async_trait]
impl UnitOfWork for SeaOrmUnitOfWork {
    async fn commit(self: Box<Self>, cancel: &CancellationToken) -> AppResult<u64> {
        let SeaOrmUnitOfWork {
            txn,
            records_affected,
        } = *self;

        if cancel.is_cancelled() {
            // txn は drop 時にロールバックされる
            return Err(AppError::Cancelled);
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit transaction");
            AppError::from(e)
        })?;

        debug!(records_affected, "Transaction committed");
        Ok(records_affected)
    }
}
