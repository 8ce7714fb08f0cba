// src/repository/in_memory.rs

//! テスト・ローカル検証用のインメモリ実装
//!
//! 書き込みはユニットオブワーク内にステージされ、commit 時にまとめて反映される。
//! メールアドレスと身分証番号の一意性は commit 時に最終チェックする
//! （データベースの一意インデックスと同じ役割）。

use super::employee_repository::{sort_by_name, EmployeeRepository, UnitOfWork, UnitOfWorkFactory};
use crate::domain::{Employee, EmployeeSnapshot};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

type Rows = HashMap<Uuid, EmployeeSnapshot>;

/// スレッドセーフなインメモリ社員ストア
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmployeeStore {
    rows: Arc<RwLock<Rows>>,
}

impl InMemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// コミット済みの社員数
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// コミット済みの状態を直接参照（テスト用）
    pub fn get(&self, id: Uuid) -> Option<Employee> {
        self.rows
            .read()
            .ok()
            .and_then(|rows| rows.get(&id).cloned())
            .map(Employee::restore)
    }

    fn read_rows(&self) -> AppResult<std::sync::RwLockReadGuard<'_, Rows>> {
        self.rows
            .read()
            .map_err(|_| AppError::InternalServerError("Employee store lock poisoned".to_string()))
    }

    fn write_rows(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, Rows>> {
        self.rows
            .write()
            .map_err(|_| AppError::InternalServerError("Employee store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryEmployeeStore {
    async fn begin(&self, cancel: &CancellationToken) -> AppResult<Box<dyn UnitOfWork>> {
        ensure_not_cancelled(cancel)?;
        Ok(Box::new(InMemoryUnitOfWork {
            store: self.clone(),
            staged: HashMap::new(),
        }))
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> AppResult<()> {
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    Ok(())
}

/// ステージされた変更を持つユニットオブワーク。commit されなければ何も反映しない
pub struct InMemoryUnitOfWork {
    store: InMemoryEmployeeStore,
    staged: Rows,
}

impl InMemoryUnitOfWork {
    /// コミット済みの行にステージ分を重ねた現在のビュー
    fn visible(&self) -> AppResult<Vec<EmployeeSnapshot>> {
        let rows = self.store.read_rows()?;
        let mut merged: Rows = rows.clone();
        for (id, snapshot) in &self.staged {
            merged.insert(*id, snapshot.clone());
        }
        Ok(merged.into_values().collect())
    }

    fn find_where<P>(&self, cancel: &CancellationToken, predicate: P) -> AppResult<Option<Employee>>
    where
        P: Fn(&EmployeeSnapshot) -> bool,
    {
        ensure_not_cancelled(cancel)?;
        Ok(self
            .visible()?
            .into_iter()
            .find(|row| predicate(row))
            .map(Employee::restore))
    }

    fn list_where<P>(&self, cancel: &CancellationToken, predicate: P) -> AppResult<Vec<Employee>>
    where
        P: Fn(&EmployeeSnapshot) -> bool,
    {
        ensure_not_cancelled(cancel)?;
        let mut employees: Vec<Employee> = self
            .visible()?
            .into_iter()
            .filter(|row| predicate(row))
            .map(Employee::restore)
            .collect();
        sort_by_name(&mut employees);
        Ok(employees)
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryUnitOfWork {
    async fn find_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Employee>> {
        self.find_where(cancel, |row| row.id == id)
    }

    async fn find_by_email(
        &self,
        email: &str,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Employee>> {
        self.find_where(cancel, |row| row.email == email)
    }

    async fn find_by_document_number(
        &self,
        document_number: &str,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Employee>> {
        self.find_where(cancel, |row| row.document_number == document_number)
    }

    async fn list_active(&self, cancel: &CancellationToken) -> AppResult<Vec<Employee>> {
        self.list_where(cancel, |row| row.is_active)
    }

    async fn list_by_manager(
        &self,
        manager_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<Employee>> {
        self.list_where(cancel, |row| {
            row.is_active && row.manager_id == Some(manager_id)
        })
    }

    async fn count(&self, cancel: &CancellationToken) -> AppResult<u64> {
        ensure_not_cancelled(cancel)?;
        Ok(self.visible()?.len() as u64)
    }

    async fn exists_by_email(&self, email: &str, cancel: &CancellationToken) -> AppResult<bool> {
        Ok(self.find_where(cancel, |row| row.email == email)?.is_some())
    }

    async fn exists_by_document_number(
        &self,
        document_number: &str,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        Ok(self
            .find_where(cancel, |row| row.document_number == document_number)?
            .is_some())
    }

    async fn insert(&mut self, employee: &Employee, cancel: &CancellationToken) -> AppResult<()> {
        ensure_not_cancelled(cancel)?;
        self.staged.insert(employee.id(), employee.snapshot());
        Ok(())
    }

    async fn mark_dirty(
        &mut self,
        employee: &Employee,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        ensure_not_cancelled(cancel)?;
        let known = self.staged.contains_key(&employee.id())
            || self.store.read_rows()?.contains_key(&employee.id());
        if !known {
            return Err(AppError::InternalServerError(format!(
                "Cannot update unknown employee {}",
                employee.id()
            )));
        }
        self.staged.insert(employee.id(), employee.snapshot());
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit(self: Box<Self>, cancel: &CancellationToken) -> AppResult<u64> {
        ensure_not_cancelled(cancel)?;

        let mut rows = self.store.write_rows()?;

        // 一意制約の最終チェック（ステージ同士も含む）
        let mut merged = rows.clone();
        for (id, snapshot) in &self.staged {
            merged.insert(*id, snapshot.clone());
        }
        for (id, snapshot) in &self.staged {
            let clash = merged.values().any(|other| {
                other.id != *id
                    && (other.email == snapshot.email
                        || other.document_number == snapshot.document_number)
            });
            if clash {
                tracing::warn!(employee_id = %id, "Unique constraint violated on commit");
                return Err(AppError::BusinessRule(
                    "The email or document number is already registered.".to_string(),
                ));
            }
        }

        let records_affected = self
            .staged
            .values()
            .map(|snapshot| 1 + snapshot.phones.len() as u64)
            .sum();

        *rows = merged;
        Ok(records_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewEmployee, Phone, Role};
    use chrono::NaiveDate;

    fn employee(first: &str, last: &str, email: &str, document: &str) -> Employee {
        let mut employee = Employee::new(NewEmployee {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            document_number: document.to_string(),
            password_hash: "digest".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            role: Role::Employee,
            manager_id: None,
        })
        .unwrap();
        employee.add_phone(Phone::new("11999999999", None).unwrap());
        employee
    }

    #[tokio::test]
    async fn test_staged_writes_are_invisible_until_commit() {
        let store = InMemoryEmployeeStore::new();
        let cancel = CancellationToken::new();
        let ana = employee("Ana", "Costa", "ana@x.com", "1");

        let mut uow = store.begin(&cancel).await.unwrap();
        uow.insert(&ana, &cancel).await.unwrap();

        // 同じユニット内では見える
        assert!(uow.find_by_id(ana.id(), &cancel).await.unwrap().is_some());
        assert!(store.get(ana.id()).is_none());

        let affected = uow.commit(&cancel).await.unwrap();
        assert_eq!(affected, 2);
        assert!(store.get(ana.id()).is_some());
    }

    #[tokio::test]
    async fn test_dropping_unit_discards_changes() {
        let store = InMemoryEmployeeStore::new();
        let cancel = CancellationToken::new();

        {
            let mut uow = store.begin(&cancel).await.unwrap();
            uow.insert(&employee("Ana", "Costa", "ana@x.com", "1"), &cancel)
                .await
                .unwrap();
        }

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_commit_enforces_uniqueness() {
        let store = InMemoryEmployeeStore::new();
        let cancel = CancellationToken::new();

        let mut uow = store.begin(&cancel).await.unwrap();
        uow.insert(&employee("Ana", "Costa", "ana@x.com", "1"), &cancel)
            .await
            .unwrap();
        uow.commit(&cancel).await.unwrap();

        // 並行リクエストが既存チェックをすり抜けたケース
        let mut uow = store.begin(&cancel).await.unwrap();
        uow.insert(&employee("Bia", "Lima", "ana@x.com", "2"), &cancel)
            .await
            .unwrap();
        let result = uow.commit(&cancel).await;

        assert!(matches!(result, Err(AppError::BusinessRule(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_lists_are_ordered_and_filter_inactive() {
        let store = InMemoryEmployeeStore::new();
        let cancel = CancellationToken::new();
        let mut inactive = employee("Carla", "Dias", "carla@x.com", "3");
        inactive.deactivate();

        let mut uow = store.begin(&cancel).await.unwrap();
        uow.insert(&employee("Bruno", "Souza", "bruno@x.com", "1"), &cancel)
            .await
            .unwrap();
        uow.insert(&employee("Ana", "Zanetti", "ana.z@x.com", "2"), &cancel)
            .await
            .unwrap();
        uow.insert(&employee("Ana", "Costa", "ana.c@x.com", "4"), &cancel)
            .await
            .unwrap();
        uow.insert(&inactive, &cancel).await.unwrap();
        uow.commit(&cancel).await.unwrap();

        let uow = store.begin(&cancel).await.unwrap();
        let names: Vec<String> = uow
            .list_active(&cancel)
            .await
            .unwrap()
            .iter()
            .map(Employee::full_name)
            .collect();
        assert_eq!(names, vec!["Ana Costa", "Ana Zanetti", "Bruno Souza"]);
    }

    #[tokio::test]
    async fn test_cancelled_token_aborts_operations() {
        let store = InMemoryEmployeeStore::new();
        let cancel = CancellationToken::new();
        let ana = employee("Ana", "Costa", "ana@x.com", "1");

        let mut uow = store.begin(&cancel).await.unwrap();
        uow.insert(&ana, &cancel).await.unwrap();

        cancel.cancel();
        assert!(matches!(
            uow.find_by_id(ana.id(), &cancel).await,
            Err(AppError::Cancelled)
        ));
        assert!(matches!(uow.commit(&cancel).await, Err(AppError::Cancelled)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_mark_dirty_requires_known_employee() {
        let store = InMemoryEmployeeStore::new();
        let cancel = CancellationToken::new();

        let mut uow = store.begin(&cancel).await.unwrap();
        let result = uow
            .mark_dirty(&employee("Ana", "Costa", "ana@x.com", "1"), &cancel)
            .await;
        assert!(result.is_err());
    }
}
