// src/repository/employee_repository.rs

use crate::domain::Employee;
use crate::error::AppResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// 社員の永続化操作。すべての呼び出しは呼び出し元のキャンセル信号に従う
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// IDで検索（電話番号込み）
    async fn find_by_id(&self, id: Uuid, cancel: &CancellationToken)
        -> AppResult<Option<Employee>>;

    /// 正規化済み（小文字）のメールアドレスで検索
    async fn find_by_email(
        &self,
        email: &str,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Employee>>;

    async fn find_by_document_number(
        &self,
        document_number: &str,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Employee>>;

    /// 有効な社員を名→姓の順で取得
    async fn list_active(&self, cancel: &CancellationToken) -> AppResult<Vec<Employee>>;

    /// 指定上司の配下にいる有効な社員を名→姓の順で取得
    async fn list_by_manager(
        &self,
        manager_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<Employee>>;

    /// 有効・無効を問わない全件数
    async fn count(&self, cancel: &CancellationToken) -> AppResult<u64>;

    async fn exists_by_email(&self, email: &str, cancel: &CancellationToken) -> AppResult<bool>;

    async fn exists_by_document_number(
        &self,
        document_number: &str,
        cancel: &CancellationToken,
    ) -> AppResult<bool>;

    async fn insert(&mut self, employee: &Employee, cancel: &CancellationToken) -> AppResult<()>;

    /// 既存社員の変更を記録（電話番号は丸ごと置き換え）
    async fn mark_dirty(&mut self, employee: &Employee, cancel: &CancellationToken)
        -> AppResult<()>;
}

/// ユースケース1回分の原子的な境界。commit せずに破棄するとロールバックされる
#[async_trait]
pub trait UnitOfWork: EmployeeRepository {
    /// 変更を確定し、書き込んだレコード数を返す
    async fn commit(self: Box<Self>, cancel: &CancellationToken) -> AppResult<u64>;
}

#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self, cancel: &CancellationToken) -> AppResult<Box<dyn UnitOfWork>>;
}

/// 名→姓の順で並べる
pub(crate) fn sort_by_name(employees: &mut [Employee]) {
    employees.sort_by(|a, b| {
        a.first_name()
            .cmp(b.first_name())
            .then_with(|| a.last_name().cmp(b.last_name()))
    });
}
