// src/service/employee_directory.rs

use super::authorization::AuthorizationPolicy;
use crate::config::SeedConfig;
use crate::domain::{Employee, NewEmployee, Phone, Role};
use crate::dto::{
    ChangePasswordRequest, CreateEmployeeRequest, EmployeeResponse, LoginRequest, LoginResponse,
    PhoneRequest, UpdateEmployeeRequest,
};
use crate::error::{AppError, AppResult};
use crate::logging::OperationContext;
use crate::repository::{EmployeeRepository, UnitOfWork, UnitOfWorkFactory};
use crate::utils::jwt::SessionIssuer;
use crate::utils::password::PasswordHasher;
use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password.";
const INACTIVE_ACCOUNT: &str = "This account is inactive. Please contact an administrator.";
const WRONG_CURRENT_PASSWORD: &str = "The current password is incorrect.";
const SELF_MANAGEMENT: &str = "An employee cannot be their own manager.";
const MANAGEMENT_CYCLE: &str = "The selected manager reports, directly or indirectly, to this employee.";

// 未登録メールでも照合コストを揃えるためのダミー
const TIMING_PASSWORD: &str = "timing-equalization-only";

const SEED_DOCUMENT_NUMBER: &str = "00000000000";
const SEED_PHONE_NUMBER: &str = "11999999999";

/// 社員の作成・更新・削除・パスワード変更・ログインを束ねるユースケース層
///
/// 各操作は固定順のゲートを順に評価し、最初に失敗したゲートのエラーを返す。
/// 読み取りと書き込みは1つのユニットオブワークで行い、最後に commit する。
#[derive(Clone)]
pub struct EmployeeDirectory {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    password_hasher: Arc<dyn PasswordHasher>,
    session_issuer: Arc<dyn SessionIssuer>,
    timing_digest: Arc<OnceCell<String>>,
}

impl EmployeeDirectory {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        password_hasher: Arc<dyn PasswordHasher>,
        session_issuer: Arc<dyn SessionIssuer>,
    ) -> Self {
        Self {
            uow_factory,
            password_hasher,
            session_issuer,
            timing_digest: Arc::new(OnceCell::new()),
        }
    }

    /// 実在しないアカウントに対しても1回分のハッシュ照合を行う
    fn verify_against_dummy(&self, password: &str) {
        match self
            .timing_digest
            .get_or_try_init(|| self.password_hasher.hash(TIMING_PASSWORD))
        {
            Ok(digest) => {
                let _ = self.password_hasher.verify(password, digest);
            }
            Err(e) => warn!(error = %e, "Failed to prepare timing digest"),
        }
    }

    // --- 認証 ---

    /// ログイン。未登録メールとパスワード誤りは同じメッセージで失敗させる
    pub async fn login(
        &self,
        request: LoginRequest,
        cancel: &CancellationToken,
    ) -> AppResult<LoginResponse> {
        let context = OperationContext::start("login", None);
        let result = self.login_inner(request, cancel).await;
        context.finish(&result);
        result
    }

    async fn login_inner(
        &self,
        request: LoginRequest,
        cancel: &CancellationToken,
    ) -> AppResult<LoginResponse> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let uow = self.uow_factory.begin(cancel).await?;

        let employee = match uow.find_by_email(&email, cancel).await? {
            Some(employee) => employee,
            None => {
                self.verify_against_dummy(&request.password);
                warn!(email = %email, "Login attempt for unknown email");
                return Err(AppError::BusinessRule(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !employee.is_active() {
            warn!(employee_id = %employee.id(), "Login attempt for inactive account");
            return Err(AppError::BusinessRule(INACTIVE_ACCOUNT.to_string()));
        }

        if !self
            .password_hasher
            .verify(&request.password, employee.password_hash())
        {
            warn!(employee_id = %employee.id(), "Login attempt with wrong password");
            return Err(AppError::BusinessRule(INVALID_CREDENTIALS.to_string()));
        }

        let session = self.session_issuer.issue(&employee)?;
        let projection = project(uow.as_ref(), &employee, cancel).await?;

        info!(
            employee_id = %employee.id(),
            role = %employee.role(),
            "Employee logged in"
        );

        Ok(LoginResponse {
            token: session.token,
            expires_at: session.expires_at,
            employee: projection,
        })
    }

    // --- 作成・更新 ---

    pub async fn create_employee(
        &self,
        requester_id: Uuid,
        request: CreateEmployeeRequest,
        cancel: &CancellationToken,
    ) -> AppResult<EmployeeResponse> {
        let context = OperationContext::start("create_employee", Some(requester_id));
        let result = self.create_inner(requester_id, request, cancel).await;
        context.finish(&result);
        result
    }

    async fn create_inner(
        &self,
        requester_id: Uuid,
        request: CreateEmployeeRequest,
        cancel: &CancellationToken,
    ) -> AppResult<EmployeeResponse> {
        request.validate()?;

        let mut uow = self.uow_factory.begin(cancel).await?;

        // 1. 作成者
        let requester = uow
            .find_by_id(requester_id, cancel)
            .await?
            .ok_or_else(|| AppError::not_found("Requesting employee", requester_id))?;

        // 2. 権限
        AuthorizationPolicy::ensure_can_assign(requester.id(), requester.role(), request.role)?;

        // 3. 一意性
        let email = normalize_email(&request.email);
        if uow.exists_by_email(&email, cancel).await? {
            warn!(email = %email, "Duplicate email on create");
            return Err(AppError::BusinessRule(format!(
                "The email '{}' is already registered.",
                email
            )));
        }

        let document_number = request.document_number.trim().to_string();
        if uow
            .exists_by_document_number(&document_number, cancel)
            .await?
        {
            warn!(document_number = %document_number, "Duplicate document number on create");
            return Err(AppError::BusinessRule(format!(
                "The document '{}' is already registered.",
                document_number
            )));
        }

        // 4. 上司
        if let Some(manager_id) = request.manager_id {
            ensure_manager_exists(uow.as_ref(), manager_id, cancel).await?;
        }

        // 5. 集約の組み立て
        let password_hash = self.password_hasher.hash(&request.password)?;
        let mut employee = Employee::new(NewEmployee {
            first_name: request.first_name,
            last_name: request.last_name,
            email,
            document_number,
            password_hash,
            birth_date: request.birth_date,
            role: request.role,
            manager_id: request.manager_id,
        })?;
        for phone in build_phones(&request.phones)? {
            employee.add_phone(phone);
        }

        // 6. 永続化して読み直す
        uow.insert(&employee, cancel).await?;
        let response = reread(uow.as_ref(), employee.id(), cancel).await?;
        uow.commit(cancel).await?;

        info!(
            employee_id = %employee.id(),
            requester_id = %requester_id,
            role = %employee.role(),
            "Employee created"
        );
        Ok(response)
    }

    pub async fn update_employee(
        &self,
        employee_id: Uuid,
        requester_id: Uuid,
        request: UpdateEmployeeRequest,
        cancel: &CancellationToken,
    ) -> AppResult<EmployeeResponse> {
        let context = OperationContext::start("update_employee", Some(requester_id));
        let result = self
            .update_inner(employee_id, requester_id, request, cancel)
            .await;
        context.finish(&result);
        result
    }

    async fn update_inner(
        &self,
        employee_id: Uuid,
        requester_id: Uuid,
        request: UpdateEmployeeRequest,
        cancel: &CancellationToken,
    ) -> AppResult<EmployeeResponse> {
        request.validate()?;

        let mut uow = self.uow_factory.begin(cancel).await?;

        // 1. 対象
        let mut employee = uow
            .find_by_id(employee_id, cancel)
            .await?
            .ok_or_else(|| AppError::not_found("Employee", employee_id))?;

        // 2. 更新者と権限（新しいロールに対して判定）
        let requester = uow
            .find_by_id(requester_id, cancel)
            .await?
            .ok_or_else(|| AppError::not_found("Requesting employee", requester_id))?;
        AuthorizationPolicy::ensure_can_assign(requester.id(), requester.role(), request.role)?;

        // 3. 自分以外とのメール重複
        let email = normalize_email(&request.email);
        if let Some(existing) = uow.find_by_email(&email, cancel).await? {
            if existing.id() != employee_id {
                warn!(email = %email, employee_id = %employee_id, "Duplicate email on update");
                return Err(AppError::BusinessRule(format!(
                    "The email '{}' is already registered.",
                    email
                )));
            }
        }

        // 4. 上司（自己参照と循環の防止）
        if let Some(manager_id) = request.manager_id {
            if manager_id == employee_id {
                warn!(employee_id = %employee_id, "Employee set as own manager");
                return Err(AppError::BusinessRule(SELF_MANAGEMENT.to_string()));
            }
            let manager = ensure_manager_exists(uow.as_ref(), manager_id, cancel).await?;
            ensure_no_management_cycle(uow.as_ref(), employee_id, &manager, cancel).await?;
        }

        // 5. 値の反映（電話番号は丸ごと置き換え）
        apply_update(&mut employee, &request)?;

        // 6. 永続化して読み直す
        uow.mark_dirty(&employee, cancel).await?;
        let response = reread(uow.as_ref(), employee_id, cancel).await?;
        uow.commit(cancel).await?;

        info!(
            employee_id = %employee_id,
            requester_id = %requester_id,
            role = %employee.role(),
            "Employee updated"
        );
        Ok(response)
    }

    // --- 削除・パスワード ---

    /// 論理削除（行は残す）
    pub async fn delete_employee(
        &self,
        employee_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let context = OperationContext::start("delete_employee", None);
        let result = self.delete_inner(employee_id, cancel).await;
        context.finish(&result);
        result
    }

    async fn delete_inner(&self, employee_id: Uuid, cancel: &CancellationToken) -> AppResult<()> {
        let mut uow = self.uow_factory.begin(cancel).await?;

        let mut employee = uow
            .find_by_id(employee_id, cancel)
            .await?
            .ok_or_else(|| AppError::not_found("Employee", employee_id))?;

        employee.deactivate();
        uow.mark_dirty(&employee, cancel).await?;
        uow.commit(cancel).await?;

        info!(employee_id = %employee_id, "Employee deactivated");
        Ok(())
    }

    pub async fn change_password(
        &self,
        employee_id: Uuid,
        request: ChangePasswordRequest,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let context = OperationContext::start("change_password", Some(employee_id));
        let result = self.change_password_inner(employee_id, request, cancel).await;
        context.finish(&result);
        result
    }

    async fn change_password_inner(
        &self,
        employee_id: Uuid,
        request: ChangePasswordRequest,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        request.validate()?;

        let mut uow = self.uow_factory.begin(cancel).await?;

        let mut employee = uow
            .find_by_id(employee_id, cancel)
            .await?
            .ok_or_else(|| AppError::not_found("Employee", employee_id))?;

        if !self
            .password_hasher
            .verify(&request.current_password, employee.password_hash())
        {
            warn!(employee_id = %employee_id, "Password change with wrong current password");
            return Err(AppError::BusinessRule(WRONG_CURRENT_PASSWORD.to_string()));
        }

        let new_hash = self.password_hasher.hash(&request.new_password)?;
        employee.set_password_hash(&new_hash)?;

        uow.mark_dirty(&employee, cancel).await?;
        uow.commit(cancel).await?;

        info!(employee_id = %employee_id, "Password changed");
        Ok(())
    }

    // --- 参照 ---

    pub async fn get_employee_by_id(
        &self,
        employee_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<EmployeeResponse> {
        let uow = self.uow_factory.begin(cancel).await?;
        reread(uow.as_ref(), employee_id, cancel).await
    }

    /// 有効な社員の一覧（名→姓の順）
    pub async fn list_active_employees(
        &self,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<EmployeeResponse>> {
        let uow = self.uow_factory.begin(cancel).await?;
        let employees = uow.list_active(cancel).await?;
        project_all(uow.as_ref(), employees, cancel).await
    }

    /// 指定上司の配下にいる有効な社員（名→姓の順）
    pub async fn get_subordinates(
        &self,
        manager_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<EmployeeResponse>> {
        info!(manager_id = %manager_id, "Listing subordinates");

        let uow = self.uow_factory.begin(cancel).await?;
        let employees = uow.list_by_manager(manager_id, cancel).await?;
        project_all(uow.as_ref(), employees, cancel).await
    }

    // --- 初期データ ---

    /// 社員が1人もいなければ初期ディレクターを作成する。作成したら true
    pub async fn seed_initial_director(
        &self,
        seed: &SeedConfig,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        let mut uow = self.uow_factory.begin(cancel).await?;
        if uow.count(cancel).await? > 0 {
            return Ok(false);
        }

        let password_hash = self.password_hasher.hash(&seed.director_password)?;
        let birth_date = NaiveDate::from_ymd_opt(1990, 1, 1).ok_or_else(|| {
            AppError::InternalServerError("Invalid seed birth date".to_string())
        })?;

        let mut director = Employee::new(NewEmployee {
            first_name: "Admin".to_string(),
            last_name: "Sistema".to_string(),
            email: seed.director_email.clone(),
            document_number: SEED_DOCUMENT_NUMBER.to_string(),
            password_hash,
            birth_date,
            role: Role::Director,
            manager_id: None,
        })?;
        director.add_phone(Phone::new(SEED_PHONE_NUMBER, Some("Mobile"))?);

        uow.insert(&director, cancel).await?;
        uow.commit(cancel).await?;

        info!(
            employee_id = %director.id(),
            email = %director.email(),
            "Initial director created"
        );
        Ok(true)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn build_phones(requests: &[PhoneRequest]) -> AppResult<Vec<Phone>> {
    requests
        .iter()
        .map(|p| Phone::new(&p.number, p.phone_type.as_deref()).map_err(AppError::from))
        .collect()
}

fn apply_update(employee: &mut Employee, request: &UpdateEmployeeRequest) -> AppResult<()> {
    let phones = build_phones(&request.phones)?;

    employee.set_first_name(&request.first_name)?;
    employee.set_last_name(&request.last_name)?;
    employee.set_email(&request.email)?;
    employee.set_birth_date(request.birth_date)?;
    employee.set_role(request.role);
    employee.set_manager(request.manager_id);

    employee.clear_phones();
    for phone in phones {
        employee.add_phone(phone);
    }
    Ok(())
}

async fn ensure_manager_exists(
    uow: &dyn UnitOfWork,
    manager_id: Uuid,
    cancel: &CancellationToken,
) -> AppResult<Employee> {
    uow.find_by_id(manager_id, cancel)
        .await?
        .ok_or_else(|| AppError::not_found("Manager", manager_id))
}

/// 新しい上司から上司チェーンを辿り、対象社員に戻ってくるなら循環とみなす
async fn ensure_no_management_cycle(
    uow: &dyn UnitOfWork,
    employee_id: Uuid,
    manager: &Employee,
    cancel: &CancellationToken,
) -> AppResult<()> {
    let mut visited = HashSet::from([manager.id()]);
    let mut next = manager.manager_id();

    while let Some(current) = next {
        if current == employee_id {
            warn!(
                employee_id = %employee_id,
                manager_id = %manager.id(),
                "Manager assignment would create a cycle"
            );
            return Err(AppError::BusinessRule(MANAGEMENT_CYCLE.to_string()));
        }
        // 既存データに別の循環があっても止まるように
        if !visited.insert(current) {
            break;
        }
        next = match uow.find_by_id(current, cancel).await? {
            Some(ancestor) => ancestor.manager_id(),
            None => None,
        };
    }
    Ok(())
}

async fn reread(
    uow: &dyn UnitOfWork,
    employee_id: Uuid,
    cancel: &CancellationToken,
) -> AppResult<EmployeeResponse> {
    let employee = uow
        .find_by_id(employee_id, cancel)
        .await?
        .ok_or_else(|| AppError::not_found("Employee", employee_id))?;
    project(uow, &employee, cancel).await
}

async fn project(
    uow: &dyn UnitOfWork,
    employee: &Employee,
    cancel: &CancellationToken,
) -> AppResult<EmployeeResponse> {
    let manager_name = match employee.manager_id() {
        Some(manager_id) => uow
            .find_by_id(manager_id, cancel)
            .await?
            .map(|manager| manager.full_name()),
        None => None,
    };
    Ok(EmployeeResponse::from_employee(employee, manager_name))
}

async fn project_all(
    uow: &dyn UnitOfWork,
    employees: Vec<Employee>,
    cancel: &CancellationToken,
) -> AppResult<Vec<EmployeeResponse>> {
    let mut names: HashMap<Uuid, Option<String>> = HashMap::new();
    let mut responses = Vec::with_capacity(employees.len());

    for employee in &employees {
        let manager_name = match employee.manager_id() {
            Some(manager_id) => {
                if !names.contains_key(&manager_id) {
                    let name = uow
                        .find_by_id(manager_id, cancel)
                        .await?
                        .map(|manager| manager.full_name());
                    names.insert(manager_id, name);
                }
                names.get(&manager_id).cloned().flatten()
            }
            None => None,
        };
        responses.push(EmployeeResponse::from_employee(employee, manager_name));
    }
    Ok(responses)
}
