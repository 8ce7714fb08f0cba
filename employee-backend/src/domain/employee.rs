// src/domain/employee.rs

use super::{required_trimmed, DomainError, Phone, Role};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;
use validator::ValidateEmail;

pub const NAME_MAX_LENGTH: usize = 100;
pub const EMAIL_MAX_LENGTH: usize = 255;
pub const DOCUMENT_MAX_LENGTH: usize = 50;
pub const MINIMUM_AGE: i32 = 18;

/// 社員作成時に必要な値一式
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub document_number: String,
    pub password_hash: String,
    pub birth_date: NaiveDate,
    pub role: Role,
    pub manager_id: Option<Uuid>,
}

/// 永続化層とのやり取りに使う生の値
#[derive(Debug, Clone)]
pub struct EmployeeSnapshot {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub document_number: String,
    pub password_hash: String,
    pub birth_date: NaiveDate,
    pub role: Role,
    pub is_active: bool,
    pub manager_id: Option<Uuid>,
    pub phones: Vec<Phone>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 社員集約。フィールドの更新は必ずバリデーション付きのセッター経由で行う
#[derive(Debug, Clone)]
pub struct Employee {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    document_number: String,
    password_hash: String,
    birth_date: NaiveDate,
    role: Role,
    is_active: bool,
    manager_id: Option<Uuid>,
    phones: Vec<Phone>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn new(input: NewEmployee) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            first_name: required_trimmed(&input.first_name, "First name", NAME_MAX_LENGTH)?,
            last_name: required_trimmed(&input.last_name, "Last name", NAME_MAX_LENGTH)?,
            email: normalize_email(&input.email)?,
            document_number: required_trimmed(
                &input.document_number,
                "Document number",
                DOCUMENT_MAX_LENGTH,
            )?,
            password_hash: required_hash(&input.password_hash)?,
            birth_date: adult_birth_date(input.birth_date)?,
            role: input.role,
            is_active: true,
            manager_id: input.manager_id,
            phones: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// 永続化層から読み込んだ値で復元（検証はしない）
    pub fn restore(snapshot: EmployeeSnapshot) -> Self {
        Self {
            id: snapshot.id,
            first_name: snapshot.first_name,
            last_name: snapshot.last_name,
            email: snapshot.email,
            document_number: snapshot.document_number,
            password_hash: snapshot.password_hash,
            birth_date: snapshot.birth_date,
            role: snapshot.role,
            is_active: snapshot.is_active,
            manager_id: snapshot.manager_id,
            phones: snapshot.phones,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }

    pub fn snapshot(&self) -> EmployeeSnapshot {
        EmployeeSnapshot {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            document_number: self.document_number.clone(),
            password_hash: self.password_hash.clone(),
            birth_date: self.birth_date,
            role: self.role,
            is_active: self.is_active,
            manager_id: self.manager_id,
            phones: self.phones.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // --- 参照 ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn document_number(&self) -> &str {
        &self.document_number
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn manager_id(&self) -> Option<Uuid> {
        self.manager_id
    }

    pub fn phones(&self) -> &[Phone] {
        &self.phones
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// この社員が指定ロールの社員を作成・更新できるか
    pub fn can_assign_role(&self, target: Role) -> bool {
        self.role.can_assign(target)
    }

    // --- 更新 ---

    pub fn set_first_name(&mut self, first_name: &str) -> Result<(), DomainError> {
        self.first_name = required_trimmed(first_name, "First name", NAME_MAX_LENGTH)?;
        self.touch();
        Ok(())
    }

    pub fn set_last_name(&mut self, last_name: &str) -> Result<(), DomainError> {
        self.last_name = required_trimmed(last_name, "Last name", NAME_MAX_LENGTH)?;
        self.touch();
        Ok(())
    }

    pub fn set_email(&mut self, email: &str) -> Result<(), DomainError> {
        self.email = normalize_email(email)?;
        self.touch();
        Ok(())
    }

    pub fn set_password_hash(&mut self, password_hash: &str) -> Result<(), DomainError> {
        self.password_hash = required_hash(password_hash)?;
        self.touch();
        Ok(())
    }

    pub fn set_birth_date(&mut self, birth_date: NaiveDate) -> Result<(), DomainError> {
        self.birth_date = adult_birth_date(birth_date)?;
        self.touch();
        Ok(())
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.touch();
    }

    pub fn set_manager(&mut self, manager_id: Option<Uuid>) {
        self.manager_id = manager_id;
        self.touch();
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.touch();
    }

    /// 論理削除。行は残し、上司参照や履歴を保つ
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn add_phone(&mut self, phone: Phone) {
        self.phones.push(phone);
        self.touch();
    }

    pub fn remove_phone(&mut self, phone_id: Uuid) -> bool {
        let before = self.phones.len();
        self.phones.retain(|p| p.id() != phone_id);
        let removed = self.phones.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn clear_phones(&mut self) {
        self.phones.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// 指定日時点での満年齢
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

fn adult_birth_date(birth_date: NaiveDate) -> Result<NaiveDate, DomainError> {
    if age_on(birth_date, Utc::now().date_naive()) < MINIMUM_AGE {
        return Err(DomainError::Underage);
    }
    Ok(birth_date)
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = required_trimmed(email, "Email", EMAIL_MAX_LENGTH)?.to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::InvalidEmail(email));
    }
    Ok(email)
}

fn required_hash(password_hash: &str) -> Result<String, DomainError> {
    if password_hash.trim().is_empty() {
        return Err(DomainError::Required("Password"));
    }
    Ok(password_hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Months;

    fn years_ago(years: u32) -> NaiveDate {
        Utc::now()
            .date_naive()
            .checked_sub_months(Months::new(years * 12))
            .unwrap()
    }

    fn new_employee() -> NewEmployee {
        NewEmployee {
            first_name: "João".to_string(),
            last_name: "Silva".to_string(),
            email: "joao.silva@empresa.com".to_string(),
            document_number: "12345678900".to_string(),
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$aGFzaA".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 15).unwrap(),
            role: Role::Employee,
            manager_id: None,
        }
    }

    #[test]
    fn test_new_employee_with_valid_data() {
        let employee = Employee::new(new_employee()).unwrap();

        assert_eq!(employee.first_name(), "João");
        assert_eq!(employee.last_name(), "Silva");
        assert_eq!(employee.email(), "joao.silva@empresa.com");
        assert_eq!(employee.document_number(), "12345678900");
        assert_eq!(employee.role(), Role::Employee);
        assert!(employee.is_active());
        assert!(employee.manager_id().is_none());
        assert!(employee.phones().is_empty());
        assert!(employee.updated_at().is_none());
        assert!(!employee.id().is_nil());
    }

    #[test]
    fn test_full_name() {
        let employee = Employee::new(new_employee()).unwrap();
        assert_eq!(employee.full_name(), "João Silva");
    }

    #[test]
    fn test_fields_are_trimmed() {
        let mut input = new_employee();
        input.first_name = "  Maria ".to_string();
        input.last_name = " Souza  ".to_string();
        input.document_number = " 999 ".to_string();

        let employee = Employee::new(input).unwrap();
        assert_eq!(employee.first_name(), "Maria");
        assert_eq!(employee.last_name(), "Souza");
        assert_eq!(employee.document_number(), "999");
    }

    #[test]
    fn test_underage_is_rejected() {
        let mut input = new_employee();
        input.birth_date = years_ago(17);
        assert_eq!(Employee::new(input).unwrap_err(), DomainError::Underage);
    }

    #[test]
    fn test_exactly_eighteen_is_accepted() {
        let mut input = new_employee();
        input.birth_date = years_ago(18);
        assert!(Employee::new(input).is_ok());
    }

    #[test]
    fn test_set_birth_date_rechecks_age() {
        let mut employee = Employee::new(new_employee()).unwrap();
        let original = employee.birth_date();

        assert_eq!(
            employee.set_birth_date(years_ago(10)),
            Err(DomainError::Underage)
        );
        assert_eq!(employee.birth_date(), original);
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let birth = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2018, 6, 14).unwrap()), 17);
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2018, 6, 15).unwrap()), 18);
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()), 18);
    }

    #[test]
    fn test_required_fields() {
        let mut input = new_employee();
        input.first_name = "   ".to_string();
        assert_eq!(
            Employee::new(input).unwrap_err(),
            DomainError::Required("First name")
        );

        let mut input = new_employee();
        input.last_name = String::new();
        assert_eq!(
            Employee::new(input).unwrap_err(),
            DomainError::Required("Last name")
        );

        let mut input = new_employee();
        input.email = String::new();
        assert_eq!(
            Employee::new(input).unwrap_err(),
            DomainError::Required("Email")
        );

        let mut input = new_employee();
        input.password_hash = " ".to_string();
        assert_eq!(
            Employee::new(input).unwrap_err(),
            DomainError::Required("Password")
        );
    }

    #[test]
    fn test_name_length_limit() {
        let mut input = new_employee();
        input.first_name = "a".repeat(101);
        assert_eq!(
            Employee::new(input).unwrap_err(),
            DomainError::TooLong {
                field: "First name",
                max: 100
            }
        );
    }

    #[test]
    fn test_set_email_normalizes_to_lowercase() {
        let mut employee = Employee::new(new_employee()).unwrap();
        employee.set_email("JOHN@X.COM").unwrap();
        assert_eq!(employee.email(), "john@x.com");
        assert!(employee.updated_at().is_some());
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        let mut employee = Employee::new(new_employee()).unwrap();
        assert!(matches!(
            employee.set_email("not-an-email"),
            Err(DomainError::InvalidEmail(_))
        ));
        assert_eq!(employee.email(), "joao.silva@empresa.com");
    }

    #[test]
    fn test_can_assign_role() {
        let mut input = new_employee();
        input.role = Role::Leader;
        let leader = Employee::new(input).unwrap();

        assert!(leader.can_assign_role(Role::Employee));
        assert!(leader.can_assign_role(Role::Leader));
        assert!(!leader.can_assign_role(Role::Director));
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let mut employee = Employee::new(new_employee()).unwrap();

        employee.deactivate();
        assert!(!employee.is_active());

        employee.deactivate();
        assert!(!employee.is_active());
        assert!(employee.updated_at().is_some());
    }

    #[test]
    fn test_activate_after_deactivate() {
        let mut employee = Employee::new(new_employee()).unwrap();
        employee.deactivate();
        employee.activate();
        employee.activate();
        assert!(employee.is_active());
    }

    #[test]
    fn test_phone_collection() {
        let mut employee = Employee::new(new_employee()).unwrap();
        let phone = Phone::new("11999999999", Some("Mobile")).unwrap();
        let phone_id = phone.id();

        employee.add_phone(phone);
        employee.add_phone(Phone::new("1133334444", None).unwrap());
        assert_eq!(employee.phones().len(), 2);

        assert!(employee.remove_phone(phone_id));
        assert!(!employee.remove_phone(phone_id));
        assert_eq!(employee.phones().len(), 1);
        assert_eq!(employee.phones()[0].number(), "1133334444");

        employee.clear_phones();
        assert!(employee.phones().is_empty());
    }

    #[test]
    fn test_snapshot_restore_keeps_identity() {
        let mut employee = Employee::new(new_employee()).unwrap();
        employee.add_phone(Phone::new("11999999999", None).unwrap());

        let restored = Employee::restore(employee.snapshot());
        assert_eq!(restored.id(), employee.id());
        assert_eq!(restored.document_number(), employee.document_number());
        assert_eq!(restored.phones(), employee.phones());
        assert_eq!(restored.created_at(), employee.created_at());
    }
}
