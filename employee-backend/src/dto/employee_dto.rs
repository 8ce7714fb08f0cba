// src/dto/employee_dto.rs

use crate::domain::{Employee, Phone, Role};
use crate::utils::validation as rules;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- リクエストDTO ---

/// 電話番号の入力
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PhoneRequest {
    #[validate(
        length(
            min = rules::phone::NUMBER_MIN_LENGTH,
            max = rules::phone::NUMBER_MAX_LENGTH,
            message = "Phone number must be between 1 and 20 characters"
        ),
        custom(function = rules::validate_not_empty_or_whitespace)
    )]
    pub number: String,

    #[serde(rename = "type", default)]
    #[validate(length(
        max = rules::phone::TYPE_MAX_LENGTH,
        message = "Phone type must not exceed 50 characters"
    ))]
    pub phone_type: Option<String>,
}

/// 社員作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[validate(
        length(
            min = rules::name::MIN_LENGTH,
            max = rules::name::MAX_LENGTH,
            message = "First name must be between 1 and 100 characters"
        ),
        custom(function = rules::validate_not_empty_or_whitespace)
    )]
    pub first_name: String,

    #[validate(
        length(
            min = rules::name::MIN_LENGTH,
            max = rules::name::MAX_LENGTH,
            message = "Last name must be between 1 and 100 characters"
        ),
        custom(function = rules::validate_not_empty_or_whitespace)
    )]
    pub last_name: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = rules::email::MAX_LENGTH, message = "Email must not exceed 255 characters")
    )]
    pub email: String,

    #[validate(
        length(
            min = rules::document::MIN_LENGTH,
            max = rules::document::MAX_LENGTH,
            message = "Document number must be between 1 and 50 characters"
        ),
        custom(function = rules::validate_not_empty_or_whitespace)
    )]
    pub document_number: String,

    #[validate(
        length(min = rules::password::MIN_LENGTH, message = "Password must be at least 8 characters"),
        custom(function = rules::validate_password_strength)
    )]
    pub password: String,

    #[validate(custom(function = rules::validate_adult_birth_date))]
    pub birth_date: NaiveDate,

    pub role: Role,

    pub manager_id: Option<Uuid>,

    #[validate(
        length(min = 1, message = "At least one phone number is required"),
        nested
    )]
    pub phones: Vec<PhoneRequest>,
}

/// 社員更新リクエスト（身分証番号とパスワードは変更不可）
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateEmployeeRequest {
    #[validate(
        length(
            min = rules::name::MIN_LENGTH,
            max = rules::name::MAX_LENGTH,
            message = "First name must be between 1 and 100 characters"
        ),
        custom(function = rules::validate_not_empty_or_whitespace)
    )]
    pub first_name: String,

    #[validate(
        length(
            min = rules::name::MIN_LENGTH,
            max = rules::name::MAX_LENGTH,
            message = "Last name must be between 1 and 100 characters"
        ),
        custom(function = rules::validate_not_empty_or_whitespace)
    )]
    pub last_name: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = rules::email::MAX_LENGTH, message = "Email must not exceed 255 characters")
    )]
    pub email: String,

    #[validate(custom(function = rules::validate_adult_birth_date))]
    pub birth_date: NaiveDate,

    pub role: Role,

    pub manager_id: Option<Uuid>,

    #[validate(
        length(min = 1, message = "At least one phone number is required"),
        nested
    )]
    pub phones: Vec<PhoneRequest>,
}

/// パスワード変更リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(
        length(min = rules::password::MIN_LENGTH, message = "New password must be at least 8 characters"),
        custom(function = rules::validate_password_strength)
    )]
    pub new_password: String,
}

// --- レスポンスDTO ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneResponse {
    pub id: Uuid,
    pub number: String,
    #[serde(rename = "type")]
    pub phone_type: Option<String>,
}

impl From<&Phone> for PhoneResponse {
    fn from(phone: &Phone) -> Self {
        Self {
            id: phone.id(),
            number: phone.number().to_string(),
            phone_type: phone.phone_type().map(str::to_string),
        }
    }
}

/// 社員の公開用表現（パスワードハッシュは含めない）
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub document_number: String,
    pub birth_date: NaiveDate,
    pub role: Role,
    pub is_active: bool,
    pub manager_id: Option<Uuid>,
    pub manager_name: Option<String>,
    pub phones: Vec<PhoneResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EmployeeResponse {
    /// 上司名は呼び出し側で解決して渡す
    pub fn from_employee(employee: &Employee, manager_name: Option<String>) -> Self {
        Self {
            id: employee.id(),
            first_name: employee.first_name().to_string(),
            last_name: employee.last_name().to_string(),
            full_name: employee.full_name(),
            email: employee.email().to_string(),
            document_number: employee.document_number().to_string(),
            birth_date: employee.birth_date(),
            role: employee.role(),
            is_active: employee.is_active(),
            manager_id: employee.manager_id(),
            manager_name,
            phones: employee.phones().iter().map(PhoneResponse::from).collect(),
            created_at: employee.created_at(),
            updated_at: employee.updated_at(),
        }
    }
}
