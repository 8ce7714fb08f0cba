// tests/common/test_data.rs

use chrono::NaiveDate;
use employee_backend::domain::Role;
use employee_backend::dto::{
    ChangePasswordRequest, CreateEmployeeRequest, EmployeeResponse, LoginRequest, PhoneRequest,
    UpdateEmployeeRequest,
};
use uuid::Uuid;

pub const DEFAULT_PASSWORD: &str = "Secret@123";

/// 電話番号入力を生成
pub fn phone(number: &str, phone_type: Option<&str>) -> PhoneRequest {
    PhoneRequest {
        number: number.to_string(),
        phone_type: phone_type.map(str::to_string),
    }
}

/// 一意なメール・身分証番号で作成リクエストを生成
pub fn create_request(first_name: &str, last_name: &str, role: Role) -> CreateEmployeeRequest {
    let suffix = &Uuid::new_v4().simple().to_string()[..12];
    CreateEmployeeRequest {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}.{}@empresa.com", first_name.to_lowercase(), suffix),
        document_number: format!("DOC{}", suffix),
        password: DEFAULT_PASSWORD.to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 5, 10).unwrap(),
        role,
        manager_id: None,
        phones: vec![phone("11988887777", Some("Mobile"))],
    }
}

/// 既存の社員情報をそのまま引き継いだ更新リクエストを生成
pub fn update_request_from(employee: &EmployeeResponse) -> UpdateEmployeeRequest {
    UpdateEmployeeRequest {
        first_name: employee.first_name.clone(),
        last_name: employee.last_name.clone(),
        email: employee.email.clone(),
        birth_date: employee.birth_date,
        role: employee.role,
        manager_id: employee.manager_id,
        phones: employee
            .phones
            .iter()
            .map(|p| phone(&p.number, p.phone_type.as_deref()))
            .collect(),
    }
}

pub fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub fn change_password_request(current: &str, new: &str) -> ChangePasswordRequest {
    ChangePasswordRequest {
        current_password: current.to_string(),
        new_password: new.to_string(),
    }
}
