// src/domain/mod.rs
pub mod employee;
pub mod employee_model;
pub mod phone;
pub mod phone_model;
pub mod role;

pub use employee::{age_on, Employee, EmployeeSnapshot, NewEmployee};
pub use phone::Phone;
pub use role::Role;

use thiserror::Error;

/// 集約の不変条件違反
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0} is required.")]
    Required(&'static str),

    #[error("{field} must be at most {max} characters.")]
    TooLong { field: &'static str, max: usize },

    #[error("The email address '{0}' is not valid.")]
    InvalidEmail(String),

    #[error("The employee must be at least 18 years old.")]
    Underage,
}

/// 前後の空白を除去し、必須・最大長をチェックする
pub(crate) fn required_trimmed(
    value: &str,
    field: &'static str,
    max: usize,
) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Required(field));
    }
    if trimmed.chars().count() > max {
        return Err(DomainError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}
