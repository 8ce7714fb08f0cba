// src/error.rs

use crate::domain::DomainError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(DbErr),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Validation failed")]
    ValidationFailure(#[from] ValidationErrors),

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

/// 呼び出し側に見せるエラー分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 参照先が存在しない（404相当）
    NotFound,
    /// ドメインルール違反（400相当）
    BusinessRule,
    /// それ以外（500相当、詳細は外に出さない）
    Internal,
}

// 一意制約違反はコミット時の最終防衛線なので業務ルール違反として扱う
impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::warn!(detail = %detail, "Unique constraint violated on commit");
                AppError::BusinessRule(
                    "The email or document number is already registered.".to_string(),
                )
            }
            _ => AppError::DbErr(err),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BusinessRule(err.to_string())
    }
}

impl AppError {
    pub fn not_found(entity: &str, key: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{} with identifier '{}' was not found.", entity, key))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::BusinessRule(_) | AppError::ValidationFailure(_) => ErrorKind::BusinessRule,
            AppError::DbErr(_) | AppError::Cancelled | AppError::InternalServerError(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// HTTP相当のステータスコード
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::BusinessRule => 400,
            ErrorKind::Internal => 500,
        }
    }

    /// 呼び出し側へ返すレスポンスを組み立てる（内部エラーの詳細はログにのみ出す）
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(message) => ErrorResponse::plain(message, "not_found"),
            AppError::BusinessRule(message) => ErrorResponse::plain(message, "business_rule"),
            AppError::ValidationFailure(errors) => {
                let field_errors: HashMap<String, Vec<String>> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errors)| {
                        let messages = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map_or_else(|| "Invalid value".to_string(), |m| m.to_string())
                            })
                            .collect();
                        (field.to_string(), messages)
                    })
                    .collect();
                ErrorResponse {
                    success: false,
                    error: "Validation failed".to_string(),
                    message: "Validation failed".to_string(),
                    validation_errors: Some(field_errors),
                    error_type: "validation_errors".to_string(),
                }
            }
            AppError::DbErr(db_err) => {
                tracing::error!(error = ?db_err, "Database error");
                ErrorResponse::plain("An internal server error occurred", "internal_server_error")
            }
            AppError::Cancelled => {
                tracing::warn!("Operation cancelled by caller");
                ErrorResponse::plain("The operation was cancelled", "cancelled")
            }
            AppError::InternalServerError(message) => {
                tracing::error!(error = %message, "Internal server error");
                ErrorResponse::plain("An internal server error occurred", "internal_server_error")
            }
        }
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<HashMap<String, Vec<String>>>,
    pub error_type: String,
}

impl ErrorResponse {
    fn plain(message: &str, error_type: &str) -> Self {
        Self {
            success: false,
            error: message.to_string(),
            message: message.to_string(),
            validation_errors: None,
            error_type: error_type.to_string(),
        }
    }
}
