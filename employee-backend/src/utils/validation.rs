// src/utils/validation.rs

//! DTO 用の共通バリデーション定数とカスタム関数

use crate::domain::{age_on, employee::MINIMUM_AGE};
use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// 氏名の制約
pub mod name {
    pub const MIN_LENGTH: u64 = 1;
    pub const MAX_LENGTH: u64 = 100;
}

/// メールアドレスの制約
pub mod email {
    pub const MAX_LENGTH: u64 = 255;
}

/// 身分証番号の制約
pub mod document {
    pub const MIN_LENGTH: u64 = 1;
    pub const MAX_LENGTH: u64 = 50;
}

/// パスワードの制約
pub mod password {
    pub const MIN_LENGTH: u64 = 8;
    pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()-+";
}

/// 電話番号の制約
pub mod phone {
    pub const NUMBER_MIN_LENGTH: u64 = 1;
    pub const NUMBER_MAX_LENGTH: u64 = 20;
    pub const TYPE_MAX_LENGTH: u64 = 50;
}

/// 大文字・小文字・数字・記号をそれぞれ1文字以上含むか
pub static PASSWORD_CLASSES: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"[A-Z]").expect("Invalid uppercase regex"),
        Regex::new(r"[a-z]").expect("Invalid lowercase regex"),
        Regex::new(r"[0-9]").expect("Invalid digit regex"),
        Regex::new(r"[!@#$%^&*()\-+]").expect("Invalid special character regex"),
    ]
});

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// パスワードの強度をバリデーション（長さは length 属性で別途チェック）
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let [upper, lower, digit, special] = &*PASSWORD_CLASSES;

    if !upper.is_match(password) {
        return Err(error(
            "password_uppercase",
            "Password must contain at least one uppercase letter",
        ));
    }
    if !lower.is_match(password) {
        return Err(error(
            "password_lowercase",
            "Password must contain at least one lowercase letter",
        ));
    }
    if !digit.is_match(password) {
        return Err(error(
            "password_digit",
            "Password must contain at least one digit",
        ));
    }
    if !special.is_match(password) {
        return Err(error(
            "password_special",
            "Password must contain at least one special character (!@#$%^&*()-+)",
        ));
    }

    Ok(())
}

/// 文字列が空白のみでないかをチェック
pub fn validate_not_empty_or_whitespace(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error(
            "empty_or_whitespace",
            "Field cannot be empty or contain only whitespace",
        ));
    }
    Ok(())
}

/// 生年月日から18歳以上かをチェック
pub fn validate_adult_birth_date(birth_date: &NaiveDate) -> Result<(), ValidationError> {
    if age_on(*birth_date, Utc::now().date_naive()) < MINIMUM_AGE {
        return Err(error(
            "underage",
            "The employee must be at least 18 years old",
        ));
    }
    Ok(())
}
