// src/domain/phone.rs

use super::{required_trimmed, DomainError};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const NUMBER_MAX_LENGTH: usize = 20;
pub const TYPE_MAX_LENGTH: usize = 50;

/// 社員の連絡先電話番号。所有者である社員と一緒に作成・破棄される
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phone {
    id: Uuid,
    number: String,
    phone_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Phone {
    pub fn new(number: &str, phone_type: Option<&str>) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            number: required_trimmed(number, "Phone number", NUMBER_MAX_LENGTH)?,
            phone_type: normalize_type(phone_type)?,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// 永続化層から読み込んだ値で復元
    pub fn restore(
        id: Uuid,
        number: String,
        phone_type: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            number,
            phone_type,
            created_at,
            updated_at,
        }
    }

    pub fn set_number(&mut self, number: &str) -> Result<(), DomainError> {
        self.number = required_trimmed(number, "Phone number", NUMBER_MAX_LENGTH)?;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn set_type(&mut self, phone_type: Option<&str>) -> Result<(), DomainError> {
        self.phone_type = normalize_type(phone_type)?;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn phone_type(&self) -> Option<&str> {
        self.phone_type.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

// 空文字の種別は「指定なし」として扱う
fn normalize_type(phone_type: Option<&str>) -> Result<Option<String>, DomainError> {
    match phone_type.map(str::trim) {
        None | Some("") => Ok(None),
        Some(t) if t.chars().count() > TYPE_MAX_LENGTH => Err(DomainError::TooLong {
            field: "Phone type",
            max: TYPE_MAX_LENGTH,
        }),
        Some(t) => Ok(Some(t.to_string())),
    }
}
