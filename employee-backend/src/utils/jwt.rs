// src/utils/jwt.rs

use crate::domain::Employee;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

/// 発行済みセッション
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// セッショントークンの発行を担う協調者
pub trait SessionIssuer: Send + Sync {
    fn issue(&self, employee: &Employee) -> AppResult<IssuedSession>;
}

/// セッショントークンのClaims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (employee ID)
    pub sub: String,
    pub email: String,
    /// 氏名（first + last）
    pub name: String,
    /// ロール名
    pub role: String,
    /// ロールの数値レベル
    pub role_level: i32,
    /// Issued at
    pub iat: i64,
    /// Not before
    pub nbf: i64,
    /// Expiration time
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// JWT ID
    pub jti: String,
}

/// JWT設定
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT秘密鍵
    pub secret_key: String,
    /// セッションの有効期限（分）
    pub expiration_minutes: i64,
    /// 発行者
    pub issuer: String,
    /// 対象者
    pub audience: String,
}

impl JwtConfig {
    pub const DEFAULT_ISSUER: &'static str = "employee-backend";
    pub const DEFAULT_AUDIENCE: &'static str = "employee-backend-clients";
    pub const DEFAULT_EXPIRATION_MINUTES: i64 = 480;
    /// 有効期限の上限（30日）
    pub const MAX_EXPIRATION_MINUTES: i64 = 60 * 24 * 30;

    /// 環境変数から設定を読み込み
    pub fn from_env() -> AppResult<Self> {
        let secret_key = env::var("JWT_SECRET")
            .or_else(|_| env::var("JWT_SECRET_KEY"))
            .map_err(|_| {
                AppError::InternalServerError("Missing JWT secret key".to_string())
            })?;

        let expiration_minutes = match env::var("JWT_EXPIRATION_MINUTES") {
            Ok(value) => value.parse().map_err(|_| {
                AppError::InternalServerError("Invalid session expiration".to_string())
            })?,
            Err(_) => Self::DEFAULT_EXPIRATION_MINUTES,
        };

        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| Self::DEFAULT_ISSUER.to_string());
        let audience =
            env::var("JWT_AUDIENCE").unwrap_or_else(|_| Self::DEFAULT_AUDIENCE.to_string());

        Ok(Self {
            secret_key,
            expiration_minutes,
            issuer,
            audience,
        })
    }

    /// 秘密鍵と有効期限の検証
    pub fn validate(&self) -> AppResult<()> {
        if self.secret_key.len() < 32 {
            return Err(AppError::InternalServerError(
                "JWT secret key must be at least 32 characters".to_string(),
            ));
        }

        if self.expiration_minutes <= 0 {
            return Err(AppError::InternalServerError(
                "Session expiration must be positive".to_string(),
            ));
        }

        if self.expiration_minutes > Self::MAX_EXPIRATION_MINUTES {
            return Err(AppError::InternalServerError(format!(
                "Session expiration must not exceed {} minutes",
                Self::MAX_EXPIRATION_MINUTES
            )));
        }

        Ok(())
    }
}

/// JWTトークン管理
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    validation: Validation,
}

impl JwtManager {
    /// 新しいJwtManagerを作成
    pub fn new(config: JwtConfig) -> AppResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Ok(Self {
            config,
            encoding_key,
            validation,
        })
    }

    /// 環境変数から設定を読み込んでJwtManagerを作成
    pub fn from_env() -> AppResult<Self> {
        Self::new(JwtConfig::from_env()?)
    }

    /// 外部のトランスポート層がトークン検証に使う設定
    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// 指定時刻を起点にClaimsを組み立てる
    pub fn claims_for(&self, employee: &Employee, now: DateTime<Utc>) -> AppResult<SessionClaims> {
        let exp = Duration::try_minutes(self.config.expiration_minutes)
            .and_then(|duration| now.checked_add_signed(duration))
            .ok_or_else(|| {
                AppError::InternalServerError("Session expiry is out of range".to_string())
            })?;

        Ok(SessionClaims {
            sub: employee.id().to_string(),
            email: employee.email().to_string(),
            name: employee.full_name(),
            role: employee.role().as_str().to_string(),
            role_level: employee.role().level(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        })
    }
}

impl SessionIssuer for JwtManager {
    fn issue(&self, employee: &Employee) -> AppResult<IssuedSession> {
        let claims = self.claims_for(employee, Utc::now())?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or_else(|| {
            AppError::InternalServerError("Session expiry is out of range".to_string())
        })?;

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to encode JWT: {}", e)))?;

        Ok(IssuedSession { token, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewEmployee, Role};
    use chrono::NaiveDate;
    use jsonwebtoken::{decode, DecodingKey};

    const SECRET: &str = "test-secret-key-that-is-at-least-32-chars";

    fn config() -> JwtConfig {
        JwtConfig {
            secret_key: SECRET.to_string(),
            expiration_minutes: 480,
            issuer: JwtConfig::DEFAULT_ISSUER.to_string(),
            audience: JwtConfig::DEFAULT_AUDIENCE.to_string(),
        }
    }

    fn leader() -> Employee {
        Employee::new(NewEmployee {
            first_name: "Ana".to_string(),
            last_name: "Costa".to_string(),
            email: "ana.costa@empresa.com".to_string(),
            document_number: "11122233344".to_string(),
            password_hash: "digest".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1985, 3, 10).unwrap(),
            role: Role::Leader,
            manager_id: None,
        })
        .unwrap()
    }

    #[test]
    fn test_issue_and_decode_session() {
        let manager = JwtManager::new(config()).unwrap();
        let employee = leader();

        let session = manager.issue(&employee).unwrap();
        let decoded = decode::<SessionClaims>(
            &session.token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            manager.validation(),
        )
        .unwrap();

        let claims = decoded.claims;
        assert_eq!(claims.sub, employee.id().to_string());
        assert_eq!(claims.email, "ana.costa@empresa.com");
        assert_eq!(claims.name, "Ana Costa");
        assert_eq!(claims.role, "Leader");
        assert_eq!(claims.role_level, 2);
        assert_eq!(claims.iss, "employee-backend");
        assert_eq!(claims.aud, "employee-backend-clients");
        assert_eq!(claims.exp, session.expires_at.timestamp());
    }

    #[test]
    fn test_expiry_is_now_plus_configured_duration() {
        let manager = JwtManager::new(config()).unwrap();
        let now = Utc::now();

        let claims = manager.claims_for(&leader(), now).unwrap();
        assert_eq!(claims.exp - claims.iat, 480 * 60);
        assert_eq!(claims.nbf, claims.iat);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let manager = JwtManager::new(config()).unwrap();
        let session = manager.issue(&leader()).unwrap();

        let result = decode::<SessionClaims>(
            &session.token,
            &DecodingKey::from_secret(b"another-secret-key-that-is-32-chars-long"),
            manager.validation(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_each_session_has_unique_id() {
        let manager = JwtManager::new(config()).unwrap();
        let employee = leader();
        let now = Utc::now();

        let first = manager.claims_for(&employee, now).unwrap();
        let second = manager.claims_for(&employee, now).unwrap();
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_config_validation() {
        let mut short = config();
        short.secret_key = "short".to_string();
        assert!(JwtManager::new(short).is_err());

        let mut zero = config();
        zero.expiration_minutes = 0;
        assert!(JwtManager::new(zero).is_err());
    }

    #[test]
    fn test_oversized_expiration_is_rejected() {
        let mut huge = config();
        huge.expiration_minutes = i64::MAX / 60;
        assert!(huge.validate().is_err());
        assert!(JwtManager::new(huge).is_err());

        let mut limit = config();
        limit.expiration_minutes = JwtConfig::MAX_EXPIRATION_MINUTES;
        let manager = JwtManager::new(limit).unwrap();
        assert!(manager.issue(&leader()).is_ok());
    }

    #[test]
    fn test_out_of_range_expiry_returns_error() {
        // validate() を通さずに組み立てた設定でも panic しない
        let manager = JwtManager::new(config()).unwrap();
        let unchecked = JwtManager {
            config: JwtConfig {
                expiration_minutes: i64::MAX / 60,
                ..config()
            },
            ..manager
        };

        let result = unchecked.claims_for(&leader(), Utc::now());
        assert!(matches!(result, Err(AppError::InternalServerError(_))));
        assert!(unchecked.issue(&leader()).is_err());
    }
}
