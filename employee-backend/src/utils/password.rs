// src/utils/password.rs

use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};
use std::env;

/// パスワードのハッシュ化・照合を担う協調者
pub trait PasswordHasher: Send + Sync {
    /// 平文からダイジェストを生成（同じ入力でも毎回異なるソルト）
    fn hash(&self, password: &str) -> AppResult<String>;

    /// 照合。不一致や壊れたダイジェストは false を返しエラーにしない
    fn verify(&self, password: &str, digest: &str) -> bool;
}

/// Argon2 設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argon2Config {
    /// メモリコスト（KB）
    pub memory_cost: u32,
    /// 時間コスト（反復回数）
    pub time_cost: u32,
    /// 並列度
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64MB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Config {
    /// 環境変数から設定を読み込み
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let memory_cost = env::var("ARGON2_MEMORY_COST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.memory_cost);

        let time_cost = env::var("ARGON2_TIME_COST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.time_cost);

        let parallelism = env::var("ARGON2_PARALLELISM")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.parallelism);

        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// テスト用の軽量設定
    pub fn for_testing() -> Self {
        Self {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn params(&self) -> AppResult<argon2::Params> {
        argon2::Params::new(self.memory_cost, self.time_cost, self.parallelism, None).map_err(
            |e| AppError::InternalServerError(format!("Invalid Argon2 parameters: {}", e)),
        )
    }
}

/// パスワードハッシュマネージャー
#[derive(Clone)]
pub struct PasswordManager {
    argon2: Argon2<'static>,
}

impl PasswordManager {
    /// 新しいPasswordManagerを作成
    pub fn new(config: Argon2Config) -> AppResult<Self> {
        let argon2 = Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            config.params()?,
        );
        Ok(Self { argon2 })
    }

    /// 環境変数から設定を読み込んでPasswordManagerを作成
    pub fn from_env() -> AppResult<Self> {
        Self::new(Argon2Config::from_env())
    }
}

impl PasswordHasher for PasswordManager {
    fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalServerError(format!("Password hashing failed: {}", e)))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password digest is malformed");
                return false;
            }
        };

        // パラメータはダイジェスト側に埋め込まれているものが使われる
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> PasswordManager {
        PasswordManager::new(Argon2Config::for_testing()).unwrap()
    }

    #[test]
    fn test_password_hashing_and_verification() {
        let manager = manager();
        let password = "Secret@123";

        let hash = manager.hash(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains(password));

        assert!(manager.verify(password, &hash));
        assert!(!manager.verify("Secret@124", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let manager = manager();
        let first = manager.hash("Secret@123").unwrap();
        let second = manager.hash("Secret@123").unwrap();

        assert_ne!(first, second);
        assert!(manager.verify("Secret@123", &first));
        assert!(manager.verify("Secret@123", &second));
    }

    #[test]
    fn test_malformed_digest_is_a_mismatch() {
        let manager = manager();
        assert!(!manager.verify("Secret@123", "not-a-digest"));
        assert!(!manager.verify("Secret@123", ""));
    }

    #[test]
    fn test_digest_from_other_cost_factors_still_verifies() {
        let hash = manager().hash("Secret@123").unwrap();
        let stronger = PasswordManager::new(Argon2Config {
            memory_cost: 2048,
            time_cost: 2,
            parallelism: 1,
        })
        .unwrap();

        assert!(stronger.verify("Secret@123", &hash));
    }

    #[test]
    fn test_invalid_cost_factors_are_rejected() {
        let result = PasswordManager::new(Argon2Config {
            memory_cost: 1,
            time_cost: 0,
            parallelism: 0,
        });
        assert!(matches!(result, Err(AppError::InternalServerError(_))));
    }

    #[test]
    fn test_default_config() {
        let config = Argon2Config::default();
        assert_eq!(config.memory_cost, 65536);
        assert_eq!(config.time_cost, 3);
        assert_eq!(config.parallelism, 4);
    }
}
