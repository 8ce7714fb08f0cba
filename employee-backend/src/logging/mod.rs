// src/logging/mod.rs

use crate::error::AppError;
use std::time::Instant;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

pub const DEFAULT_FILTER: &str = "employee_backend=info,sea_orm=warn";

#[macro_export]
macro_rules! log_with_context {
    ($level:expr, $msg:expr $(, $($key:ident => $value:expr),* $(,)?)?) => {
        match $level {
            tracing::Level::ERROR => {
                tracing::error!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            tracing::Level::WARN => {
                tracing::warn!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            tracing::Level::INFO => {
                tracing::info!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            tracing::Level::DEBUG => {
                tracing::debug!(
                    message = $msg
                    $(, $($key = ?$value,)*)?
                );
            }
            _ => {}
        }
    };
}

/// RUST_LOG があればそれを、なければ既定のフィルタでサブスクライバを登録
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // 二重初期化はエラーになるだけなので無視する
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}

/// ユースケース1回分のコンテキスト
#[derive(Clone, Debug)]
pub struct OperationContext {
    pub operation_id: Uuid,
    pub operation: &'static str,
    pub requester_id: Option<Uuid>,
    started_at: Instant,
}

impl OperationContext {
    pub fn start(operation: &'static str, requester_id: Option<Uuid>) -> Self {
        let context = Self {
            operation_id: Uuid::new_v4(),
            operation,
            requester_id,
            started_at: Instant::now(),
        };

        log_with_context!(
            tracing::Level::DEBUG,
            "Operation started",
            operation_id => context.operation_id,
            operation => context.operation,
            requester_id => context.requester_id,
        );

        context
    }

    /// 結果の分類に応じたレベルで完了ログを出す
    pub fn finish<T>(&self, result: &Result<T, AppError>) {
        let duration = self.started_at.elapsed();

        match result {
            Ok(_) => log_with_context!(
                tracing::Level::INFO,
                "Operation completed",
                operation_id => self.operation_id,
                operation => self.operation,
                requester_id => self.requester_id,
                duration_ms => duration.as_millis(),
            ),
            Err(err) => {
                let status = err.status_code();
                log_with_context!(
                    if status >= 500 { tracing::Level::ERROR } else { tracing::Level::WARN },
                    "Operation failed",
                    operation_id => self.operation_id,
                    operation => self.operation,
                    requester_id => self.requester_id,
                    status => status,
                    error => err.to_string(),
                    duration_ms => duration.as_millis(),
                );
            }
        }
    }
}
