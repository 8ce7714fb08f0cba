// src/service/authorization.rs

use crate::domain::Role;
use crate::error::{AppError, AppResult};
use tracing::warn;
use uuid::Uuid;

/// ロール付与の可否判定。規則は「自分のロール以上は付与できない」の1つだけ
pub struct AuthorizationPolicy;

impl AuthorizationPolicy {
    pub fn can_assign_role(actor: Role, target: Role) -> bool {
        actor.can_assign(target)
    }

    /// 付与できなければ双方のロールを含む業務ルール違反を返す
    pub fn ensure_can_assign(actor_id: Uuid, actor: Role, target: Role) -> AppResult<()> {
        if Self::can_assign_role(actor, target) {
            return Ok(());
        }

        warn!(
            requester_id = %actor_id,
            requester_role = %actor,
            target_role = %target,
            "Role assignment above own level rejected"
        );
        Err(AppError::BusinessRule(format!(
            "You do not have permission to assign the role {}. Your current role is {}.",
            target, actor
        )))
    }
}
