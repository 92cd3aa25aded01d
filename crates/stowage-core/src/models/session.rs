//! Session context passed explicitly into every lifecycle operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StowageError, StowageResult};
use crate::models::user::{User, UserRole};

/// The authenticated actor on whose behalf an operation runs.
///
/// Authentication itself happens outside this crate; callers build the
/// context from whatever login mechanism they use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl SessionContext {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn for_user(user: &User) -> Self {
        Self::new(user.id, user.role)
    }

    pub fn is_administrator(&self) -> bool {
        self.role == UserRole::Administrator
    }

    /// Allow the call if the actor is `user_id` or an administrator.
    pub fn require_self_or_admin(&self, user_id: Uuid, action: &str) -> StowageResult<()> {
        if self.user_id == user_id || self.is_administrator() {
            Ok(())
        } else {
            Err(StowageError::denied(format!(
                "user {} may not {action}",
                self.user_id
            )))
        }
    }

    pub fn require_role(&self, role: UserRole, action: &str) -> StowageResult<()> {
        if self.role == role || self.is_administrator() {
            Ok(())
        } else {
            Err(StowageError::denied(format!(
                "{action} requires role {role:?}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_acting_on_self_is_allowed() {
        let id = Uuid::new_v4();
        let ctx = SessionContext::new(id, UserRole::Owner);
        assert!(ctx.require_self_or_admin(id, "edit").is_ok());
    }

    #[test]
    fn other_user_is_denied() {
        let ctx = SessionContext::new(Uuid::new_v4(), UserRole::Agent);
        let err = ctx.require_self_or_admin(Uuid::new_v4(), "edit").unwrap_err();
        assert!(matches!(err, StowageError::AuthorizationDenied { .. }));
    }

    #[test]
    fn administrator_passes_every_check() {
        let ctx = SessionContext::new(Uuid::new_v4(), UserRole::Administrator);
        assert!(ctx.require_self_or_admin(Uuid::new_v4(), "edit").is_ok());
        assert!(ctx.require_role(UserRole::Agent, "accept").is_ok());
    }

    #[test]
    fn role_mismatch_is_denied() {
        let ctx = SessionContext::new(Uuid::new_v4(), UserRole::Owner);
        assert!(ctx.require_role(UserRole::Agent, "accept").is_err());
    }
}
