use uuid::Uuid;

use crate::domain::Role;
use crate::error::{Error, Result};

/// The authenticated caller, as carried by a verified access token.
///
/// Privileged operations check the role explicitly; ownership checks
/// compare against the owner recorded on the cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self, action: &str) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Authorization(format!("only admins may {action}")))
        }
    }

    pub fn require_owner(&self, owner_id: Uuid, resource: &str) -> Result<()> {
        if self.user_id == owner_id {
            Ok(())
        } else {
            Err(Error::Authorization(format!("{resource} belongs to another user")))
        }
    }

    pub fn require_owner_or_admin(&self, owner_id: Uuid, resource: &str) -> Result<()> {
        if self.is_admin() {
            return Ok(());
        }
        self.require_owner(owner_id, resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_capability() {
        let admin = Identity::new(Uuid::new_v4(), Role::Admin);
        let user = Identity::new(Uuid::new_v4(), Role::User);

        assert!(admin.require_admin("create products").is_ok());
        assert!(matches!(
            user.require_admin("create products"),
            Err(Error::Authorization(_))
        ));
    }

    #[test]
    fn test_ownership() {
        let owner = Identity::new(Uuid::new_v4(), Role::User);
        let stranger = Identity::new(Uuid::new_v4(), Role::User);
        let admin = Identity::new(Uuid::new_v4(), Role::Admin);

        assert!(owner.require_owner(owner.user_id, "cart").is_ok());
        assert!(stranger.require_owner(owner.user_id, "cart").is_err());
        assert!(admin.require_owner(owner.user_id, "cart").is_err());
        assert!(admin.require_owner_or_admin(owner.user_id, "order").is_ok());
        assert!(stranger.require_owner_or_admin(owner.user_id, "order").is_err());
    }
}
