use serde::{Deserialize, Serialize};

use ledgerbot_core::UserId;

use crate::Role;

/// A platform user as it appears in replies: identifier plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    pub display_name: String,
}

impl UserRef {
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Resolve the name to show: the display name when set, else the username.
    pub fn from_names(id: UserId, display_name: Option<&str>, username: &str) -> Self {
        let name = display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(username);
        Self::new(id, name)
    }
}

/// The invoking caller for authorization decisions.
///
/// `roles` is `None` when the platform did not supply a member (e.g. a command
/// sent outside a server); the permission check treats that as "no roles".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user: UserRef,
    pub roles: Option<Vec<Role>>,
}

impl Principal {
    pub fn new(user: UserRef, roles: Option<Vec<Role>>) -> Self {
        Self { user, roles }
    }

    pub fn roles(&self) -> Option<&[Role]> {
        self.roles.as_deref()
    }
}
