//! Back-office users and their roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    pub enum Role {
        Admin => "admin",
        Manager => "manager",
        Staff => "staff",
    }
}

impl Role {
    /// Managers and admins may change salaries, approve leave and manage
    /// users.
    pub fn can_manage(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.can_manage());
        assert!(Role::Manager.can_manage());
        assert!(!Role::Staff.can_manage());
        assert_eq!("MANAGER".parse::<Role>().unwrap(), Role::Manager);
    }
}
