use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use savannah_catalog::UnknownStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Operations,
    Finance,
    #[default]
    Support,
    Guide,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operations => "operations",
            Role::Finance => "finance",
            Role::Support => "support",
            Role::Guide => "guide",
        }
    }

    /// Back-office staff. Guides log in but do not manage bookings or catalog.
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Guide)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "operations" => Ok(Role::Operations),
            "finance" => Ok(Role::Finance),
            "support" => Ok(Role::Support),
            "guide" => Ok(Role::Guide),
            other => Err(UnknownStatus {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Back-office account. `token_version` invalidates every outstanding refresh token when bumped.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub permissions: Vec<String>,
    pub password_hash: String,
    pub token_version: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            permissions: self.permissions.clone(),
            created_at: self.created_at,
        }
    }
}

/// What callers get to see of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        assert_eq!("finance".parse::<Role>().unwrap(), Role::Finance);
        assert!(Role::Support.is_staff());
        assert!(!Role::Guide.is_staff());
        assert_eq!(Role::default(), Role::Support);
        assert!("root".parse::<Role>().is_err());
    }
}
