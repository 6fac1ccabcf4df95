//! Account roles.

use serde::{Deserialize, Serialize};

/// Error returned when a role string is not one of the known roles.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected admin, member or staff)")]
pub struct RoleParseError(pub String);

/// Role of an authenticated account.
///
/// The backend issues this in the login payload and in `auth/me`. Admins see
/// and manage every record; members and staff see their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including member and district management.
    Admin,
    /// A parishioner account, normally linked to a member record.
    Member,
    /// Parish staff account.
    Staff,
}

impl Role {
    /// All roles, in the order they are listed to users.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Member, Self::Staff];

    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Staff => "staff",
        }
    }

    /// Whether the role has full access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether accounts with this role are expected to be linked to a
    /// parish member record.
    #[must_use]
    pub const fn requires_member_link(self) -> bool {
        !self.is_admin()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "staff" => Ok(Self::Staff),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("pastor".parse::<Role>().is_err());
    }

    #[test]
    fn test_only_non_admins_need_linking() {
        assert!(!Role::Admin.requires_member_link());
        assert!(Role::Member.requires_member_link());
        assert!(Role::Staff.requires_member_link());
    }

    #[test]
    fn test_unknown_role_fails_to_deserialize() {
        assert!(serde_json::from_str::<Role>("\"bishop\"").is_err());
    }
}
