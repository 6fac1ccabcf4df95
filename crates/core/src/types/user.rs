//! The authenticated account.

use serde::{Deserialize, Serialize};

use super::{Email, MemberId, Role, UserId};

/// Identity of the logged-in account, as returned by `auth/login` and
/// `auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Account ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: Email,
    /// Account role.
    pub role: Role,
    /// Linked parish member, if the account has been linked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<MemberId>,
}

impl UserRecord {
    /// Whether the account still has to be linked to a member record.
    ///
    /// Admin accounts never need linking.
    #[must_use]
    pub const fn needs_member_link(&self) -> bool {
        self.role.requires_member_link() && self.member_id.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_payload_without_member_id() {
        let user: UserRecord = serde_json::from_str(
            r#"{"id": 4, "name": "Ann", "email": "ann@parish.org", "role": "member"}"#,
        )
        .unwrap();
        assert_eq!(user.member_id, None);
        assert!(user.needs_member_link());
    }

    #[test]
    fn test_null_member_id() {
        let user: UserRecord = serde_json::from_str(
            r#"{"id": 4, "name": "Ann", "email": "ann@parish.org", "role": "staff", "member_id": null}"#,
        )
        .unwrap();
        assert!(user.needs_member_link());
    }

    #[test]
    fn test_admin_never_needs_link() {
        let user: UserRecord = serde_json::from_str(
            r#"{"id": 1, "name": "Fr. Tom", "email": "tom@parish.org", "role": "admin"}"#,
        )
        .unwrap();
        assert!(!user.needs_member_link());
    }

    #[test]
    fn test_linked_member() {
        let user: UserRecord = serde_json::from_str(
            r#"{"id": 4, "name": "Ann", "email": "ann@parish.org", "role": "member", "member_id": 12}"#,
        )
        .unwrap();
        assert_eq!(user.member_id, Some(MemberId::new(12)));
        assert!(!user.needs_member_link());
    }
}
