//! Tithes, offerings and pledges.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{Amount, DonationId, MemberId, UserId};

/// Kind of donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DonationKind {
    #[default]
    Tithe,
    Offering,
    Pledge,
}

impl std::fmt::Display for DonationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tithe => f.write_str("tithe"),
            Self::Offering => f.write_str("offering"),
            Self::Pledge => f.write_str("pledge"),
        }
    }
}

impl std::str::FromStr for DonationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tithe" => Ok(Self::Tithe),
            "offering" => Ok(Self::Offering),
            "pledge" => Ok(Self::Pledge),
            _ => Err(format!("invalid donation type: {s}")),
        }
    }
}

/// A recorded donation.
///
/// Admin listings identify the donor by `member_id`/`member_name`; a
/// member's own listing may carry `user_id` instead, so all three are
/// optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    #[serde(default)]
    pub member_id: Option<MemberId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub member_name: Option<String>,
    pub amount: Amount,
    #[serde(rename = "type", default)]
    pub kind: DonationKind,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Payload for recording a donation.
///
/// `member_id` is only sent by admins recording on someone's behalf; a
/// member giving for themselves leaves it out and the backend attributes the
/// donation to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonationDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<MemberId>,
    pub amount: Amount,
    #[serde(rename = "type")]
    pub kind: DonationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Payload for correcting a donation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DonationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<MemberId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<DonationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl DonationPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.member_id.is_none() && self.amount.is_none() && self.kind.is_none() && self.date.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_admin_listing_row() {
        let donation: Donation = serde_json::from_str(
            r#"{"id": 7, "member_id": 2, "member_name": "Maria Santos", "amount": 50.0,
                "type": "offering", "date": "2025-02-09", "created_at": "2025-02-09T11:00:00"}"#,
        )
        .unwrap();
        assert_eq!(donation.member_id, Some(MemberId::new(2)));
        assert_eq!(donation.kind, DonationKind::Offering);
        assert_eq!(donation.amount.to_string(), "50.00");
    }

    #[test]
    fn test_decode_own_listing_row() {
        let donation: Donation = serde_json::from_str(
            r#"{"id": 8, "user_id": 5, "amount": 20, "type": "tithe", "date": null}"#,
        )
        .unwrap();
        assert_eq!(donation.member_id, None);
        assert_eq!(donation.user_id, Some(UserId::new(5)));
        assert_eq!(donation.date, None);
    }

    #[test]
    fn test_member_draft_omits_member_id() {
        let draft = DonationDraft {
            member_id: None,
            amount: "15".parse().unwrap(),
            kind: DonationKind::Pledge,
            date: None,
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json, serde_json::json!({"amount": 15.0, "type": "pledge"}));
    }
}
