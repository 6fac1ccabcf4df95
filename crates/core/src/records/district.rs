//! Parish districts (neighbourhood groupings of members).

use serde::{Deserialize, Serialize};

use crate::types::DistrictId;

/// A district and its leader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    pub id: DistrictId,
    pub name: String,
    #[serde(default)]
    pub leader_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Only present in collection listings.
    #[serde(default)]
    pub member_count: Option<u32>,
}

/// Payload for creating a district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload for updating a district.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DistrictPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DistrictPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.leader_name.is_none() && self.description.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_listing_row() {
        let district: District = serde_json::from_str(
            r#"{"id": 2, "name": "North", "leader_name": "Grace", "description": null, "member_count": 14}"#,
        )
        .unwrap();
        assert_eq!(district.member_count, Some(14));
    }

    #[test]
    fn test_decode_detail_without_count() {
        let district: District =
            serde_json::from_str(r#"{"id": 2, "name": "North", "members": []}"#).unwrap();
        assert_eq!(district.member_count, None);
        assert_eq!(district.leader_name, None);
    }
}
