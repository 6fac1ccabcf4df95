//! Sacramental records (baptism, confirmation, marriage, ...).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{MemberId, SacramentId};

/// A sacrament received by a member.
///
/// `kind` is free text; parishes record rites beyond a fixed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sacrament {
    pub id: SacramentId,
    pub member_id: MemberId,
    #[serde(default)]
    pub member_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub certificate_path: Option<String>,
}

/// Payload for recording a sacrament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SacramentDraft {
    pub member_id: MemberId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_path: Option<String>,
}

/// Payload for updating a sacrament record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SacramentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<MemberId>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_path: Option<String>,
}

impl SacramentPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.member_id.is_none()
            && self.kind.is_none()
            && self.date.is_none()
            && self.certificate_path.is_none()
    }
}
