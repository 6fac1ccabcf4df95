//! Event attendance.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{AttendanceId, EventId, MemberId};

/// Whether a member was at an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Present => f.write_str("present"),
            Self::Absent => f.write_str("absent"),
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            _ => Err(format!("invalid attendance status: {s}")),
        }
    }
}

/// One member's attendance at one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: AttendanceId,
    pub event_id: EventId,
    #[serde(default)]
    pub event_name: Option<String>,
    pub member_id: MemberId,
    #[serde(default)]
    pub member_name: Option<String>,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Payload for marking attendance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceDraft {
    pub event_id: EventId,
    pub member_id: MemberId,
    pub status: AttendanceStatus,
}

/// Payload for correcting an attendance record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendancePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<MemberId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
}

impl AttendancePatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.event_id.is_none() && self.member_id.is_none() && self.status.is_none()
    }
}
