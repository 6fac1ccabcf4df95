//! Parish announcements.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::AnnouncementId;

fn general() -> String {
    "general".to_owned()
}

/// A published announcement. The backend lists newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub message: String,
    #[serde(default = "general")]
    pub category: String,
    #[serde(default, deserialize_with = "date_or_datetime")]
    pub publish_date: Option<NaiveDateTime>,
    /// Drafts send a plain date; it reads back as midnight.
    #[serde(default, deserialize_with = "date_or_datetime")]
    pub expiry_date: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DateOrDateTime {
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

fn date_or_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<DateOrDateTime>::deserialize(deserializer)?.map(|value| match value {
            DateOrDateTime::DateTime(at) => at,
            DateOrDateTime::Date(day) => day.and_time(NaiveTime::MIN),
        }),
    )
}

impl Announcement {
    /// Whether the announcement has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < now)
    }
}

/// Payload for publishing an announcement. Admin only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnouncementDraft {
    pub title: String,
    pub message: String,
    /// Backend default is `general`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

/// Payload for editing an announcement. Admin only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnouncementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

impl AnnouncementPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.message.is_none()
            && self.category.is_none()
            && self.expiry_date.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_and_expiry() {
        let announcement: Announcement = serde_json::from_str(
            r#"{"id": 1, "title": "Bake sale", "message": "After 10am Mass",
                "publish_date": "2025-03-01T08:00:00", "expiry_date": "2025-03-10T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(announcement.category, "general");

        let before = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 3, 11)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(!announcement.is_expired(before));
        assert!(announcement.is_expired(after));
    }

    #[test]
    fn test_without_expiry_never_expires() {
        let announcement: Announcement = serde_json::from_str(
            r#"{"id": 1, "title": "Welcome", "message": "Hello", "category": "news", "expiry_date": null}"#,
        )
        .unwrap();
        assert!(!announcement.is_expired(NaiveDateTime::MAX));
    }

    #[test]
    fn test_date_only_expiry_reads_as_midnight() {
        let announcement: Announcement = serde_json::from_str(
            r#"{"id": 2, "title": "Retreat", "message": "Sign up", "expiry_date": "2025-04-01"}"#,
        )
        .unwrap();
        let midnight = NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(announcement.expiry_date, Some(midnight));
        assert_eq!(announcement.publish_date, None);
    }

    #[test]
    fn test_stored_draft_decodes() {
        let draft = AnnouncementDraft {
            title: "Retreat".into(),
            message: "Sign up".into(),
            category: None,
            expiry_date: NaiveDate::from_ymd_opt(2025, 4, 1),
        };
        let mut stored = serde_json::to_value(&draft).unwrap();
        stored["id"] = serde_json::json!(7);
        stored["publish_date"] = serde_json::json!("2025-03-20");

        let announcement: Announcement = serde_json::from_value(stored).unwrap();
        assert_eq!(
            announcement.expiry_date.map(|at| at.date()),
            draft.expiry_date
        );
        assert_eq!(announcement.category, "general");
    }
}
