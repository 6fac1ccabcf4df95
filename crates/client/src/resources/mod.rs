//! Generic CRUD over the parish record collections.
//!
//! Each record type declares where it lives on the backend through
//! [`Resource`]; [`ResourceClient`] performs the requests and
//! [`ResourcePage`] holds the list a screen is showing.

mod client;
mod page;

pub use client::ResourceClient;
pub use page::{Confirm, Deletion, MountHandle, Refresh, ResourcePage};

use std::fmt::Display;

use parish_core::{
    Announcement, AnnouncementDraft, AnnouncementId, AnnouncementPatch, Attendance,
    AttendanceDraft, AttendanceId, AttendancePatch, District, DistrictDraft, DistrictId,
    DistrictPatch, Donation, DonationDraft, DonationId, DonationPatch, Event, EventDraft, EventId,
    EventPatch, Member, MemberDraft, MemberId, MemberPatch, Role, Sacrament, SacramentDraft,
    SacramentId, SacramentPatch,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::navigator::Screen;

/// A record collection served under `{PATH}/` with items at `{PATH}/{id}`.
///
/// Visibility is decided by the backend: the same path returns every record
/// to an admin and only the caller's own records to members and staff.
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    /// Singular display name.
    const NAME: &'static str;
    /// Collection path segment, relative to the base URL.
    const PATH: &'static str;
    /// Screen that lists this resource.
    const SCREEN: Screen;
    /// Roles allowed to create, edit, or delete. Empty means any signed-in user.
    const WRITE_ROLES: &'static [Role] = &[];

    type Id: Copy + Display + DeserializeOwned + Send + Sync + 'static;
    type Draft: Serialize + Send + Sync;
    type Patch: Serialize + Send + Sync;

    fn id(&self) -> Self::Id;
}

impl Resource for Member {
    const NAME: &'static str = "member";
    const PATH: &'static str = "members";
    const SCREEN: Screen = Screen::Members;
    const WRITE_ROLES: &'static [Role] = &[Role::Admin];

    type Id = MemberId;
    type Draft = MemberDraft;
    type Patch = MemberPatch;

    fn id(&self) -> MemberId {
        self.id
    }
}

impl Resource for Event {
    const NAME: &'static str = "event";
    const PATH: &'static str = "events";
    const SCREEN: Screen = Screen::Events;

    type Id = EventId;
    type Draft = EventDraft;
    type Patch = EventPatch;

    fn id(&self) -> EventId {
        self.id
    }
}

impl Resource for Donation {
    const NAME: &'static str = "donation";
    const PATH: &'static str = "donations";
    const SCREEN: Screen = Screen::Donations;

    type Id = DonationId;
    type Draft = DonationDraft;
    type Patch = DonationPatch;

    fn id(&self) -> DonationId {
        self.id
    }
}

impl Resource for Sacrament {
    const NAME: &'static str = "sacrament";
    const PATH: &'static str = "sacraments";
    const SCREEN: Screen = Screen::Sacraments;

    type Id = SacramentId;
    type Draft = SacramentDraft;
    type Patch = SacramentPatch;

    fn id(&self) -> SacramentId {
        self.id
    }
}

impl Resource for District {
    const NAME: &'static str = "district";
    const PATH: &'static str = "districts";
    const SCREEN: Screen = Screen::Districts;
    const WRITE_ROLES: &'static [Role] = &[Role::Admin];

    type Id = DistrictId;
    type Draft = DistrictDraft;
    type Patch = DistrictPatch;

    fn id(&self) -> DistrictId {
        self.id
    }
}

impl Resource for Announcement {
    const NAME: &'static str = "announcement";
    const PATH: &'static str = "announcements";
    const SCREEN: Screen = Screen::Announcements;
    const WRITE_ROLES: &'static [Role] = &[Role::Admin];

    type Id = AnnouncementId;
    type Draft = AnnouncementDraft;
    type Patch = AnnouncementPatch;

    fn id(&self) -> AnnouncementId {
        self.id
    }
}

impl Resource for Attendance {
    const NAME: &'static str = "attendance record";
    const PATH: &'static str = "attendance";
    const SCREEN: Screen = Screen::Attendance;

    type Id = AttendanceId;
    type Draft = AttendanceDraft;
    type Patch = AttendancePatch;

    fn id(&self) -> AttendanceId {
        self.id
    }
}

/// Path of the collection, e.g. `members/`.
pub(crate) fn collection_path<R: Resource>() -> String {
    format!("{}/", R::PATH)
}

/// Path of one record, e.g. `members/7`.
pub(crate) fn item_path<R: Resource>(id: R::Id) -> String {
    format!("{}/{id}", R::PATH)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(collection_path::<Member>(), "members/");
        assert_eq!(item_path::<Donation>(DonationId::new(12)), "donations/12");
        assert_eq!(item_path::<Attendance>(AttendanceId::new(3)), "attendance/3");
    }

    #[test]
    fn test_paths_join_under_base() {
        let base = url::Url::parse("https://parish.example.org/api/").unwrap();
        assert_eq!(
            base.join(&collection_path::<Event>()).unwrap().as_str(),
            "https://parish.example.org/api/events/"
        );
    }

    #[test]
    fn test_screen_roles_match_write_roles() {
        assert_eq!(Member::WRITE_ROLES, Member::SCREEN.required_roles());
        assert_eq!(District::WRITE_ROLES, District::SCREEN.required_roles());
        assert!(Announcement::SCREEN.required_roles().is_empty());
        assert_eq!(Announcement::WRITE_ROLES, &[Role::Admin]);
        assert!(Donation::WRITE_ROLES.is_empty());
    }
}
