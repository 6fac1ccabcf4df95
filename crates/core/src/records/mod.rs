//! Typed records for every parish resource.
//!
//! Each resource has three shapes:
//! - the record the backend returns (e.g. [`Member`]),
//! - a draft posted to create one (e.g. [`MemberDraft`]),
//! - a patch put to update one (e.g. [`MemberPatch`]); absent fields are left
//!   unchanged by the backend.
//!
//! Foreign keys are typed IDs. Referential validity is the backend's job; the
//! client never checks that a `member_id` exists.

pub mod announcement;
pub mod attendance;
pub mod district;
pub mod donation;
pub mod event;
pub mod member;
pub mod sacrament;

pub use announcement::{Announcement, AnnouncementDraft, AnnouncementPatch};
pub use attendance::{Attendance, AttendanceDraft, AttendancePatch, AttendanceStatus};
pub use district::{District, DistrictDraft, DistrictPatch};
pub use donation::{Donation, DonationDraft, DonationKind, DonationPatch};
pub use event::{Event, EventDraft, EventPatch};
pub use member::{Member, MemberDraft, MemberPatch, MemberStatus};
pub use sacrament::{Sacrament, SacramentDraft, SacramentPatch};
