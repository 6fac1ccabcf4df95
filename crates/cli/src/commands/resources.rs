//! Record management commands.
//!
//! Every resource gets the same five subcommands (`list`, `show`, `add`,
//! `edit`, `remove`); only the fields differ.
//!
//! # Usage
//!
//! ```bash
//! parish members add --name "Maria Lopez" --contact 555-0100 --family Lopez
//! parish events edit 3 --date 2025-04-20
//! parish donations list
//! parish announcements remove 2 --yes
//! ```

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use parish_client::{Access, Deletion, ParishClient, Resource, authorize};
use parish_core::{
    Amount, Announcement, AnnouncementDraft, AnnouncementId, AnnouncementPatch, Attendance,
    AttendanceDraft, AttendanceId, AttendancePatch, AttendanceStatus, District, DistrictDraft,
    DistrictId, DistrictPatch, Donation, DonationDraft, DonationId, DonationKind, DonationPatch,
    Event, EventDraft, EventId, EventPatch, Member, MemberDraft, MemberId, MemberPatch,
    MemberStatus, Sacrament, SacramentDraft, SacramentId, SacramentPatch, UserRecord,
};

use crate::app;
use crate::error::CliError;
use crate::prompt::StdinConfirm;
use crate::render::{self, Table};

/// A parsed resource subcommand.
pub enum Crud<R: Resource> {
    List,
    Show(R::Id),
    Add(R::Draft),
    Edit(R::Id, R::Patch),
    Remove { id: R::Id, yes: bool },
}

impl<R: Resource> Crud<R> {
    const fn is_write(&self) -> bool {
        matches!(self, Self::Add(_) | Self::Edit(..) | Self::Remove { .. })
    }
}

/// How a resource is shown and prepared on the command line.
pub trait CliResource: Resource + Sized {
    const HEADERS: &'static [&'static str];

    fn row(&self) -> Vec<String>;

    fn patch_is_empty(patch: &Self::Patch) -> bool;

    /// Line printed under a listing.
    fn footer(_items: &[Self]) -> Option<String> {
        None
    }

    /// Adjust a draft for the signed-in user before it is sent.
    fn scope_draft(_draft: &mut Self::Draft, _user: &UserRecord) {}
}

/// Run one resource subcommand.
pub async fn run<R: CliResource>(client: &ParishClient, action: Crud<R>) -> Result<(), CliError> {
    let user = app::enter(client, R::SCREEN).await?;

    if action.is_write() {
        match authorize(Some(&user), R::WRITE_ROLES) {
            Access::Granted(_) => {}
            Access::Denied { role } => {
                return Err(CliError::AccessDenied {
                    what: format!("changing {}", R::PATH),
                    role,
                });
            }
            Access::Unauthenticated => return Err(CliError::NotLoggedIn),
        }
    }

    let mut page = client.page::<R>();

    match action {
        Crud::List => {
            page.load().await?;
            let mut table = Table::new(R::HEADERS);
            for item in page.items() {
                table.push(item.row());
            }
            let mut out = std::io::stdout().lock();
            table.write_to(&mut out)?;
            drop(out);

            if let Some(footer) = R::footer(page.items()) {
                render::line(footer)?;
            }
        }
        Crud::Show(id) => {
            let record = page.client().get(id).await?;
            render::write_details(&mut std::io::stdout().lock(), R::HEADERS, &record.row())?;
        }
        Crud::Add(mut draft) => {
            R::scope_draft(&mut draft, &user);
            let id = page.create(&draft).await?;
            render::line(format_args!("Created {} {id}", R::NAME))?;
        }
        Crud::Edit(id, patch) => {
            if R::patch_is_empty(&patch) {
                return Err(CliError::Invalid(
                    "Nothing to change; pass at least one field".into(),
                ));
            }
            page.update(id, &patch).await?;
            render::line(format_args!("Updated {} {id}", R::NAME))?;
        }
        Crud::Remove { id, yes } => {
            match page.delete(id, &StdinConfirm { assume_yes: yes }).await? {
                Deletion::Deleted => render::line(format_args!("Deleted {} {id}", R::NAME))?,
                Deletion::Cancelled => render::line("Cancelled")?,
            }
        }
    }
    Ok(())
}

macro_rules! resource_action {
    ($name:ident, $record:ty, $id:ty, $add:ty, $edit:ty) => {
        #[derive(Subcommand)]
        pub enum $name {
            /// List the records you can see
            List,
            /// Show one record
            Show { id: $id },
            /// Create a record
            Add($add),
            /// Change fields of a record
            Edit {
                id: $id,
                #[command(flatten)]
                changes: $edit,
            },
            /// Delete a record
            Remove {
                id: $id,
                /// Skip the confirmation prompt
                #[arg(short, long)]
                yes: bool,
            },
        }

        impl From<$name> for Crud<$record> {
            fn from(action: $name) -> Self {
                match action {
                    $name::List => Self::List,
                    $name::Show { id } => Self::Show(id),
                    $name::Add(args) => Self::Add(args.into()),
                    $name::Edit { id, changes } => Self::Edit(id, changes.into()),
                    $name::Remove { id, yes } => Self::Remove { id, yes },
                }
            }
        }
    };
}

resource_action!(MemberAction, Member, MemberId, MemberArgs, MemberChanges);
resource_action!(EventAction, Event, EventId, EventArgs, EventChanges);
resource_action!(DonationAction, Donation, DonationId, DonationArgs, DonationChanges);
resource_action!(SacramentAction, Sacrament, SacramentId, SacramentArgs, SacramentChanges);
resource_action!(DistrictAction, District, DistrictId, DistrictArgs, DistrictChanges);
resource_action!(
    AnnouncementAction,
    Announcement,
    AnnouncementId,
    AnnouncementArgs,
    AnnouncementChanges
);
resource_action!(
    AttendanceAction,
    Attendance,
    AttendanceId,
    AttendanceArgs,
    AttendanceChanges
);

// =============================================================================
// Members
// =============================================================================

#[derive(Args)]
pub struct MemberArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    family: Option<String>,
    /// `active` or `inactive`
    #[arg(long, default_value_t)]
    status: MemberStatus,
}

#[derive(Args)]
pub struct MemberChanges {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    family: Option<String>,
    #[arg(long)]
    status: Option<MemberStatus>,
}

impl From<MemberArgs> for MemberDraft {
    fn from(args: MemberArgs) -> Self {
        Self {
            name: args.name,
            contact: args.contact,
            address: args.address,
            family: args.family,
            status: args.status,
        }
    }
}

impl From<MemberChanges> for MemberPatch {
    fn from(args: MemberChanges) -> Self {
        Self {
            name: args.name,
            contact: args.contact,
            address: args.address,
            family: args.family,
            status: args.status,
        }
    }
}

impl CliResource for Member {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Contact", "Family", "Status"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            render::opt(self.contact.as_ref()),
            render::opt(self.family.as_ref()),
            self.status.to_string(),
        ]
    }

    fn patch_is_empty(patch: &MemberPatch) -> bool {
        patch.is_empty()
    }
}

// =============================================================================
// Events
// =============================================================================

#[derive(Args)]
pub struct EventArgs {
    #[arg(long)]
    name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    date: NaiveDate,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args)]
pub struct EventChanges {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    description: Option<String>,
}

impl From<EventArgs> for EventDraft {
    fn from(args: EventArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            date: args.date,
        }
    }
}

impl From<EventChanges> for EventPatch {
    fn from(args: EventChanges) -> Self {
        Self {
            name: args.name,
            description: args.description,
            date: args.date,
        }
    }
}

impl CliResource for Event {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Date", "Description"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.date.to_string(),
            render::opt(self.description.as_ref()),
        ]
    }

    fn patch_is_empty(patch: &EventPatch) -> bool {
        patch.is_empty()
    }
}

// =============================================================================
// Donations
// =============================================================================

#[derive(Args)]
pub struct DonationArgs {
    #[arg(long)]
    amount: Amount,
    /// `tithe`, `offering` or `pledge`
    #[arg(long = "type", default_value_t)]
    kind: DonationKind,
    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Donor member record (admins only; others donate as themselves)
    #[arg(long)]
    member: Option<MemberId>,
}

#[derive(Args)]
pub struct DonationChanges {
    #[arg(long)]
    amount: Option<Amount>,
    #[arg(long = "type")]
    kind: Option<DonationKind>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    member: Option<MemberId>,
}

impl From<DonationArgs> for DonationDraft {
    fn from(args: DonationArgs) -> Self {
        Self {
            member_id: args.member,
            amount: args.amount,
            kind: args.kind,
            date: args.date,
        }
    }
}

impl From<DonationChanges> for DonationPatch {
    fn from(args: DonationChanges) -> Self {
        Self {
            member_id: args.member,
            amount: args.amount,
            kind: args.kind,
            date: args.date,
        }
    }
}

fn donor(donation: &Donation) -> String {
    donation
        .member_name
        .clone()
        .or_else(|| donation.member_id.map(|id| format!("#{id}")))
        .unwrap_or_else(|| "-".to_string())
}

impl CliResource for Donation {
    const HEADERS: &'static [&'static str] = &["ID", "Member", "Type", "Amount", "Date"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            donor(self),
            self.kind.to_string(),
            self.amount.to_string(),
            render::opt(self.date.as_ref()),
        ]
    }

    fn patch_is_empty(patch: &DonationPatch) -> bool {
        patch.is_empty()
    }

    fn footer(items: &[Self]) -> Option<String> {
        let total: Amount = items.iter().map(|d| d.amount).sum();
        Some(format!("Total: {total} ({} donations)", items.len()))
    }

    fn scope_draft(draft: &mut DonationDraft, user: &UserRecord) {
        if !user.role.is_admin() && draft.member_id.take().is_some() {
            tracing::warn!("--member is ignored; donations are recorded for your own account");
        }
    }
}

// =============================================================================
// Sacraments
// =============================================================================

#[derive(Args)]
pub struct SacramentArgs {
    #[arg(long)]
    member: MemberId,
    /// Baptism, Confirmation, Marriage, ...
    #[arg(long = "type")]
    kind: String,
    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    certificate: Option<String>,
}

#[derive(Args)]
pub struct SacramentChanges {
    #[arg(long)]
    member: Option<MemberId>,
    #[arg(long = "type")]
    kind: Option<String>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    certificate: Option<String>,
}

impl From<SacramentArgs> for SacramentDraft {
    fn from(args: SacramentArgs) -> Self {
        Self {
            member_id: args.member,
            kind: args.kind,
            date: args.date,
            certificate_path: args.certificate,
        }
    }
}

impl From<SacramentChanges> for SacramentPatch {
    fn from(args: SacramentChanges) -> Self {
        Self {
            member_id: args.member,
            kind: args.kind,
            date: args.date,
            certificate_path: args.certificate,
        }
    }
}

impl CliResource for Sacrament {
    const HEADERS: &'static [&'static str] = &["ID", "Member", "Type", "Date", "Certificate"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.member_name
                .clone()
                .unwrap_or_else(|| format!("#{}", self.member_id)),
            self.kind.clone(),
            render::opt(self.date.as_ref()),
            render::opt(self.certificate_path.as_ref()),
        ]
    }

    fn patch_is_empty(patch: &SacramentPatch) -> bool {
        patch.is_empty()
    }
}

// =============================================================================
// Districts
// =============================================================================

#[derive(Args)]
pub struct DistrictArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    leader: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args)]
pub struct DistrictChanges {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    leader: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

impl From<DistrictArgs> for DistrictDraft {
    fn from(args: DistrictArgs) -> Self {
        Self {
            name: args.name,
            leader_name: args.leader,
            description: args.description,
        }
    }
}

impl From<DistrictChanges> for DistrictPatch {
    fn from(args: DistrictChanges) -> Self {
        Self {
            name: args.name,
            leader_name: args.leader,
            description: args.description,
        }
    }
}

impl CliResource for District {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Leader", "Members", "Description"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            render::opt(self.leader_name.as_ref()),
            render::opt(self.member_count.as_ref()),
            render::opt(self.description.as_ref()),
        ]
    }

    fn patch_is_empty(patch: &DistrictPatch) -> bool {
        patch.is_empty()
    }
}

// =============================================================================
// Announcements
// =============================================================================

#[derive(Args)]
pub struct AnnouncementArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    message: String,
    /// Defaults to `general`
    #[arg(long)]
    category: Option<String>,
    /// Expiry date, YYYY-MM-DD
    #[arg(long)]
    expires: Option<NaiveDate>,
}

#[derive(Args)]
pub struct AnnouncementChanges {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    message: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    expires: Option<NaiveDate>,
}

impl From<AnnouncementArgs> for AnnouncementDraft {
    fn from(args: AnnouncementArgs) -> Self {
        Self {
            title: args.title,
            message: args.message,
            category: args.category,
            expiry_date: args.expires,
        }
    }
}

impl From<AnnouncementChanges> for AnnouncementPatch {
    fn from(args: AnnouncementChanges) -> Self {
        Self {
            title: args.title,
            message: args.message,
            category: args.category,
            expiry_date: args.expires,
        }
    }
}

impl CliResource for Announcement {
    const HEADERS: &'static [&'static str] =
        &["ID", "Title", "Category", "Message", "Published", "Expires"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.category.clone(),
            self.message.clone(),
            render::opt(self.publish_date.map(|d| d.date()).as_ref()),
            render::opt(self.expiry_date.map(|d| d.date()).as_ref()),
        ]
    }

    fn patch_is_empty(patch: &AnnouncementPatch) -> bool {
        patch.is_empty()
    }
}

// =============================================================================
// Attendance
// =============================================================================

#[derive(Args)]
pub struct AttendanceArgs {
    #[arg(long)]
    event: EventId,
    #[arg(long)]
    member: MemberId,
    /// `present` or `absent`
    #[arg(long, default_value_t)]
    status: AttendanceStatus,
}

#[derive(Args)]
pub struct AttendanceChanges {
    #[arg(long)]
    event: Option<EventId>,
    #[arg(long)]
    member: Option<MemberId>,
    #[arg(long)]
    status: Option<AttendanceStatus>,
}

impl From<AttendanceArgs> for AttendanceDraft {
    fn from(args: AttendanceArgs) -> Self {
        Self {
            event_id: args.event,
            member_id: args.member,
            status: args.status,
        }
    }
}

impl From<AttendanceChanges> for AttendancePatch {
    fn from(args: AttendanceChanges) -> Self {
        Self {
            event_id: args.event,
            member_id: args.member,
            status: args.status,
        }
    }
}

impl CliResource for Attendance {
    const HEADERS: &'static [&'static str] = &["ID", "Event", "Member", "Status"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.event_name
                .clone()
                .unwrap_or_else(|| format!("#{}", self.event_id)),
            self.member_name
                .clone()
                .unwrap_or_else(|| format!("#{}", self.member_id)),
            self.status.to_string(),
        ]
    }

    fn patch_is_empty(patch: &AttendancePatch) -> bool {
        patch.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use parish_core::{Email, Role, UserId};

    fn user(role: Role) -> UserRecord {
        UserRecord {
            id: UserId::new(1),
            name: "Test".into(),
            email: Email::parse("test@parish.test").unwrap(),
            role,
            member_id: None,
        }
    }

    fn draft(member: Option<i32>) -> DonationDraft {
        DonationDraft {
            member_id: member.map(MemberId::new),
            amount: Amount::from_str("10").unwrap(),
            kind: DonationKind::Offering,
            date: None,
        }
    }

    #[test]
    fn test_member_donation_drops_member_id() {
        let mut d = draft(Some(4));
        Donation::scope_draft(&mut d, &user(Role::Member));
        assert_eq!(d.member_id, None);
    }

    #[test]
    fn test_admin_donation_keeps_member_id() {
        let mut d = draft(Some(4));
        Donation::scope_draft(&mut d, &user(Role::Admin));
        assert_eq!(d.member_id, Some(MemberId::new(4)));
    }

    #[test]
    fn test_donation_total_footer() {
        let donations: Vec<Donation> = serde_json::from_str(
            r#"[{"id": 1, "amount": 10.5, "type": "tithe"},
                {"id": 2, "amount": 4.25, "type": "offering"}]"#,
        )
        .unwrap();
        assert_eq!(
            Donation::footer(&donations).unwrap(),
            "Total: 14.75 (2 donations)"
        );
    }

    #[test]
    fn test_empty_changes_detected() {
        let changes = EventChanges {
            name: None,
            date: None,
            description: None,
        };
        assert!(Event::patch_is_empty(&changes.into()));
    }

    #[test]
    fn test_write_actions() {
        assert!(!Crud::<Event>::List.is_write());
        assert!(!Crud::<Event>::Show(EventId::new(1)).is_write());
        assert!(Crud::<Event>::Remove { id: EventId::new(1), yes: true }.is_write());
    }
}
