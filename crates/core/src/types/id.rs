//! Newtype IDs for type-safe entity references.
//!
//! Every parish entity has an integer identity, and several records carry
//! foreign keys to other entities (`member_id`, `event_id`, `user_id`). The
//! `define_id!` macro gives each of them its own type so a donation's member
//! can never be passed where an event is expected.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>`, `Into<i32>`, `Display` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use parish_core::define_id;
/// define_id!(PewId);
/// define_id!(HymnId);
///
/// let pew = PewId::new(1);
/// let parsed: HymnId = "7".parse().unwrap();
/// assert_eq!(parsed.as_i32(), 7);
///
/// // These are different types, so this won't compile:
/// // let _: PewId = parsed;
/// # let _ = pew;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Accounts
define_id!(UserId);

// Parish entities
define_id!(MemberId);
define_id!(EventId);
define_id!(DonationId);
define_id!(SacramentId);
define_id!(DistrictId);
define_id!(AnnouncementId);
define_id!(AttendanceId);
