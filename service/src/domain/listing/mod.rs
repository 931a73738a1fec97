//! [`Listing`] of an apartment for rent.

mod address;
pub mod draft;

use std::collections::BTreeSet;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{message, user, Message, User};

pub use self::{
    address::Address,
    draft::{Draft, Field, Form, Invalid},
};

/// Apartment offered for rent by its author.
///
/// Publicly visible only once approved by an administrator, and unless
/// hidden by the author.
#[derive(Clone, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// ID of the [`User`] who created this [`Listing`].
    pub author_id: user::Id,

    /// Name of the apartment.
    pub apartment_name: ApartmentName,

    /// Description of the apartment itself.
    pub apartment_description: Description,

    /// Description of the offer.
    pub listing_description: Description,

    /// [`Kind`] of the offer.
    pub kind: Kind,

    /// First day of the lease.
    pub lease_start: Date,

    /// Last day of the lease.
    pub lease_end: Date,

    /// Street [`Address`] of the apartment.
    pub address: Address,

    /// [`PlaceId`] the [`Listing::address`] resolves to.
    pub place_id: PlaceId,

    /// Whether a parking spot comes with the apartment.
    pub parking: bool,

    /// Area of the apartment.
    pub square_feet: SquareFeet,

    /// Number of beds.
    pub num_beds: NumBeds,

    /// Number of bathrooms.
    pub num_baths: NumBaths,

    /// Monthly rent.
    pub rent_per_month: Rent,

    /// Included [`Utilities`].
    pub utilities: Utilities,

    /// Community amenities, in the entered order.
    pub amenities: Vec<Tag>,

    /// Apartment features, in the entered order.
    pub features: Vec<Tag>,

    /// Whether an administrator approved this [`Listing`].
    pub is_approved: bool,

    /// Whether an administrator reviewed this [`Listing`] since its last
    /// significant change.
    pub is_reviewed: bool,

    /// Whether the author hides this [`Listing`] from the public.
    pub is_hidden: bool,

    /// [`DateTime`] this [`Listing`] was created at.
    pub created_at: CreationDateTime,
}

impl Listing {
    /// Creates a new [`Listing`] awaiting review.
    #[must_use]
    pub fn new(author_id: user::Id, draft: Draft, place_id: PlaceId) -> Self {
        let Draft {
            apartment_name,
            apartment_description,
            listing_description,
            kind,
            lease_start,
            lease_end,
            address,
            parking,
            square_feet,
            num_beds,
            num_baths,
            rent_per_month,
            is_hidden,
            utilities,
            amenities,
            features,
        } = draft;

        Self {
            id: Id::new(),
            author_id,
            apartment_name,
            apartment_description,
            listing_description,
            kind,
            lease_start,
            lease_end,
            address,
            place_id,
            parking,
            square_feet,
            num_beds,
            num_baths,
            rent_per_month,
            utilities,
            amenities,
            features,
            is_approved: false,
            is_reviewed: false,
            is_hidden,
            created_at: CreationDateTime::now(),
        }
    }

    /// Returns the review [`Status`] of this [`Listing`].
    #[must_use]
    pub fn status(&self) -> Status {
        if self.is_approved {
            Status::Approved
        } else if self.is_reviewed {
            Status::Rejected
        } else {
            Status::AwaitingReview
        }
    }

    /// Indicates whether this [`Listing`] is shown to everyone.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.is_approved && !self.is_hidden
    }

    /// Checks whether the `user` authored this [`Listing`].
    #[must_use]
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author_id == user.id
    }

    /// Checks whether the `viewer` may see this [`Listing`].
    #[must_use]
    pub fn can_be_viewed_by(&self, viewer: &User) -> bool {
        self.is_published()
            || viewer.is_administrator()
            || self.is_authored_by(viewer)
    }

    /// Checks whether the `user` may edit this [`Listing`].
    #[must_use]
    pub fn can_be_updated_by(&self, user: &User) -> bool {
        user.is_administrator() || self.is_authored_by(user)
    }

    /// Checks whether the `user` may review or moderate this [`Listing`].
    #[expect(clippy::unused_self, reason = "same shape as other rules")]
    #[must_use]
    pub fn can_be_reviewed_by(&self, user: &User) -> bool {
        user.is_administrator()
    }

    /// Returns the [`Field`]s whose values in the `draft` differ from the
    /// current ones.
    #[must_use]
    pub fn changes(&self, draft: &Draft) -> BTreeSet<Field> {
        [
            (
                Field::ApartmentName,
                self.apartment_name != draft.apartment_name,
            ),
            (
                Field::ApartmentDescription,
                self.apartment_description != draft.apartment_description,
            ),
            (
                Field::ListingDescription,
                self.listing_description != draft.listing_description,
            ),
            (Field::Kind, self.kind != draft.kind),
            (Field::LeaseStart, self.lease_start != draft.lease_start),
            (Field::LeaseEnd, self.lease_end != draft.lease_end),
            (Field::Address, self.address != draft.address),
            (Field::Parking, self.parking != draft.parking),
            (Field::SquareFeet, self.square_feet != draft.square_feet),
            (Field::NumBeds, self.num_beds != draft.num_beds),
            (Field::NumBaths, self.num_baths != draft.num_baths),
            (
                Field::RentPerMonth,
                self.rent_per_month != draft.rent_per_month,
            ),
            (Field::IsHidden, self.is_hidden != draft.is_hidden),
            (Field::Utilities, self.utilities != draft.utilities),
            (Field::Amenities, self.amenities != draft.amenities),
            (Field::Features, self.features != draft.features),
        ]
        .into_iter()
        .filter_map(|(field, changed)| changed.then_some(field))
        .collect()
    }

    /// Applies the `draft` to this [`Listing`], returning the changed
    /// [`Field`]s.
    ///
    /// Changing any [`Field`] other than [`Field::IsHidden`] withdraws the
    /// approval, so the [`Listing`] has to be reviewed again.
    pub fn update(&mut self, draft: Draft) -> BTreeSet<Field> {
        let changed = self.changes(&draft);
        if changed.iter().any(|f| f.requires_review()) {
            self.is_reviewed = false;
            self.is_approved = false;
        }

        let Draft {
            apartment_name,
            apartment_description,
            listing_description,
            kind,
            lease_start,
            lease_end,
            address,
            parking,
            square_feet,
            num_beds,
            num_baths,
            rent_per_month,
            is_hidden,
            utilities,
            amenities,
            features,
        } = draft;
        self.apartment_name = apartment_name;
        self.apartment_description = apartment_description;
        self.listing_description = listing_description;
        self.kind = kind;
        self.lease_start = lease_start;
        self.lease_end = lease_end;
        self.address = address;
        self.parking = parking;
        self.square_feet = square_feet;
        self.num_beds = num_beds;
        self.num_baths = num_baths;
        self.rent_per_month = rent_per_month;
        self.is_hidden = is_hidden;
        self.utilities = utilities;
        self.amenities = amenities;
        self.features = features;

        changed
    }

    /// Records the `reviewer`'s decision on this [`Listing`], returning the
    /// [`Message`] notifying its author.
    #[must_use]
    pub fn review(
        &mut self,
        reviewer_id: user::Id,
        approve: bool,
        feedback: Option<&Feedback>,
    ) -> Message {
        self.is_reviewed = true;
        self.is_approved = approve;

        Message::new(
            self.author_id,
            reviewer_id,
            message::Text::review(&self.apartment_name, approve, feedback),
        )
    }
}

/// ID of a [`Listing`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Generates a random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Review status of a [`Listing`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Status {
    /// Approved by an administrator.
    #[display("Approved")]
    Approved,

    /// Reviewed, but not approved.
    #[display("Rejected")]
    Rejected,

    /// Not reviewed since the last significant change.
    #[display("Awaiting review")]
    AwaitingReview,
}

define_kind! {
    #[doc = "Kind of an offer a [`Listing`] makes."]
    enum Kind {
        #[doc = "Sublet for the summer."]
        SubletSummer = 1,

        #[doc = "Sublet for the winter."]
        SubletWinter = 2,

        #[doc = "Lease handed over to a new tenant."]
        LeaseTakeover = 3,

        #[doc = "Sublet for an arbitrary term."]
        Sublet = 4,

        #[doc = "Roommate search."]
        Roommate = 5,

        #[doc = "Direct lease."]
        Lease = 6,
    }
}

impl Kind {
    /// Returns the human-readable label of this [`Kind`].
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SubletSummer => "Looking to Sublet over Summer",
            Self::SubletWinter => "Looking to Sublet over Winter",
            Self::LeaseTakeover => "Looking to Give over Lease",
            Self::Sublet => "Looking to Sublet",
            Self::Roommate => "Looking for Roommate",
            Self::Lease => "Lease",
        }
    }
}

/// Name of an apartment, from 1 to 100 characters.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ApartmentName(String);

impl ApartmentName {
    /// Maximum length of an [`ApartmentName`], in characters.
    pub const MAX_LEN: usize = 100;

    /// Wraps the `name` if it's a valid [`ApartmentName`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into().trim().to_owned();
        (!name.is_empty() && name.chars().count() <= Self::MAX_LEN)
            .then_some(Self(name))
    }
}

impl FromStr for ApartmentName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ApartmentName`")
    }
}

/// Non-blank free text describing an apartment or an offer.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Maximum length of a [`Description`], in characters.
    pub const MAX_LEN: usize = 10_000;

    /// Trims the `text` and wraps it if it's a valid [`Description`].
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into().trim().to_owned();
        (!text.is_empty() && text.chars().count() <= Self::MAX_LEN)
            .then_some(Self(text))
    }
}

/// Identifier of a place known to the geocoding service.
///
/// Empty when the address couldn't be resolved.
#[derive(AsRef, Clone, Debug, Default, Display, Eq, From, Into, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PlaceId(String);

impl PlaceId {
    /// Checks whether this [`PlaceId`] points to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Defines a non-negative integer quantity of a [`Listing`].
macro_rules! define_quantity {
    ($(#[doc = $doc:literal] $name:ident),* $(,)?) => {$(
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq,
            PartialOrd,
        )]
        #[cfg_attr(
            feature = "postgres",
            derive(FromSql, ToSql),
            postgres(transparent),
        )]
        pub struct $name(i32);

        impl $name {
            /// Smallest allowed value.
            pub const MIN: i32 = 0;

            /// Wraps the `value` if it's not less than [`Self::MIN`].
            #[must_use]
            pub const fn new(value: i32) -> Option<Self> {
                if value >= Self::MIN {
                    Some(Self(value))
                } else {
                    None
                }
            }

            /// Returns the wrapped value.
            #[must_use]
            pub const fn get(self) -> i32 {
                self.0
            }
        }
    )*};
}

define_quantity! {
    #[doc = "Area of an apartment, in square feet."]
    SquareFeet,
    #[doc = "Number of beds in an apartment."]
    NumBeds,
    #[doc = "Number of bathrooms in an apartment."]
    NumBaths,
    #[doc = "Monthly rent, in whole dollars."]
    Rent,
}

/// Short free-form label of an amenity or a feature, from 1 to 50
/// characters.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Tag(String);

impl Tag {
    /// Maximum length of a [`Tag`], in characters.
    pub const MAX_LEN: usize = 50;

    /// Wraps the `label` if it's a valid [`Tag`].
    #[must_use]
    pub fn new(label: impl Into<String>) -> Option<Self> {
        let label = label.into().trim().to_owned();
        (!label.is_empty() && label.chars().count() <= Self::MAX_LEN)
            .then_some(Self(label))
    }

    /// Wraps every label, unless any of them is invalid.
    #[must_use]
    pub fn all(labels: impl IntoIterator<Item = String>) -> Option<Vec<Self>> {
        labels.into_iter().map(Self::new).collect()
    }
}

/// Review feedback for a [`Listing`] author, up to 300 characters.
#[derive(AsRef, Clone, Debug, Default, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct Feedback(String);

impl Feedback {
    /// Maximum length of a [`Feedback`], in characters.
    pub const MAX_LEN: usize = 300;

    /// Wraps the `text` if it's a valid [`Feedback`].
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into().trim().to_owned();
        (text.chars().count() <= Self::MAX_LEN).then_some(Self(text))
    }

    /// Checks whether this [`Feedback`] says nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Utilities included into the rent of a [`Listing`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[expect(clippy::struct_excessive_bools, reason = "independent flags")]
pub struct Utilities {
    /// Gas.
    pub gas: bool,

    /// Water.
    pub water: bool,

    /// Heat.
    pub heat: bool,

    /// Trash.
    pub trash: bool,

    /// Sewer.
    pub sewer: bool,

    /// Electricity.
    pub electricity: bool,

    /// Internet.
    pub internet: bool,

    /// Security.
    pub security: bool,

    /// Cable.
    pub cable: bool,

    /// Phone.
    pub phone: bool,
}

impl Utilities {
    /// Returns labels of the provided utilities, in a fixed order.
    #[must_use]
    pub fn provided(&self) -> Vec<&'static str> {
        [
            ("Gas", self.gas),
            ("Water", self.water),
            ("Heat", self.heat),
            ("Trash", self.trash),
            ("Sewer", self.sewer),
            ("Electricity", self.electricity),
            ("Internet", self.internet),
            ("Security", self.security),
            ("Cable", self.cable),
            ("Phone", self.phone),
        ]
        .into_iter()
        .filter_map(|(label, on)| on.then_some(label))
        .collect()
    }
}

/// [`DateTime`] when a [`Listing`] was created.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;

#[cfg(test)]
mod spec {
    use crate::{
        domain::{listing, user::Role},
        fixture,
    };

    use super::{Field, NumBeds, Status};

    #[test]
    fn new_listing_awaits_review() {
        let author = fixture::user(Role::Member);
        let listing = fixture::listing(&author);

        assert!(!listing.is_approved);
        assert!(!listing.is_reviewed);
        assert_eq!(listing.status(), Status::AwaitingReview);
    }

    #[test]
    fn visibility_rules() {
        let author = fixture::user(Role::Member);
        let stranger = fixture::user(Role::Member);
        let admin = fixture::user(Role::Administrator);

        for approved in [false, true] {
            for hidden in [false, true] {
                let mut listing = fixture::listing(&author);
                listing.is_approved = approved;
                listing.is_hidden = hidden;

                assert!(listing.can_be_viewed_by(&author));
                assert!(listing.can_be_viewed_by(&admin));
                assert_eq!(
                    listing.can_be_viewed_by(&stranger),
                    approved && !hidden,
                    "approved: {approved}, hidden: {hidden}",
                );
            }
        }
    }

    #[test]
    fn update_and_review_rules() {
        let author = fixture::user(Role::Member);
        let stranger = fixture::user(Role::Member);
        let admin = fixture::user(Role::Administrator);
        let listing = fixture::listing(&author);

        assert!(listing.can_be_updated_by(&author));
        assert!(listing.can_be_updated_by(&admin));
        assert!(!listing.can_be_updated_by(&stranger));

        assert!(listing.can_be_reviewed_by(&admin));
        assert!(!listing.can_be_reviewed_by(&author));
    }

    #[test]
    fn hiding_keeps_approval() {
        let author = fixture::user(Role::Member);
        let mut listing = fixture::approved_listing(&author);
        let mut draft = fixture::draft();
        draft.is_hidden = true;

        let changed = listing.update(draft);

        assert_eq!(changed.into_iter().collect::<Vec<_>>(), [Field::IsHidden]);
        assert!(listing.is_approved);
        assert!(listing.is_reviewed);
        assert!(listing.is_hidden);
    }

    #[test]
    fn significant_change_withdraws_approval() {
        let author = fixture::user(Role::Member);
        let mut listing = fixture::approved_listing(&author);
        let mut draft = fixture::draft();
        draft.num_beds = NumBeds::new(3).unwrap();

        let changed = listing.update(draft);

        assert!(changed.contains(&Field::NumBeds));
        assert!(!listing.is_approved);
        assert!(!listing.is_reviewed);
        assert_eq!(listing.num_beds.get(), 3);
    }

    #[test]
    fn same_values_are_no_change() {
        let author = fixture::user(Role::Member);
        let listing = fixture::approved_listing(&author);

        assert!(listing.changes(&fixture::draft()).is_empty());
    }

    #[test]
    fn same_raw_address_is_no_change() {
        let author = fixture::user(Role::Member);
        let listing = fixture::approved_listing(&author);
        let mut draft = fixture::draft();
        draft.address = listing::Address::new(listing.address.raw()).unwrap();

        assert!(listing.changes(&draft).is_empty());

        draft.address = listing::Address::new("2 Other St").unwrap();
        assert_eq!(
            listing.changes(&draft).into_iter().collect::<Vec<_>>(),
            [Field::Address],
        );
    }

    #[test]
    fn surrounding_whitespace_is_no_change() {
        let author = fixture::user(Role::Member);
        let mut listing = fixture::approved_listing(&author);
        let mut form = fixture::form();
        form.apartment_name = format!(" {} ", form.apartment_name);
        form.apartment_description =
            format!("{}\n", form.apartment_description);
        form.listing_description = format!("  {}", form.listing_description);
        form.address = format!("{} ", form.address);

        let changed = listing.update(form.validate().unwrap());

        assert!(changed.is_empty(), "changed: {changed:?}");
        assert!(listing.is_approved);
        assert!(listing.is_reviewed);
    }

    #[test]
    fn tags_and_utilities_are_significant() {
        let author = fixture::user(Role::Member);
        let mut listing = fixture::approved_listing(&author);
        let mut draft = fixture::draft();
        draft.utilities.internet = !draft.utilities.internet;
        draft.amenities.reverse();

        let changed = listing.update(draft);

        assert!(changed.contains(&Field::Utilities));
        assert!(changed.contains(&Field::Amenities));
        assert_eq!(listing.status(), Status::AwaitingReview);
    }

    #[test]
    fn review_marks_reviewed_and_notifies_author() {
        let author = fixture::user(Role::Member);
        let admin = fixture::user(Role::Administrator);
        let mut listing = fixture::listing(&author);

        let msg = listing.review(admin.id, false, None);

        assert!(listing.is_reviewed);
        assert!(!listing.is_approved);
        assert_eq!(listing.status(), Status::Rejected);
        assert_eq!(msg.recipient_id, author.id);
        assert_eq!(msg.author_id, admin.id);
        assert_eq!(msg.text.as_ref(), "Listing \"test apt\" Rejected");
    }

    #[test]
    fn rejects_invalid_form_naming_fields() {
        let mut form = fixture::form();
        form.num_beds = NumBeds::MIN - 1;
        form.num_baths = -1;
        form.rent_per_month = -1;
        form.apartment_name = String::new();
        form.apartment_description = " ".into();
        form.listing_description = String::new();
        form.address = String::new();
        form.amenities = vec!["x".repeat(100)];

        let err = form.validate().unwrap_err();

        for field in [
            Field::NumBeds,
            Field::NumBaths,
            Field::RentPerMonth,
            Field::ApartmentName,
            Field::ApartmentDescription,
            Field::ListingDescription,
            Field::Address,
            Field::Amenities,
        ] {
            assert!(err.contains(field), "`{field}` is not reported");
        }
        assert!(!err.contains(Field::SquareFeet));
        assert!(err.names().contains(&"num_beds"));
    }

    #[test]
    fn rejects_empty_tag() {
        let mut form = fixture::form();
        form.features = vec![String::new()];

        assert_eq!(form.validate().unwrap_err().0, [Field::Features]);
    }

    #[test]
    fn accepts_minimal_values() {
        let draft = fixture::form().validate().unwrap();

        assert_eq!(draft, fixture::draft());
    }
}
