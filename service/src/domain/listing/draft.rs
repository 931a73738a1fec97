//! Author-editable content of a [`Listing`].
//!
//! [`Listing`]: super::Listing

use std::fmt;

use common::Date;
use derive_more::Error;
use strum::IntoStaticStr;

use super::{
    Address, ApartmentName, Description, Kind, NumBaths, NumBeds, Rent,
    SquareFeet, Tag, Utilities,
};

/// Validated author-editable fields of a [`Listing`].
///
/// [`Listing`]: super::Listing
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Draft {
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

    /// Whether the author hides the listing from the public.
    pub is_hidden: bool,

    /// Included [`Utilities`].
    pub utilities: Utilities,

    /// Community amenities, in the entered order.
    pub amenities: Vec<Tag>,

    /// Apartment features, in the entered order.
    pub features: Vec<Tag>,
}

/// Unvalidated author input for a [`Draft`].
#[derive(Clone, Debug)]
pub struct Form {
    /// Raw [`Draft::apartment_name`].
    pub apartment_name: String,

    /// Raw [`Draft::apartment_description`].
    pub apartment_description: String,

    /// Raw [`Draft::listing_description`].
    pub listing_description: String,

    /// [`Draft::kind`].
    pub kind: Kind,

    /// [`Draft::lease_start`].
    pub lease_start: Date,

    /// [`Draft::lease_end`].
    pub lease_end: Date,

    /// Raw [`Draft::address`].
    pub address: String,

    /// [`Draft::parking`].
    pub parking: bool,

    /// Raw [`Draft::square_feet`].
    pub square_feet: i32,

    /// Raw [`Draft::num_beds`].
    pub num_beds: i32,

    /// Raw [`Draft::num_baths`].
    pub num_baths: i32,

    /// Raw [`Draft::rent_per_month`].
    pub rent_per_month: i32,

    /// [`Draft::is_hidden`].
    pub is_hidden: bool,

    /// [`Draft::utilities`].
    pub utilities: Utilities,

    /// Raw [`Draft::amenities`].
    pub amenities: Vec<String>,

    /// Raw [`Draft::features`].
    pub features: Vec<String>,
}

impl Form {
    /// Validates this [`Form`] into a [`Draft`].
    ///
    /// # Errors
    ///
    /// With every [`Field`] holding an invalid value.
    pub fn validate(self) -> Result<Draft, Invalid> {
        let mut invalid = Vec::new();
        let mut check = Check(&mut invalid);

        let apartment_name = check
            .field(Field::ApartmentName, ApartmentName::new(self.apartment_name));
        let apartment_description = check.field(
            Field::ApartmentDescription,
            Description::new(self.apartment_description),
        );
        let listing_description = check.field(
            Field::ListingDescription,
            Description::new(self.listing_description),
        );
        let address = check.field(Field::Address, Address::new(self.address));
        let square_feet =
            check.field(Field::SquareFeet, SquareFeet::new(self.square_feet));
        let num_beds = check.field(Field::NumBeds, NumBeds::new(self.num_beds));
        let num_baths =
            check.field(Field::NumBaths, NumBaths::new(self.num_baths));
        let rent_per_month =
            check.field(Field::RentPerMonth, Rent::new(self.rent_per_month));
        let amenities = check.field(Field::Amenities, Tag::all(self.amenities));
        let features = check.field(Field::Features, Tag::all(self.features));

        match (
            apartment_name,
            apartment_description,
            listing_description,
            address,
            square_feet,
            num_beds,
            num_baths,
            rent_per_month,
            amenities,
            features,
        ) {
            (
                Some(apartment_name),
                Some(apartment_description),
                Some(listing_description),
                Some(address),
                Some(square_feet),
                Some(num_beds),
                Some(num_baths),
                Some(rent_per_month),
                Some(amenities),
                Some(features),
            ) => Ok(Draft {
                apartment_name,
                apartment_description,
                listing_description,
                kind: self.kind,
                lease_start: self.lease_start,
                lease_end: self.lease_end,
                address,
                parking: self.parking,
                square_feet,
                num_beds,
                num_baths,
                rent_per_month,
                is_hidden: self.is_hidden,
                utilities: self.utilities,
                amenities,
                features,
            }),
            _ => Err(Invalid(invalid)),
        }
    }
}

/// Collector of [`Field`]s failing validation.
struct Check<'a>(&'a mut Vec<Field>);

impl Check<'_> {
    /// Remembers the `field` if its `value` turned out invalid.
    fn field<T>(&mut self, field: Field, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.0.push(field);
        }
        value
    }
}

/// Author-editable field of a [`Listing`].
///
/// [`Listing`]: super::Listing
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    IntoStaticStr,
    Ord,
    PartialEq,
    PartialOrd,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    /// [`Draft::apartment_name`].
    ApartmentName,

    /// [`Draft::apartment_description`].
    ApartmentDescription,

    /// [`Draft::listing_description`].
    ListingDescription,

    /// [`Draft::kind`].
    Kind,

    /// [`Draft::lease_start`].
    LeaseStart,

    /// [`Draft::lease_end`].
    LeaseEnd,

    /// [`Draft::address`].
    Address,

    /// [`Draft::parking`].
    Parking,

    /// [`Draft::square_feet`].
    SquareFeet,

    /// [`Draft::num_beds`].
    NumBeds,

    /// [`Draft::num_baths`].
    NumBaths,

    /// [`Draft::rent_per_month`].
    RentPerMonth,

    /// [`Draft::is_hidden`].
    IsHidden,

    /// [`Draft::utilities`].
    Utilities,

    /// [`Draft::amenities`].
    Amenities,

    /// [`Draft::features`].
    Features,
}

impl Field {
    /// Indicates whether changing this [`Field`] sends a listing back to
    /// review.
    #[must_use]
    pub const fn requires_review(self) -> bool {
        !matches!(self, Self::IsHidden)
    }
}

/// [`Form`] validation failure.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub struct Invalid(#[error(not(source))] pub Vec<Field>);

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid listing fields: {}", self.names().join(", "))
    }
}

impl Invalid {
    /// Returns names of the invalid [`Field`]s.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|&f| <&'static str>::from(f)).collect()
    }

    /// Checks whether the `field` is among the invalid ones.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains(&field)
    }
}
