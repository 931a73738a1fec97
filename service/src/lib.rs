//! Business logic of the rental listing marketplace.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use std::time::Duration;

use derive_more::Debug;

#[cfg(doc)]
use infra::{Database, Geocoder};

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Key signing session [JWT]s.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// Key verifying session [JWT]s.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// How long an issued session stays valid.
    pub session_ttl: Duration,
}

/// Marketplace service executing [`Command`]s and [`Query`]s.
#[derive(Clone, Debug)]
pub struct Service<Db, Geo> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Geocoder`] resolving listing addresses.
    geocoder: Geo,
}

impl<Db, Geo> Service<Db, Geo> {
    /// Creates a new [`Service`] out of its parts.
    #[must_use]
    pub fn new(config: Config, database: Db, geocoder: Geo) -> Self {
        Self {
            config,
            database,
            geocoder,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Geocoder`] of this [`Service`].
    #[must_use]
    pub fn geocoder(&self) -> &Geo {
        &self.geocoder
    }
}

#[cfg(test)]
mod fixture {
    //! Ready-made values for tests.

    use std::time::Duration;

    use common::{Date, DateTime};

    use crate::{
        domain::{
            listing::{self, Draft, Form, Kind, PlaceId, Utilities},
            user::{self, Role},
            Listing, User,
        },
        infra::{geocoder, memory},
        Config, Service,
    };

    /// [`Service`] over in-memory infrastructure.
    pub(crate) type TestService = Service<memory::Database, geocoder::Fixed>;

    /// Creates a [`Config`] with a short session lifetime.
    pub(crate) fn config() -> Config {
        let secret = b"test-secret";
        Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            session_ttl: Duration::from_secs(60),
        }
    }

    /// Creates a [`TestService`] with an empty database.
    pub(crate) fn service() -> TestService {
        Service::new(
            config(),
            memory::Database::default(),
            geocoder::Fixed::new("place-1"),
        )
    }

    /// Creates a [`User`] with the `role`.
    pub(crate) fn user(role: Role) -> User {
        let id = user::Id::new();
        User {
            id,
            name: user::Name::new("Jane Doe").unwrap(),
            login: user::Login::new(format!("user-{id}")).unwrap(),
            password_hash: user::PasswordHash::new(
                &user::Password::new("password").unwrap(),
            ),
            email: None,
            role,
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    /// Creates a valid [`Form`] with the smallest allowed numbers.
    pub(crate) fn form() -> Form {
        Form {
            apartment_name: "test apt".into(),
            apartment_description: "a test apt".into(),
            listing_description: "a test apt".into(),
            kind: Kind::Roommate,
            lease_start: Date::new(2023, 11, 12).unwrap(),
            lease_end: Date::new(2024, 11, 12).unwrap(),
            address: "1 Test Address, City".into(),
            parking: true,
            square_feet: listing::SquareFeet::MIN,
            num_beds: listing::NumBeds::MIN,
            num_baths: listing::NumBaths::MIN,
            rent_per_month: listing::Rent::MIN,
            is_hidden: false,
            utilities: Utilities {
                water: true,
                heat: true,
                ..Utilities::default()
            },
            amenities: vec!["Pool".into(), "Gym".into()],
            features: vec!["Balcony".into()],
        }
    }

    /// Validates the [`form()`].
    pub(crate) fn draft() -> Draft {
        form().validate().unwrap()
    }

    /// Creates a [`Listing`] of the `author` awaiting review.
    pub(crate) fn listing(author: &User) -> Listing {
        Listing::new(author.id, draft(), PlaceId::default())
    }

    /// Creates an approved [`Listing`] of the `author`.
    pub(crate) fn approved_listing(author: &User) -> Listing {
        let mut listing = listing(author);
        listing.is_reviewed = true;
        listing.is_approved = true;
        listing
    }
}
