//! [`Geocoder`] resolving street addresses into places.
//!
//! Lookups are [`Resolve`] operations:
//! - `Resolve<By<listing::PlaceId, listing::Address>>` finds the place an
//!   address points to, yielding an empty [`listing::PlaceId`] if there is
//!   none;
//! - `Resolve<By<Option<Coordinates>, listing::Address>>` locates an
//!   address on a map;
//! - `Resolve<By<Vec<PhotoUrl>, listing::PlaceId>>` lists photos of a place.
//!
//! [`Resolve`]: common::operations::Resolve

#[cfg(test)]
mod fixed;
#[cfg(feature = "google-maps")]
pub mod google_maps;

use derive_more::{AsRef, Display, Error as StdError, From};

#[cfg(doc)]
use crate::domain::listing;

#[cfg(test)]
pub(crate) use self::fixed::Fixed;
#[cfg(feature = "google-maps")]
pub use self::google_maps::GoogleMaps;

/// Geocoding operation.
pub use common::Handler as Geocoder;

/// Geographic position of a place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    /// Latitude, in degrees.
    pub latitude: f64,

    /// Longitude, in degrees.
    pub longitude: f64,
}

/// Publicly fetchable URL of a place photo.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str)]
pub struct PhotoUrl(String);

/// [`Geocoder`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "google-maps")]
    /// [`GoogleMaps`] error.
    GoogleMaps(google_maps::Error),

    /// Geocoding service can't be reached right now.
    #[cfg(test)]
    #[display("Geocoding service is unavailable: {_0}")]
    #[from(ignore)]
    Unavailable(#[error(not(source))] String),
}
