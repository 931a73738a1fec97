//! Infrastructure layer.

pub mod database;
pub mod geocoder;
#[cfg(test)]
pub(crate) mod memory;

pub use self::{database::Database, geocoder::Geocoder};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
#[cfg(feature = "google-maps")]
pub use self::geocoder::GoogleMaps;
