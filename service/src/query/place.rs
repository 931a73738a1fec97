//! [`Query`] collection related to places of [`Listing`]s.
//!
//! [`Listing`]: crate::domain::Listing

use common::operations::By;

use crate::{
    domain::listing,
    infra::geocoder::{Coordinates as Point, PhotoUrl},
};
#[cfg(doc)]
use crate::Query;

use super::GeocoderQuery;

/// Queries [`Point`] of a [`listing::Address`] on a map.
pub type Coordinates = GeocoderQuery<By<Option<Point>, listing::Address>>;

/// Queries [`PhotoUrl`]s of a [`listing::PlaceId`].
pub type Photos = GeocoderQuery<By<Vec<PhotoUrl>, listing::PlaceId>>;
