//! [`Fixed`] [`Geocoder`] implementation.

use common::operations::{By, Resolve};
use tracerr::Traced;

use crate::{
    domain::listing,
    infra::{
        geocoder::{self, Coordinates, PhotoUrl},
        memory, Geocoder,
    },
};

/// [`Geocoder`] resolving every address into the same place.
#[derive(Clone, Debug)]
pub(crate) struct Fixed {
    /// Place every address resolves to, or [`None`] if the lookups fail.
    place_id: Option<listing::PlaceId>,

    /// [`memory::Database`] which must have no open transactions while an
    /// address is resolved.
    outside_of: Option<memory::Database>,
}

impl Fixed {
    /// Creates a [`Fixed`] [`Geocoder`] resolving into the `place_id`.
    pub(crate) fn new(place_id: &str) -> Self {
        Self {
            place_id: Some(place_id.to_owned().into()),
            outside_of: None,
        }
    }

    /// Creates a [`Fixed`] [`Geocoder`] failing every lookup.
    pub(crate) fn unavailable() -> Self {
        Self {
            place_id: None,
            outside_of: None,
        }
    }

    /// Makes this [`Fixed`] [`Geocoder`] panic if an address is resolved
    /// while the `db` has an open transaction.
    pub(crate) fn outside_of(mut self, db: memory::Database) -> Self {
        self.outside_of = Some(db);
        self
    }

    /// Returns the configured place, or fails.
    fn place_id(&self) -> Result<&listing::PlaceId, Traced<geocoder::Error>> {
        self.place_id.as_ref().ok_or_else(|| {
            tracerr::new!(geocoder::Error::Unavailable("offline".into()))
        })
    }
}

impl Geocoder<Resolve<By<listing::PlaceId, listing::Address>>> for Fixed {
    type Ok = listing::PlaceId;
    type Err = Traced<geocoder::Error>;

    async fn execute(
        &self,
        Resolve(by): Resolve<By<listing::PlaceId, listing::Address>>,
    ) -> Result<Self::Ok, Self::Err> {
        if let Some(db) = &self.outside_of {
            assert_eq!(
                db.open_transactions(),
                0,
                "`{}` is resolved inside a transaction",
                by.into_inner(),
            );
        }
        self.place_id().cloned()
    }
}

impl Geocoder<Resolve<By<Option<Coordinates>, listing::Address>>> for Fixed {
    type Ok = Option<Coordinates>;
    type Err = Traced<geocoder::Error>;

    async fn execute(
        &self,
        _: Resolve<By<Option<Coordinates>, listing::Address>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.place_id().map(|_| {
            Some(Coordinates {
                latitude: 38.03,
                longitude: -78.5,
            })
        })
    }
}

impl Geocoder<Resolve<By<Vec<PhotoUrl>, listing::PlaceId>>> for Fixed {
    type Ok = Vec<PhotoUrl>;
    type Err = Traced<geocoder::Error>;

    async fn execute(
        &self,
        Resolve(by): Resolve<By<Vec<PhotoUrl>, listing::PlaceId>>,
    ) -> Result<Self::Ok, Self::Err> {
        let place_id = by.into_inner();
        Ok(if self.place_id()? == &place_id {
            vec![format!("https://photos.test/{place_id}.jpg").into()]
        } else {
            Vec::new()
        })
    }
}
