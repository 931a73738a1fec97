//! [`Query`] definition.

pub mod listing;
pub mod listings;
pub mod messages;
pub mod place;
pub mod user;
pub mod users;

use common::operations::{By, Resolve, Select};
use tracerr::Traced;

use crate::{
    infra::{database, geocoder, Database, Geocoder},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, Geo, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db, Geo>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// [`Query`] [`Resolve`]ing a `T`ype with a [`Geocoder`].
#[derive(Clone, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct GeocoderQuery<T>(T);

impl<W, B> GeocoderQuery<By<W, B>> {
    /// Creates a new [`GeocoderQuery`] resolving a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, Geo, W, B> Query<GeocoderQuery<By<W, B>>> for Service<Db, Geo>
where
    Geo: Geocoder<Resolve<By<W, B>>, Ok = W, Err = Traced<geocoder::Error>>,
{
    type Ok = W;
    type Err = Traced<geocoder::Error>;

    async fn execute(
        &self,
        GeocoderQuery(by): GeocoderQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.geocoder()
            .execute(Resolve(by))
            .await
            .map_err(tracerr::wrap!())
    }
}
