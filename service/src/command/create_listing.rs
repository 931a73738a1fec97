//! [`Command`] for creating a new [`Listing`].

use common::operations::{
    By, Commit, Insert, Resolve, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing, User},
    infra::{database, geocoder, Database, Geocoder},
    Service,
};

use super::{resolve_place_id, Command};

/// [`Command`] for creating a new [`Listing`] awaiting review.
#[derive(Clone, Debug)]
pub struct CreateListing {
    /// ID of the [`User`] offering the apartment.
    pub author_id: user::Id,

    /// Validated content of the new [`Listing`].
    pub draft: listing::Draft,
}

impl<Db, Geo> Command<CreateListing> for Service<Db, Geo>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Listing>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Geo: Geocoder<
        Resolve<By<listing::PlaceId, listing::Address>>,
        Ok = listing::PlaceId,
        Err = Traced<geocoder::Error>,
    >,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateListing { author_id, draft } = cmd;

        drop(
            self.database()
                .execute(Select(By::new(author_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::AuthorNotExists(author_id))
                .map_err(tracerr::wrap!())?,
        );

        let place_id = resolve_place_id(self.geocoder(), &draft.address).await;
        let listing = Listing::new(author_id, draft, place_id);

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(listing)
    }
}

/// Error of [`CreateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] authoring the [`Listing`] does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    AuthorNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::Command as _,
        domain::{
            listing::Status,
            user::{self, Role},
        },
        fixture,
        infra::{geocoder, Database as _},
        Service,
    };

    use super::{CreateListing, ExecutionError};

    #[tokio::test]
    async fn stores_listing_awaiting_review() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        service.database().execute(Insert(author.clone())).await.unwrap();

        let listing = service
            .execute(CreateListing {
                author_id: author.id,
                draft: fixture::draft(),
            })
            .await
            .unwrap();

        assert_eq!(listing.status(), Status::AwaitingReview);
        assert!(!listing.is_hidden);
        assert_eq!(listing.place_id.as_ref(), "place-1");
        let stored = service.database().listing(listing.id).unwrap();
        assert_eq!(stored.amenities, listing.amenities);
        assert_eq!(stored.utilities, listing.utilities);
    }

    #[tokio::test]
    async fn tolerates_unavailable_geocoder() {
        let base = fixture::service();
        let service = Service::new(
            base.config().clone(),
            base.database().clone(),
            geocoder::Fixed::unavailable(),
        );
        let author = fixture::user(Role::Member);
        service.database().execute(Insert(author.clone())).await.unwrap();

        let listing = service
            .execute(CreateListing {
                author_id: author.id,
                draft: fixture::draft(),
            })
            .await
            .unwrap();

        assert!(listing.place_id.is_empty());
        assert!(service.database().listing(listing.id).is_some());
    }

    #[tokio::test]
    async fn requires_existing_author() {
        let service = fixture::service();

        let err = service
            .execute(CreateListing {
                author_id: user::Id::new(),
                draft: fixture::draft(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::AuthorNotExists(_)));
    }
}
