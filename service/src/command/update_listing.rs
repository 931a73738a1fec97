//! [`Command`] for updating a [`Listing`].

use std::collections::BTreeSet;

use common::operations::{
    By, Commit, Lock, Resolve, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing, User},
    infra::{database, geocoder, Database, Geocoder},
    Service,
};

use super::{resolve_place_id, Command};

/// [`Command`] for updating a [`Listing`] by its author or an
/// administrator.
///
/// Changing anything but [`Listing::is_hidden`] sends the [`Listing`] back
/// for review.
#[derive(Clone, Debug)]
pub struct UpdateListing {
    /// ID of the [`Listing`] to update.
    pub listing_id: listing::Id,

    /// ID of the [`User`] performing the update.
    pub initiator_id: user::Id,

    /// New content of the [`Listing`].
    pub draft: listing::Draft,
}

/// Output of [`UpdateListing`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Listing`] after the update.
    pub listing: Listing,

    /// [`listing::Field`]s whose values have changed.
    pub changed: BTreeSet<listing::Field>,
}

impl<Db, Geo> Command<UpdateListing> for Service<Db, Geo>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Listing, listing::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Update<Listing>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Geo: Geocoder<
        Resolve<By<listing::PlaceId, listing::Address>>,
        Ok = listing::PlaceId,
        Err = Traced<geocoder::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateListing {
            listing_id,
            initiator_id,
            draft,
        } = cmd;

        // Geocoder must not be called while the `Listing` is locked.
        let current = self
            .database()
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let mut place_id = match current {
            Some(l) if l.address != draft.address => Some(
                resolve_place_id(self.geocoder(), &draft.address).await,
            ),
            Some(_) | None => None,
        };

        loop {
            let tx = self
                .database()
                .execute(Transact)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            tx.execute(Lock(By::<Listing, _>::new(listing_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            let mut listing = tx
                .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::ListingNotExists(listing_id))
                .map_err(tracerr::wrap!())?;
            let initiator = tx
                .execute(Select(By::<Option<User>, _>::new(initiator_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(initiator_id))
                .map_err(tracerr::wrap!())?;
            if !listing.can_be_updated_by(&initiator) {
                return Err(tracerr::new!(E::Forbidden(initiator_id)));
            }

            if listing.address != draft.address && place_id.is_none() {
                // Address was changed concurrently since the first read.
                drop(tx);
                place_id = Some(
                    resolve_place_id(self.geocoder(), &draft.address).await,
                );
                continue;
            }

            let changed = listing.update(draft);
            if changed.is_empty() {
                return Ok(Output { listing, changed });
            }
            if let Some(id) = place_id.filter(|_| {
                changed.contains(&listing::Field::Address)
            }) {
                listing.place_id = id;
            }

            tx.execute(Update(listing.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            return Ok(Output { listing, changed });
        }
    }
}

/// Error of [`UpdateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] is neither the author nor an administrator.
    #[display("`User(id: {_0})` is not allowed to update the `Listing`")]
    #[from(ignore)]
    Forbidden(#[error(not(source))] user::Id),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`User`] performing the update does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::Command as _,
        domain::{
            listing::{self, Field},
            user::Role,
            Listing, User,
        },
        fixture::{self, TestService},
        infra::{geocoder, memory, Database as _},
        Service,
    };

    use super::{ExecutionError, UpdateListing};

    async fn seed(service: &TestService, users: &[&User], listing: &Listing) {
        for user in users {
            service.database().execute(Insert((*user).clone())).await.unwrap();
        }
        service.database().execute(Insert(listing.clone())).await.unwrap();
    }

    #[tokio::test]
    async fn hiding_keeps_approval() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let listing = fixture::approved_listing(&author);
        seed(&service, &[&author], &listing).await;

        let mut draft = fixture::draft();
        draft.is_hidden = true;
        let out = service
            .execute(UpdateListing {
                listing_id: listing.id,
                initiator_id: author.id,
                draft,
            })
            .await
            .unwrap();

        assert_eq!(out.changed.into_iter().collect::<Vec<_>>(), [
            Field::IsHidden
        ]);
        let stored = service.database().listing(listing.id).unwrap();
        assert!(stored.is_hidden);
        assert!(stored.is_approved);
        assert!(stored.is_reviewed);
    }

    #[tokio::test]
    async fn significant_change_withdraws_approval() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let listing = fixture::approved_listing(&author);
        seed(&service, &[&author], &listing).await;

        let mut draft = fixture::draft();
        draft.num_beds = listing::NumBeds::new(2).unwrap();
        drop(
            service
                .execute(UpdateListing {
                    listing_id: listing.id,
                    initiator_id: author.id,
                    draft,
                })
                .await
                .unwrap(),
        );

        let stored = service.database().listing(listing.id).unwrap();
        assert!(!stored.is_approved);
        assert!(!stored.is_reviewed);
    }

    #[tokio::test]
    async fn administrator_may_update() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let admin = fixture::user(Role::Administrator);
        let listing = fixture::listing(&author);
        seed(&service, &[&author, &admin], &listing).await;

        let mut draft = fixture::draft();
        draft.address = listing::Address::new("77 Other Street").unwrap();
        let out = service
            .execute(UpdateListing {
                listing_id: listing.id,
                initiator_id: admin.id,
                draft,
            })
            .await
            .unwrap();

        assert!(out.changed.contains(&Field::Address));
        assert_eq!(out.listing.place_id.as_ref(), "place-1");
    }

    #[tokio::test]
    async fn resolves_place_outside_of_transaction() {
        let db = memory::Database::default();
        let service = Service::new(
            fixture::config(),
            db.clone(),
            geocoder::Fixed::new("place-2").outside_of(db),
        );
        let author = fixture::user(Role::Member);
        let listing = fixture::approved_listing(&author);
        seed(&service, &[&author], &listing).await;

        let mut draft = fixture::draft();
        draft.address = listing::Address::new("5 New Street").unwrap();
        let out = service
            .execute(UpdateListing {
                listing_id: listing.id,
                initiator_id: author.id,
                draft,
            })
            .await
            .unwrap();

        assert!(out.changed.contains(&Field::Address));
        let stored = service.database().listing(listing.id).unwrap();
        assert_eq!(stored.place_id.as_ref(), "place-2");
        assert_eq!(stored.address.raw(), "5 New Street");
        assert_eq!(service.database().open_transactions(), 0);
    }

    #[tokio::test]
    async fn unchanged_address_keeps_place() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let mut listing = fixture::approved_listing(&author);
        listing.place_id = "place-0".to_owned().into();
        seed(&service, &[&author], &listing).await;

        let mut draft = fixture::draft();
        draft.parking = false;
        let out = service
            .execute(UpdateListing {
                listing_id: listing.id,
                initiator_id: author.id,
                draft,
            })
            .await
            .unwrap();

        assert!(!out.changed.contains(&Field::Address));
        assert_eq!(out.listing.place_id.as_ref(), "place-0");
    }

    #[tokio::test]
    async fn stranger_is_forbidden() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let stranger = fixture::user(Role::Member);
        let listing = fixture::approved_listing(&author);
        seed(&service, &[&author, &stranger], &listing).await;

        let mut draft = fixture::draft();
        draft.parking = false;
        let err = service
            .execute(UpdateListing {
                listing_id: listing.id,
                initiator_id: stranger.id,
                draft,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Forbidden(_)));
        assert!(service.database().listing(listing.id).unwrap().parking);
    }

    #[tokio::test]
    async fn unknown_listing() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let listing = fixture::listing(&author);
        seed(&service, &[&author], &listing).await;

        let err = service
            .execute(UpdateListing {
                listing_id: listing::Id::new(),
                initiator_id: author.id,
                draft: fixture::draft(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ListingNotExists(_)));
    }
}
