//! [`Command`] for moderating a [`Listing`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for an administrator to set [`Listing`] flags directly,
/// bypassing the review workflow.
///
/// Flags left as [`None`] are kept intact.
#[derive(Clone, Copy, Debug)]
pub struct ModerateListing {
    /// ID of the [`Listing`] to moderate.
    pub listing_id: listing::Id,

    /// ID of the moderating administrator.
    pub moderator_id: user::Id,

    /// New [`Listing::is_approved`] value.
    pub is_approved: Option<bool>,

    /// New [`Listing::is_reviewed`] value.
    pub is_reviewed: Option<bool>,

    /// New [`Listing::is_hidden`] value.
    pub is_hidden: Option<bool>,
}

impl<Db, Geo> Command<ModerateListing> for Service<Db, Geo>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
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
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ModerateListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ModerateListing {
            listing_id,
            moderator_id,
            is_approved,
            is_reviewed,
            is_hidden,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let moderator = tx
            .execute(Select(By::<Option<User>, _>::new(moderator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(moderator_id))
            .map_err(tracerr::wrap!())?;

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
        if !listing.can_be_reviewed_by(&moderator) {
            return Err(tracerr::new!(E::NotAdministrator(moderator_id)));
        }

        listing.is_approved = is_approved.unwrap_or(listing.is_approved);
        listing.is_reviewed = is_reviewed.unwrap_or(listing.is_reviewed);
        listing.is_hidden = is_hidden.unwrap_or(listing.is_hidden);

        tx.execute(Update(listing.clone()))
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

/// Error of [`ModerateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// Moderating [`User`] is not an administrator.
    #[display("`User(id: {_0})` is not an administrator")]
    #[from(ignore)]
    NotAdministrator(#[error(not(source))] user::Id),

    /// Moderating [`User`] does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::Command as _, domain::user::Role, fixture,
        infra::Database as _,
    };

    use super::{ExecutionError, ModerateListing};

    #[tokio::test]
    async fn sets_only_provided_flags() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let admin = fixture::user(Role::Administrator);
        let listing = fixture::approved_listing(&author);
        for user in [&author, &admin] {
            service.database().execute(Insert(user.clone())).await.unwrap();
        }
        service.database().execute(Insert(listing.clone())).await.unwrap();

        let moderated = service
            .execute(ModerateListing {
                listing_id: listing.id,
                moderator_id: admin.id,
                is_approved: Some(false),
                is_reviewed: None,
                is_hidden: Some(true),
            })
            .await
            .unwrap();

        assert!(!moderated.is_approved);
        assert!(moderated.is_reviewed);
        assert!(moderated.is_hidden);
        assert!(service.database().messages().is_empty());
    }

    #[tokio::test]
    async fn author_cannot_moderate() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let listing = fixture::listing(&author);
        service.database().execute(Insert(author.clone())).await.unwrap();
        service.database().execute(Insert(listing.clone())).await.unwrap();

        let err = service
            .execute(ModerateListing {
                listing_id: listing.id,
                moderator_id: author.id,
                is_approved: Some(true),
                is_reviewed: Some(true),
                is_hidden: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotAdministrator(_)));
    }
}
