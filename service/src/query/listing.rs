//! [`Query`] collection related to a single [`Listing`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing, User},
    infra::{database, Database},
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries a [`Listing`] by its [`listing::Id`], regardless of who asks.
pub type ById = DatabaseQuery<By<Option<Listing>, listing::Id>>;

/// Queries a [`Listing`] on behalf of a viewer.
///
/// Unpublished [`Listing`]s are shown to their authors and administrators
/// only.
#[derive(Clone, Copy, Debug)]
pub struct View {
    /// ID of the [`Listing`] to show.
    pub listing_id: listing::Id,

    /// ID of the signed in [`User`] asking.
    pub viewer_id: user::Id,
}

impl<Db, Geo> Query<View> for Service<Db, Geo>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: View) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let View {
            listing_id,
            viewer_id,
        } = query;

        let listing = self
            .database()
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;
        if listing.is_published() {
            return Ok(listing);
        }

        let viewer = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(viewer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !viewer.is_some_and(|v| listing.can_be_viewed_by(&v)) {
            return Err(tracerr::new!(E::Forbidden(listing_id)));
        }

        Ok(listing)
    }
}

/// Error of [`View`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Viewer is not allowed to see the [`Listing`].
    #[display("`Listing(id: {_0})` is not visible to the viewer")]
    #[from(ignore)]
    Forbidden(#[error(not(source))] listing::Id),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::{listing, user::Role, Listing, User},
        fixture::{self, TestService},
        infra::Database as _,
        query::Query as _,
    };

    use super::{ExecutionError, View};

    async fn view(
        service: &TestService,
        listing: &Listing,
        viewer: &User,
    ) -> Result<Listing, ExecutionError> {
        service
            .execute(View {
                listing_id: listing.id,
                viewer_id: viewer.id,
            })
            .await
            .map_err(tracerr::Traced::into_inner)
    }

    #[tokio::test]
    async fn published_is_shown_to_everyone() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let stranger = fixture::user(Role::Member);
        let listing = fixture::approved_listing(&author);
        service.database().execute(Insert(stranger.clone())).await.unwrap();
        service.database().execute(Insert(listing.clone())).await.unwrap();

        assert!(view(&service, &listing, &stranger).await.is_ok());
    }

    #[tokio::test]
    async fn unpublished_is_shown_to_author_and_admin_only() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let admin = fixture::user(Role::Administrator);
        let stranger = fixture::user(Role::Member);
        let mut listing = fixture::approved_listing(&author);
        listing.is_hidden = true;
        for user in [&author, &admin, &stranger] {
            service.database().execute(Insert(user.clone())).await.unwrap();
        }
        service.database().execute(Insert(listing.clone())).await.unwrap();

        assert!(view(&service, &listing, &author).await.is_ok());
        assert!(view(&service, &listing, &admin).await.is_ok());
        assert!(matches!(
            view(&service, &listing, &stranger).await,
            Err(ExecutionError::Forbidden(_)),
        ));
    }

    #[tokio::test]
    async fn unknown_listing() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let mut listing = fixture::listing(&author);
        listing.id = listing::Id::new();

        assert!(matches!(
            view(&service, &listing, &author).await,
            Err(ExecutionError::ListingNotExists(_)),
        ));
    }
}
