//! [`Command`] for reviewing a [`Listing`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing, Message, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for an administrator's decision on a [`Listing`].
///
/// The author is notified with a [`Message`].
#[derive(Clone, Debug)]
pub struct ReviewListing {
    /// ID of the [`Listing`] to review.
    pub listing_id: listing::Id,

    /// ID of the reviewing administrator.
    pub reviewer_id: user::Id,

    /// Whether the [`Listing`] is approved.
    pub approve: bool,

    /// Optional explanation of the decision.
    pub feedback: Option<listing::Feedback>,
}

/// Output of [`ReviewListing`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Reviewed [`Listing`].
    pub listing: Listing,

    /// [`Message`] sent to the author.
    pub message: Message,
}

impl<Db, Geo> Command<ReviewListing> for Service<Db, Geo>
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
        + Database<Insert<Message>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ReviewListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReviewListing {
            listing_id,
            reviewer_id,
            approve,
            feedback,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let reviewer = tx
            .execute(Select(By::<Option<User>, _>::new(reviewer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(reviewer_id))
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
        if !listing.can_be_reviewed_by(&reviewer) {
            return Err(tracerr::new!(E::NotAdministrator(reviewer_id)));
        }

        let message = listing.review(reviewer_id, approve, feedback.as_ref());

        tx.execute(Update(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(message.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Output { listing, message })
    }
}

/// Error of [`ReviewListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// Reviewing [`User`] is not an administrator.
    #[display("`User(id: {_0})` is not an administrator")]
    #[from(ignore)]
    NotAdministrator(#[error(not(source))] user::Id),

    /// Reviewing [`User`] does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::Command as _,
        domain::{listing, user::Role},
        fixture,
        infra::Database as _,
    };

    use super::{ExecutionError, ReviewListing};

    #[tokio::test]
    async fn rejection_notifies_author_once() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let admin = fixture::user(Role::Administrator);
        let listing = fixture::approved_listing(&author);
        for user in [&author, &admin] {
            service.database().execute(Insert(user.clone())).await.unwrap();
        }
        service.database().execute(Insert(listing.clone())).await.unwrap();

        let out = service
            .execute(ReviewListing {
                listing_id: listing.id,
                reviewer_id: admin.id,
                approve: false,
                feedback: listing::Feedback::new("needs photos"),
            })
            .await
            .unwrap();

        assert!(out.listing.is_reviewed);
        assert!(!out.listing.is_approved);
        let messages = service.database().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient_id, author.id);
        assert_eq!(messages[0].author_id, admin.id);
        assert_eq!(
            messages[0].text.as_ref(),
            "Listing \"test apt\" Rejected - Feedback: needs photos",
        );
    }

    #[tokio::test]
    async fn approval_without_feedback() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let admin = fixture::user(Role::Administrator);
        let listing = fixture::listing(&author);
        for user in [&author, &admin] {
            service.database().execute(Insert(user.clone())).await.unwrap();
        }
        service.database().execute(Insert(listing.clone())).await.unwrap();

        let out = service
            .execute(ReviewListing {
                listing_id: listing.id,
                reviewer_id: admin.id,
                approve: true,
                feedback: None,
            })
            .await
            .unwrap();

        assert!(out.listing.is_published());
        assert_eq!(out.message.text.as_ref(), "Listing \"test apt\" Approved");
    }

    #[tokio::test]
    async fn member_cannot_review() {
        let service = fixture::service();
        let author = fixture::user(Role::Member);
        let listing = fixture::listing(&author);
        service.database().execute(Insert(author.clone())).await.unwrap();
        service.database().execute(Insert(listing.clone())).await.unwrap();

        let err = service
            .execute(ReviewListing {
                listing_id: listing.id,
                reviewer_id: author.id,
                approve: true,
                feedback: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotAdministrator(_)));
        assert!(service.database().messages().is_empty());
        assert!(!service.database().listing(listing.id).unwrap().is_reviewed);
    }

    #[tokio::test]
    async fn unknown_listing() {
        let service = fixture::service();
        let admin = fixture::user(Role::Administrator);
        service.database().execute(Insert(admin.clone())).await.unwrap();

        let err = service
            .execute(ReviewListing {
                listing_id: listing::Id::new(),
                reviewer_id: admin.id,
                approve: true,
                feedback: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ListingNotExists(_)));
    }
}
