//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, domain, Command as _};

use crate::{
    api::{self, query::ListingError},
    context, define_error, AsError, Context, Error,
};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User` with the provided credentials and signs them in.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LOGIN_OCCUPIED` - provided `UserLogin` is occupied by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = ?email,
            gql.name = "createUser",
            login = %login,
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        login: api::user::Login,
        password: api::user::Password,
        email: Option<api::user::Email>,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let user = ctx
            .service()
            .execute(command::CreateUser {
                name: name.into(),
                login: login.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                email: email.map(Into::into),
                role: domain::user::Role::Member,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let result = api::user::session::CreateResult::from(
            ctx.service()
                .execute(command::CreateUserSession::ByUserId(user.id))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())?,
        );

        ctx.set_current_session(result.session()).await;

        Ok(result)
    }

    /// Creates a new `UserSession` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials does not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUserSession",
            login = %login,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        login: api::user::Login,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let result = api::user::session::CreateResult::from(
            ctx.service()
                .execute(command::CreateUserSession::ByCredentials {
                    login: login.into(),
                    password: secrecy::SecretBox::init_with(move || {
                        password.into()
                    }),
                })
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())?,
        );

        ctx.set_current_session(result.session()).await;

        Ok(result)
    }

    /// Creates a new `Listing` of the current `User`.
    ///
    /// The created `Listing` awaits a review before being published.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INVALID_LISTING` - some of the provided fields are invalid, their
    ///                       names are listed in the `fields` extension.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createListing",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_listing(
        input: api::listing::Input,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let draft = input.into_draft().map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateListing {
                author_id: my_id.into(),
                draft,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the content of the `Listing` with the provided one.
    ///
    /// Changing anything but the `isHidden` flag sends the `Listing` back to
    /// review.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INVALID_LISTING` - some of the provided fields are invalid, their
    ///                       names are listed in the `fields` extension;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist;
    /// - `FORBIDDEN` - the current `User` is neither the author of the
    ///                 `Listing` nor an administrator.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateListing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_listing(
        id: api::listing::Id,
        input: api::listing::Input,
        ctx: &Context,
    ) -> Result<api::listing::UpdateResult, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let draft = input.into_draft().map_err(ctx.error())?;

        ctx.service()
            .execute(command::UpdateListing {
                listing_id: id.into(),
                initiator_id: my_id.into(),
                draft,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Approves or rejects the `Listing`, notifying its author with a
    /// `Message`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INVALID_FEEDBACK` - the `feedback` is longer than 300 characters;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist;
    /// - `NOT_ADMINISTRATOR` - the current `User` is not an administrator.
    #[tracing::instrument(
        skip_all,
        fields(
            approve = approve,
            feedback = ?feedback,
            gql.name = "reviewListing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn review_listing(
        id: api::listing::Id,
        approve: bool,
        feedback: Option<String>,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let feedback = feedback
            .map(|text| {
                domain::listing::Feedback::new(text)
                    .ok_or_else(|| ReviewError::InvalidFeedback.into())
            })
            .transpose()
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::ReviewListing {
                listing_id: id.into(),
                reviewer_id: my_id.into(),
                approve,
                feedback,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|out| out.listing.into())
    }

    /// Directly sets the workflow flags of the `Listing`.
    ///
    /// Omitted flags are left untouched, and no `Message` is sent.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist;
    /// - `NOT_ADMINISTRATOR` - the current `User` is not an administrator.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "moderateListing",
            id = %id,
            is_approved = ?is_approved,
            is_hidden = ?is_hidden,
            is_reviewed = ?is_reviewed,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn moderate_listing(
        id: api::listing::Id,
        is_approved: Option<bool>,
        is_reviewed: Option<bool>,
        is_hidden: Option<bool>,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ModerateListing {
                listing_id: id.into(),
                moderator_id: my_id.into(),
                is_approved,
                is_reviewed,
                is_hidden,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes all the `Message`s addressed to the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "clearMyMessages",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn clear_my_messages(ctx: &Context) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ClearMessages {
                recipient_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }
}

define_error! {
    enum ReviewError {
        #[code = "INVALID_FEEDBACK"]
        #[status = BAD_REQUEST]
        #[message = "`feedback` must not be longer than 300 characters"]
        InvalidFeedback,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LOGIN_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "Provided login is already occupied"]
                LoginOccupied,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::LoginOccupied(_) => Error::LoginOccupied.into(),
        })
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = UNAUTHORIZED]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) | Self::UserNotExists(_) => {
                return None
            }
            Self::WrongCredentials => Error::WrongCredentials.into(),
        })
    }
}

impl AsError for command::create_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::AuthorNotExists(_) => {
                Some(context::AuthError::AuthorizationRequired.into())
            }
        }
    }
}

impl AsError for command::update_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::Forbidden(_) => ListingError::Forbidden.into(),
            Self::ListingNotExists(_) => ListingError::NotExists.into(),
            Self::UserNotExists(_) => {
                context::AuthError::AuthorizationRequired.into()
            }
        })
    }
}

impl AsError for command::review_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => ListingError::NotExists.into(),
            Self::NotAdministrator(_) => {
                api::PrivilegeError::Administrator.into()
            }
            Self::UserNotExists(_) => {
                context::AuthError::AuthorizationRequired.into()
            }
        })
    }
}

impl AsError for command::moderate_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => ListingError::NotExists.into(),
            Self::NotAdministrator(_) => {
                api::PrivilegeError::Administrator.into()
            }
            Self::UserNotExists(_) => {
                context::AuthError::AuthorizationRequired.into()
            }
        })
    }
}

impl AsError for command::clear_messages::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}
