//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read::listing::list, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";

    /// Default number of `Listing`s on a page.
    const DEFAULT_PAGE_SIZE: i32 = 20;

    /// Fetches the page of `Listing`s in the `scope`, narrowed by the
    /// `filter`.
    async fn listing_page(
        scope: list::Scope,
        page: Page,
        filter: Option<api::listing::list::Filter>,
        ctx: &Context,
    ) -> Result<api::listing::list::Connection, Error> {
        let Page {
            first,
            after,
            last,
            before,
        } = page;

        let arguments = list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            Self::DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;
        let filter = list::Filter {
            scope,
            criteria: filter
                .unwrap_or_default()
                .into_criteria()
                .map_err(ctx.error())?,
        };

        ctx.service()
            .execute(query::listings::List::by(list::Selector {
                arguments,
                filter: filter.clone(),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|page| api::listing::list::Connection::new(page, filter))
    }
}

/// Relay-style pagination arguments.
#[derive(Clone, Copy, Debug)]
struct Page {
    /// Number of `Listing`s after the `after` cursor.
    first: Option<i32>,

    /// Cursor to fetch `Listing`s after.
    after: Option<api::listing::list::Cursor>,

    /// Number of `Listing`s before the `before` cursor.
    last: Option<i32>,

    /// Cursor to fetch `Listing`s before.
    before: Option<api::listing::list::Cursor>,
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        ctx.current_user().await.map(Into::into)
    }

    /// Returns the `Listing` with the specified ID.
    ///
    /// Unpublished `Listing`s are shown to their authors and administrators
    /// only.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist;
    /// - `FORBIDDEN` - the `Listing` is not published, and the current
    ///                 `User` is neither its author nor an administrator.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "listing",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(query::listing::View {
                listing_id: id.into(),
                viewer_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of published `Listing`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous;
    /// - `INVALID_LISTING_FILTER` - the `filter` holds negative numbers.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            filter = ?filter,
            first = ?first,
            gql.name = "listings",
            last = ?last,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listings(
        first: Option<i32>,
        after: Option<api::listing::list::Cursor>,
        last: Option<i32>,
        before: Option<api::listing::list::Cursor>,
        filter: Option<api::listing::list::Filter>,
        ctx: &Context,
    ) -> Result<api::listing::list::Connection, Error> {
        _ = ctx.current_session().await?;

        let page = Page {
            first,
            after,
            last,
            before,
        };
        Self::listing_page(list::Scope::Published, page, filter, ctx).await
    }

    /// Fetches the page of `Listing`s created by the current `User`,
    /// regardless of their review status.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous;
    /// - `INVALID_LISTING_FILTER` - the `filter` holds negative numbers.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            filter = ?filter,
            first = ?first,
            gql.name = "myListings",
            last = ?last,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_listings(
        first: Option<i32>,
        after: Option<api::listing::list::Cursor>,
        last: Option<i32>,
        before: Option<api::listing::list::Cursor>,
        filter: Option<api::listing::list::Filter>,
        ctx: &Context,
    ) -> Result<api::listing::list::Connection, Error> {
        let my_id = ctx.current_session().await?.user_id;

        let page = Page {
            first,
            after,
            last,
            before,
        };
        let scope = list::Scope::AuthoredBy(my_id.into());
        Self::listing_page(scope, page, filter, ctx).await
    }

    /// Fetches the page of `Listing`s not reviewed since their last
    /// significant change.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NOT_ADMINISTRATOR` - the current `User` is not an administrator;
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous;
    /// - `INVALID_LISTING_FILTER` - the `filter` holds negative numbers.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            filter = ?filter,
            first = ?first,
            gql.name = "listingsPendingReview",
            last = ?last,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listings_pending_review(
        first: Option<i32>,
        after: Option<api::listing::list::Cursor>,
        last: Option<i32>,
        before: Option<api::listing::list::Cursor>,
        filter: Option<api::listing::list::Filter>,
        ctx: &Context,
    ) -> Result<api::listing::list::Connection, Error> {
        _ = ctx.current_administrator().await?;

        let page = Page {
            first,
            after,
            last,
            before,
        };
        let scope = list::Scope::PendingReview;
        Self::listing_page(scope, page, filter, ctx).await
    }

    /// Fetches the page of all the `Listing`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NOT_ADMINISTRATOR` - the current `User` is not an administrator;
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous;
    /// - `INVALID_LISTING_FILTER` - the `filter` holds negative numbers.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            filter = ?filter,
            first = ?first,
            gql.name = "allListings",
            last = ?last,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn all_listings(
        first: Option<i32>,
        after: Option<api::listing::list::Cursor>,
        last: Option<i32>,
        before: Option<api::listing::list::Cursor>,
        filter: Option<api::listing::list::Filter>,
        ctx: &Context,
    ) -> Result<api::listing::list::Connection, Error> {
        _ = ctx.current_administrator().await?;

        let page = Page {
            first,
            after,
            last,
            before,
        };
        Self::listing_page(list::Scope::All, page, filter, ctx).await
    }

    /// Returns `Message`s addressed to the current `User`, oldest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myMessages",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_messages(
        ctx: &Context,
    ) -> Result<Vec<api::Message>, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(query::messages::ByRecipient::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|msgs| msgs.into_iter().map(Into::into).collect())
    }
}

impl AsError for query::listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::Forbidden(_) => ListingError::Forbidden.into(),
            Self::ListingNotExists(_) => ListingError::NotExists.into(),
        })
    }
}

define_error! {
    enum ListingError {
        #[code = "LISTING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Listing` with the specified ID does not exist"]
        NotExists,

        #[code = "FORBIDDEN"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` is not allowed to access the \
                     `Listing`"]
        Forbidden,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}

#[cfg(test)]
mod spec {
    use axum::extract::FromRequestParts as _;
    use service::infra::{GoogleMaps, Postgres};

    use crate::{api, config, Context, Service};

    /// Creates a [`Context`] of a request without credentials.
    ///
    /// The infrastructure is never connected to.
    async fn anonymous_context() -> Context {
        let service = Service::new(
            config::Service::default().into(),
            Postgres::new(&config::Postgres::default().into()).unwrap(),
            GoogleMaps::new(config::Geocoder::default().into()).unwrap(),
        );
        let (mut parts, ()) = http::Request::builder()
            .extension(service)
            .body(())
            .unwrap()
            .into_parts();
        Context::from_request_parts(&mut parts, &()).await.unwrap()
    }

    async fn error_codes(query: &str) -> Vec<String> {
        let ctx = anonymous_context().await;
        let schema =
            api::Schema::new(api::Query, api::Mutation, api::Subscription);

        let (_, errors) = juniper::execute(
            query,
            None,
            &schema,
            &juniper::Variables::new(),
            &ctx,
        )
        .await
        .unwrap();

        assert_eq!(ctx.error_status_code(), http::StatusCode::UNAUTHORIZED);
        errors
            .iter()
            .map(|e| {
                e.error()
                    .extensions()
                    .as_object_value()
                    .and_then(|ext| ext.get_field_value("code"))
                    .and_then(|code| code.as_string_value())
                    .unwrap_or_default()
                    .to_owned()
            })
            .collect()
    }

    #[tokio::test]
    async fn listings_require_authorization() {
        let codes =
            error_codes("{ listings { edges { node { id } } } }").await;

        assert_eq!(codes, ["AUTHORIZATION_REQUIRED"]);
    }

    #[tokio::test]
    async fn listing_requires_authorization() {
        let codes = error_codes(
            r#"{ listing(id: "3f9ce4d4-4a47-4c4e-9d3c-1d0c2f1a7b55") { id } }"#,
        )
        .await;

        assert_eq!(codes, ["AUTHORIZATION_REQUIRED"]);
    }
}
