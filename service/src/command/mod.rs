//! [`Command`] definition.

pub mod authorize_user_session;
pub mod clear_messages;
pub mod create_listing;
pub mod create_user;
pub mod create_user_session;
pub mod moderate_listing;
pub mod review_listing;
pub mod update_listing;

use common::operations::{By, Resolve};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::listing,
    infra::{geocoder, Geocoder},
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    clear_messages::ClearMessages, create_listing::CreateListing,
    create_user::CreateUser, create_user_session::CreateUserSession,
    moderate_listing::ModerateListing, review_listing::ReviewListing,
    update_listing::UpdateListing,
};

/// Resolves the [`listing::PlaceId`] of the `address`.
///
/// Lookup failures are logged and yield an empty [`listing::PlaceId`], so a
/// listing can be saved while the [`Geocoder`] is down.
async fn resolve_place_id<Geo>(
    geocoder: &Geo,
    address: &listing::Address,
) -> listing::PlaceId
where
    Geo: Geocoder<
        Resolve<By<listing::PlaceId, listing::Address>>,
        Ok = listing::PlaceId,
        Err = Traced<geocoder::Error>,
    >,
{
    geocoder
        .execute(Resolve(By::new(address.clone())))
        .await
        .unwrap_or_else(|e| {
            log::warn!("failed to resolve place of `{address}`: {e}");
            listing::PlaceId::default()
        })
}
