//! [`Session`] of a signed in [`User`].
//!
//! [`User`]: crate::domain::User

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::domain::user;

/// Claims of a [JWT] issued to a signed in [`User`].
///
/// [`User`]: crate::domain::User
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the signed in [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// [`DateTime`] after which this [`Session`] is no longer accepted.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Encoded [`Session`] passed as a bearer token.
#[derive(AsRef, Clone, Debug, Display, FromStr)]
#[as_ref(str)]
pub struct Token(String);

impl Token {
    /// Wraps the `token` as is.
    ///
    /// # Safety
    ///
    /// The `token` must be produced by encoding a [`Session`].
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] when a [`Session`] expires.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
