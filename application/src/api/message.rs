//! [`Message`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// Notification addressed to the current `User`.
#[derive(Clone, Debug, From)]
pub struct Message(domain::Message);

/// Notification addressed to the current `User`.
#[graphql_object(context = Context)]
impl Message {
    /// Unique identifier of this `Message`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Text of this `Message`.
    #[must_use]
    pub fn text(&self) -> &str {
        self.0.text.as_ref()
    }

    /// Administrator who sent this `Message`.
    #[must_use]
    pub fn author(&self) -> api::User {
        #[expect(
            unsafe_code,
            reason = "`Message` author is guaranteed to exist by the database"
        )]
        unsafe {
            api::User::new_unchecked(self.0.author_id)
        }
    }

    /// `DateTime` when this `Message` was sent.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Message`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::message::Id)]
#[into(domain::message::Id)]
#[graphql(name = "MessageId", transparent)]
pub struct Id(Uuid);
