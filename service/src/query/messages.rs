//! [`Query`] collection related to [`Message`]s.

use common::operations::By;

#[cfg(doc)]
use crate::{domain::User, Query};
use crate::domain::{user, Message};

use super::DatabaseQuery;

/// Queries [`Message`]s addressed to a [`User`], oldest first.
pub type ByRecipient = DatabaseQuery<By<Vec<Message>, user::Id>>;
