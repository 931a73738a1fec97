//! [`Message`] notifying a [`User`] about a decision on their listing.
//!
//! [`User`]: crate::domain::User

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::{listing, user};

/// Notification addressed to a [`User`].
///
/// [`User`]: crate::domain::User
#[derive(Clone, Debug)]
pub struct Message {
    /// ID of this [`Message`].
    pub id: Id,

    /// ID of the [`User`] this [`Message`] is addressed to.
    ///
    /// [`User`]: crate::domain::User
    pub recipient_id: user::Id,

    /// ID of the administrator who sent this [`Message`].
    pub author_id: user::Id,

    /// [`Text`] of this [`Message`].
    pub text: Text,

    /// [`DateTime`] this [`Message`] was sent at.
    pub created_at: CreationDateTime,
}

impl Message {
    /// Creates a new [`Message`] sent right now.
    #[must_use]
    pub fn new(recipient_id: user::Id, author_id: user::Id, text: Text) -> Self {
        Self {
            id: Id::new(),
            recipient_id,
            author_id,
            text,
            created_at: CreationDateTime::now(),
        }
    }
}

/// ID of a [`Message`].
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, FromStr, Hash, Into,
    PartialEq,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Generates a random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Text of a [`Message`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Text(String);

impl Text {
    /// Composes the [`Text`] announcing a review decision on the listing
    /// named `name`.
    #[must_use]
    pub fn review(
        name: &listing::ApartmentName,
        approved: bool,
        feedback: Option<&listing::Feedback>,
    ) -> Self {
        let verdict = if approved { "Approved" } else { "Rejected" };
        let mut text = format!("Listing \"{name}\" {verdict}");
        if let Some(fb) = feedback.filter(|fb| !fb.is_empty()) {
            text.push_str(" - Feedback: ");
            text.push_str(fb.as_ref());
        }
        Self(text)
    }
}

/// [`DateTime`] when a [`Message`] was created.
pub type CreationDateTime = DateTimeOf<(Message, unit::Creation)>;

#[cfg(test)]
mod spec {
    use crate::domain::listing::{ApartmentName, Feedback};

    use super::Text;

    #[test]
    fn announces_approval() {
        let name = ApartmentName::new("test apt").unwrap();

        assert_eq!(
            Text::review(&name, true, None).as_ref(),
            "Listing \"test apt\" Approved",
        );
    }

    #[test]
    fn announces_rejection_with_feedback() {
        let name = ApartmentName::new("test apt").unwrap();
        let feedback = Feedback::new("no photos").unwrap();

        assert_eq!(
            Text::review(&name, false, Some(&feedback)).as_ref(),
            "Listing \"test apt\" Rejected - Feedback: no photos",
        );
    }

    #[test]
    fn omits_empty_feedback() {
        let name = ApartmentName::new("test apt").unwrap();
        let feedback = Feedback::new("").unwrap();

        assert_eq!(
            Text::review(&name, false, Some(&feedback)).as_ref(),
            "Listing \"test apt\" Rejected",
        );
    }
}
