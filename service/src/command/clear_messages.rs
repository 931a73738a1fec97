//! [`Command`] for deleting [`Message`]s of a [`User`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{user, Message},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting all the [`Message`]s addressed to a [`User`].
#[derive(Clone, Copy, Debug, From)]
pub struct ClearMessages {
    /// ID of the [`User`] whose [`Message`]s are deleted.
    pub recipient_id: user::Id,
}

impl<Db, Geo> Command<ClearMessages> for Service<Db, Geo>
where
    Db: Database<
        Delete<By<Vec<Message>, user::Id>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ClearMessages,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Delete(By::new(cmd.recipient_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
            .map(drop)
    }
}

/// Error of [`ClearMessages`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::Command as _,
        domain::{message, user::Role, Message},
        fixture,
        infra::Database as _,
    };

    use super::ClearMessages;

    #[tokio::test]
    async fn deletes_only_recipient_messages() {
        let service = fixture::service();
        let admin = fixture::user(Role::Administrator);
        let alice = fixture::user(Role::Member);
        let bob = fixture::user(Role::Member);
        let name = "test apt".parse().unwrap();
        for recipient in [&alice, &alice, &bob] {
            let text = message::Text::review(&name, true, None);
            service
                .database()
                .execute(Insert(Message::new(recipient.id, admin.id, text)))
                .await
                .unwrap();
        }

        service.execute(ClearMessages::from(alice.id)).await.unwrap();

        let left = service.database().messages();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].recipient_id, bob.id);
    }
}
