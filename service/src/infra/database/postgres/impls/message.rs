//! [`Message`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{user, Message},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Insert<Message>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(msg): Insert<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        let Message {
            id,
            recipient_id,
            author_id,
            text,
            created_at,
        } = msg;

        const SQL: &str = "\
            INSERT INTO messages (\
                id, recipient_id, author_id, text, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::TEXT, $5::TIMESTAMPTZ\
            )";
        self.exec(SQL, &[&id, &recipient_id, &author_id, &text, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Message>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Message>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Message>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let recipient_id = by.into_inner();

        const SQL: &str = "\
            SELECT id, recipient_id, author_id, text, created_at \
            FROM messages \
            WHERE recipient_id = $1::UUID \
            ORDER BY created_at, id";
        Ok(self
            .query(SQL, &[&recipient_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Message {
                id: row.get("id"),
                recipient_id: row.get("recipient_id"),
                author_id: row.get("author_id"),
                text: row.get("text"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

impl<C> Database<Delete<By<Vec<Message>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Message>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let recipient_id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM messages \
            WHERE recipient_id = $1::UUID";
        self.exec(SQL, &[&recipient_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
