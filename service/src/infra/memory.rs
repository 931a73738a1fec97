//! In-memory [`Database`] for tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use common::{
    operations::{By, Commit, Delete, Insert, Lock, Select, Transact, Update},
    pagination::Direction,
};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing, Message, User},
    infra::database,
    read::listing::list,
};

use super::Database as Handler;

/// In-memory [`Database`].
///
/// Transactions share the state with their origin, so every write is
/// visible immediately.
///
/// [`Database`]: super::Database
#[derive(Clone, Debug, Default)]
pub struct Database {
    /// Stored entities.
    state: Arc<Mutex<State>>,

    /// Number of transactions not dropped yet.
    open_transactions: Arc<AtomicUsize>,

    /// Transaction this [`Database`] belongs to, if any.
    _transaction: Option<Arc<Transaction>>,
}

/// Open transaction of a [`Database`], closed on drop.
#[derive(Debug)]
struct Transaction {
    /// Counter of the open transactions of the origin [`Database`].
    open: Arc<AtomicUsize>,
}

impl Drop for Transaction {
    fn drop(&mut self) {
        _ = self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Stored entities of a [`Database`].
#[derive(Debug, Default)]
struct State {
    users: HashMap<user::Id, User>,
    listings: HashMap<listing::Id, Listing>,
    messages: Vec<Message>,
}

impl Database {
    /// Locks the [`State`] of this [`Database`].
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Returns all the stored [`Message`]s.
    pub(crate) fn messages(&self) -> Vec<Message> {
        self.state().messages.clone()
    }

    /// Returns the stored [`Listing`] with the `id`, if any.
    pub(crate) fn listing(&self, id: listing::Id) -> Option<Listing> {
        self.state().listings.get(&id).cloned()
    }

    /// Returns the number of transactions still open.
    pub(crate) fn open_transactions(&self) -> usize {
        self.open_transactions.load(Ordering::SeqCst)
    }
}

impl Handler<Transact> for Database {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        _ = self.open_transactions.fetch_add(1, Ordering::SeqCst);
        Ok(Self {
            state: Arc::clone(&self.state),
            open_transactions: Arc::clone(&self.open_transactions),
            _transaction: Some(Arc::new(Transaction {
                open: Arc::clone(&self.open_transactions),
            })),
        })
    }
}

impl Handler<Commit> for Database {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<IDs> Handler<Select<By<HashMap<user::Id, User>, IDs>>> for Database
where
    IDs: AsRef<[user::Id]>,
{
    type Ok = HashMap<user::Id, User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<user::Id, User>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.state();
        Ok(by
            .into_inner()
            .as_ref()
            .iter()
            .filter_map(|id| state.users.get(id))
            .filter(|u| u.deleted_at.is_none())
            .map(|u| (u.id, u.clone()))
            .collect())
    }
}

impl Handler<Select<By<Option<User>, user::Id>>> for Database {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.execute(Select(By::<HashMap<user::Id, User>, _>::new([id])))
            .await
            .map(|mut found| found.remove(&id))
    }
}

impl<'l> Handler<Select<By<Option<User>, &'l user::Login>>> for Database {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();
        Ok(self
            .state()
            .users
            .values()
            .find(|u| u.deleted_at.is_none() && &u.login == login)
            .cloned())
    }
}

impl Handler<Insert<User>> for Database {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().users.insert(user.id, user));
        Ok(())
    }
}

impl<IDs> Handler<Select<By<HashMap<listing::Id, Listing>, IDs>>> for Database
where
    IDs: AsRef<[listing::Id]>,
{
    type Ok = HashMap<listing::Id, Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<listing::Id, Listing>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.state();
        Ok(by
            .into_inner()
            .as_ref()
            .iter()
            .filter_map(|id| state.listings.get(id))
            .map(|l| (l.id, l.clone()))
            .collect())
    }
}

impl Handler<Select<By<Option<Listing>, listing::Id>>> for Database {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.listing(by.into_inner()))
    }
}

impl Handler<Insert<Listing>> for Database {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().listings.insert(listing.id, listing));
        Ok(())
    }
}

impl Handler<Update<Listing>> for Database {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Insert(listing)).await
    }
}

impl Handler<Lock<By<Listing, listing::Id>>> for Database {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Handler<Select<By<list::Connection, list::Selector>>> for Database {
    type Ok = list::Connection;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::Connection, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Selector { arguments, filter } = by.into_inner();
        let direction = arguments.direction();

        let mut cursors = self
            .state()
            .listings
            .values()
            .filter(|l| filter.matches(l))
            .map(list::Cursor::from)
            .filter(|c| {
                arguments.cursor().map_or(true, |at| match direction {
                    Direction::Forward => c > at,
                    Direction::Backward => c < at,
                })
            })
            .collect::<Vec<_>>();
        cursors.sort_unstable();
        if direction == Direction::Backward {
            cursors.reverse();
        }

        let has_more = cursors.len() > arguments.limit();
        let edges = cursors
            .into_iter()
            .take(arguments.limit())
            .map(|c| (c, c.id));
        Ok(list::Connection::new(&arguments, edges, has_more))
    }
}

impl Handler<Select<By<list::TotalCount, list::Filter>>> for Database {
    type Ok = list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let count = self
            .state()
            .listings
            .values()
            .filter(|l| filter.matches(l))
            .count();
        Ok(list::TotalCount::from(i64::try_from(count).unwrap()))
    }
}

impl Handler<Insert<Message>> for Database {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(message): Insert<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state().messages.push(message);
        Ok(())
    }
}

impl Handler<Select<By<Vec<Message>, user::Id>>> for Database {
    type Ok = Vec<Message>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Message>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let recipient = by.into_inner();
        let mut messages = self
            .state()
            .messages
            .iter()
            .filter(|m| m.recipient_id == recipient)
            .cloned()
            .collect::<Vec<_>>();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }
}

impl Handler<Delete<By<Vec<Message>, user::Id>>> for Database {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Message>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let recipient = by.into_inner();
        self.state().messages.retain(|m| m.recipient_id != recipient);
        Ok(())
    }
}
