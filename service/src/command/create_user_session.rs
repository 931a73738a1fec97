//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::{
    domain::user::{session::Token, Login, Password},
    Config,
};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Clone, Debug, From)]
pub enum CreateUserSession {
    /// Sign in with [`User`] credentials.
    ByCredentials {
        /// [`Login`] of a [`User`].
        login: user::Login,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Prolong a [`Session`] of the [`User`] with the ID.
    ByUserId(user::Id),
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] the [`Session`] is created for.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires, after
    /// [`Config::session_ttl`].
    pub expires_at: session::ExpirationDateTime,
}

impl<Db, Geo> Command<CreateUserSession> for Service<Db, Geo>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Login>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { login, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(&login)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;
                if user.password_hash
                    != user::PasswordHash::new(password.expose_secret())
                {
                    return Err(tracerr::new!(E::WrongCredentials));
                }
                user
            }
            Cmd::ByUserId(id) => self
                .database()
                .execute(Select(By::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(id))
                .map_err(tracerr::wrap!())?,
        };

        let expires_at = (DateTime::now() + self.config().session_ttl).coerce();
        let encoded = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                expires_at,
            },
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: Produced by encoding a `Session` right above.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(encoded) };

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`CreateUserSession::ByCredentials`] don't match any [`User`].
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, DateTime};
    use secrecy::SecretBox;

    use crate::{
        command::Command as _,
        domain::user::{self, Role},
        fixture,
        infra::Database as _,
    };

    use super::{CreateUserSession, ExecutionError};

    #[tokio::test]
    async fn expires_after_configured_ttl() {
        let service = fixture::service();
        let user = fixture::user(Role::Member);
        service.database().execute(Insert(user.clone())).await.unwrap();
        let before = DateTime::now();

        let out = service
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap();

        let ttl = out.expires_at.coerce::<()>() - before;
        assert!(ttl <= service.config().session_ttl);
        assert!(ttl.as_secs() >= 59);
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let service = fixture::service();
        let user = fixture::user(Role::Member);
        service.database().execute(Insert(user.clone())).await.unwrap();

        let err = service
            .execute(CreateUserSession::ByCredentials {
                login: user.login,
                password: SecretBox::new(Box::new(
                    user::Password::new("wrong-password").unwrap(),
                )),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }
}
