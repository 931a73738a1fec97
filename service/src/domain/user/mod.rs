//! [`User`] of the marketplace and their credentials.

pub mod session;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// Registered marketplace user.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// Display [`Name`] of this [`User`].
    pub name: Name,

    /// [`Login`] this [`User`] signs in with.
    pub login: Login,

    /// [`PasswordHash`] this [`User`] signs in with.
    pub password_hash: PasswordHash,

    /// Optional contact [`Email`].
    pub email: Option<Email>,

    /// [`Role`] of this [`User`] on the platform.
    pub role: Role,

    /// [`DateTime`] this [`User`] registered at.
    pub created_at: CreationDateTime,

    /// [`DateTime`] this [`User`] was removed at, if they were.
    pub deleted_at: Option<DeletionDateTime>,
}

impl User {
    /// Indicates whether this [`User`] may review and moderate any listing.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        self.role == Role::Administrator
    }
}

define_kind! {
    #[doc = "Role of a [`User`]."]
    enum Role {
        #[doc = "Regular user, managing only their own listings."]
        Member = 1,

        #[doc = "User reviewing and moderating listings of everyone."]
        Administrator = 2,
    }
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
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

/// Display name of a [`User`]: up to 150 characters without surrounding
/// whitespace.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Wraps the `name` if it's a valid [`Name`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let valid = !name.is_empty()
            && name.trim() == name
            && name.chars().count() <= 150;
        valid.then_some(Self(name))
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Sign-in login of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Login(String);

impl Login {
    /// Wraps the `login` if it's a valid [`Login`].
    #[must_use]
    pub fn new(login: impl Into<String>) -> Option<Self> {
        /// Letters, digits and `@.+-_`, from 2 to 150 characters.
        static FORMAT: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[\p{L}\p{N}@.+\-_]{2,150}$").expect("valid regex")
        });

        let login = login.into();
        FORMAT.is_match(&login).then_some(Self(login))
    }
}

impl FromStr for Login {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Login`")
    }
}

/// Plain text password of a [`User`], from 8 to 128 bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Wraps the `password` if it's a valid [`Password`].
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        (8..=128)
            .contains(&password.len())
            .then_some(Self(password))
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Stored form of a [`Password`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Derives the [`PasswordHash`] of the `password`.
    #[must_use]
    pub fn new(password: &Password) -> Self {
        // TODO: Switch to `argon2` together with rehashing stored values.
        Self(password.0.clone())
    }
}

/// Contact email of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Wraps the `address` if it looks like an [`Email`].
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        /// Local part, `@` and a dotted domain, without whitespace.
        static FORMAT: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("valid regex")
        });

        let address = address.into();
        (address.len() <= 254 && FORMAT.is_match(&address))
            .then_some(Self(address))
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was deleted.
pub type DeletionDateTime = DateTimeOf<(User, unit::Deletion)>;

#[cfg(test)]
mod spec {
    use super::{Email, Login, Name, Password};

    #[test]
    fn validates_credentials() {
        assert!(Login::new("jane.doe").is_some());
        assert!(Login::new("jane doe").is_none());
        assert!(Login::new("j").is_none());

        assert!(Password::new("secret12").is_some());
        assert!(Password::new("short").is_none());

        assert!(Email::new("jane@example.com").is_some());
        assert!(Email::new("jane@localhost").is_none());
        assert!(Email::new("jane @example.com").is_none());

        assert!(Name::new("Jane Doe").is_some());
        assert!(Name::new(" Jane").is_none());
        assert!(Name::new("").is_none());
    }
}
