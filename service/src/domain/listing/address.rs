//! [`Address`] of a [`Listing`].
//!
//! [`Listing`]: super::Listing

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::sync::LazyLock;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use regex::Regex;

/// Free-form street address typed by an author, along with the components
/// recognized in it.
///
/// Two [`Address`]es are equal whenever their raw texts are equal.
#[derive(Clone, Debug, Display)]
#[display("{raw}")]
pub struct Address {
    /// Address as it was entered, without surrounding whitespace.
    raw: String,

    /// Leading house number, like `123` or `12B`.
    street_number: Option<String>,

    /// Street name following the [`Address::street_number`], up to the first
    /// comma.
    route: Option<String>,
}

impl Address {
    /// Maximum length of a raw [`Address`], in characters.
    pub const MAX_LEN: usize = 500;

    /// Parses the `raw` address, trimming surrounding whitespace.
    ///
    /// [`None`] is returned if it's blank or too long.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        /// Optional leading number, then everything up to the first comma.
        static PARTS: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\s*(?:(?<number>\d[\w-]*)\s+)?(?<route>[^,]*)")
                .expect("valid regex")
        });

        let raw = raw.into().trim().to_owned();
        if raw.is_empty() || raw.chars().count() > Self::MAX_LEN {
            return None;
        }

        let (street_number, route) = PARTS.captures(&raw).map_or(
            (None, None),
            |caps| {
                let number = caps.name("number").map(|m| m.as_str().to_owned());
                let route = caps
                    .name("route")
                    .map(|m| m.as_str().trim())
                    .filter(|r| !r.is_empty())
                    .map(ToOwned::to_owned);
                (number, route)
            },
        );

        Some(Self {
            raw,
            street_number,
            route,
        })
    }

    /// Returns the raw text of this [`Address`].
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the house number, if recognized.
    #[must_use]
    pub fn street_number(&self) -> Option<&str> {
        self.street_number.as_deref()
    }

    /// Returns the street name, if recognized.
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Checks whether the house number or the street name contains the
    /// `needle`, ignoring case.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [self.street_number(), self.route()]
            .into_iter()
            .flatten()
            .any(|part| part.to_lowercase().contains(&needle))
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Address {}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Address {
    accepts!(TEXT, VARCHAR);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        let raw = String::from_sql(ty, raw)?;
        Self::new(raw).ok_or_else(|| "invalid `Address`".into())
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Address {
    accepts!(TEXT, VARCHAR);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.raw.to_sql(ty, w)
    }
}

#[cfg(test)]
mod spec {
    use super::Address;

    #[test]
    fn splits_number_and_route() {
        let addr = Address::new("1827 University Ave, Charlottesville, VA")
            .unwrap();

        assert_eq!(addr.street_number(), Some("1827"));
        assert_eq!(addr.route(), Some("University Ave"));
        assert_eq!(addr.raw(), "1827 University Ave, Charlottesville, VA");
    }

    #[test]
    fn route_without_number() {
        let addr = Address::new("Rugby Road").unwrap();

        assert_eq!(addr.street_number(), None);
        assert_eq!(addr.route(), Some("Rugby Road"));
    }

    #[test]
    fn rejects_blank() {
        assert!(Address::new("   ").is_none());
        assert!(Address::new("x".repeat(Address::MAX_LEN + 1)).is_none());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let addr = Address::new("  10 Main St, Springfield \n").unwrap();

        assert_eq!(addr.raw(), "10 Main St, Springfield");
        assert_eq!(addr, Address::new("10 Main St, Springfield").unwrap());
    }

    #[test]
    fn compares_by_raw_text() {
        let a = Address::new("10 Main St").unwrap();

        assert_eq!(a, Address::new("10 Main St").unwrap());
        assert_ne!(a, Address::new("10 Main St.").unwrap());
    }

    #[test]
    fn mentions_number_or_route() {
        let addr = Address::new("123 Test Address, City").unwrap();

        assert!(addr.mentions("1"));
        assert!(addr.mentions("test ADDRESS"));
        assert!(!addr.mentions("City"));
        assert!(!addr.mentions("9"));
    }
}
