//! [`Listing`] read models.
//!
//! [`Listing`]: crate::domain::Listing

pub mod list {
    //! Paginated [`Listing`] collections.

    use std::{fmt, str::FromStr};

    use common::{define_pagination, DateTime};
    use derive_more::{From, Into};

    use crate::domain::{listing, user, Listing};

    define_pagination!(Cursor, Node, Filter);

    /// Node of a [`Connection`].
    pub type Node = listing::Id;

    /// Position of a [`Listing`] in a list ordered by creation.
    #[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
    pub struct Cursor {
        /// [`Listing::created_at`].
        pub created_at: listing::CreationDateTime,

        /// [`Listing::id`] breaking ties between equal creation times.
        pub id: listing::Id,
    }

    impl From<&Listing> for Cursor {
        fn from(listing: &Listing) -> Self {
            Self {
                created_at: listing.created_at,
                id: listing.id,
            }
        }
    }

    impl fmt::Display for Cursor {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}_{}", self.created_at.to_rfc3339(), self.id)
        }
    }

    impl FromStr for Cursor {
        type Err = &'static str;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let (created_at, id) =
                s.split_once('_').ok_or("invalid `Cursor` format")?;
            Ok(Self {
                created_at: DateTime::from_rfc3339(created_at)
                    .map_err(|_| "invalid `Cursor` timestamp")?
                    .coerce(),
                id: id.parse().map_err(|_| "invalid `Cursor` ID")?,
            })
        }
    }

    /// Narrowing of a [`Listing`] list.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Subset of [`Listing`]s to look among.
        pub scope: Scope,

        /// Conditions every listed [`Listing`] meets.
        pub criteria: Criteria,
    }

    impl Filter {
        /// Checks whether the `listing` passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, listing: &Listing) -> bool {
            self.scope.includes(listing) && self.criteria.matches(listing)
        }
    }

    /// Base subset of [`Listing`]s.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub enum Scope {
        /// Approved and not hidden [`Listing`]s, shown to everyone.
        #[default]
        Published,

        /// [`Listing`]s of the specified author.
        AuthoredBy(user::Id),

        /// [`Listing`]s not reviewed since their last significant change.
        PendingReview,

        /// Every [`Listing`].
        All,
    }

    impl Scope {
        /// Checks whether the `listing` belongs to this [`Scope`].
        #[must_use]
        pub fn includes(&self, listing: &Listing) -> bool {
            match self {
                Self::Published => listing.is_published(),
                Self::AuthoredBy(id) => listing.author_id == *id,
                Self::PendingReview => !listing.is_reviewed,
                Self::All => true,
            }
        }
    }

    /// Search conditions over [`Listing`] fields.
    ///
    /// Every set condition must hold, unset ones don't constrain anything.
    #[derive(Clone, Debug, Default)]
    pub struct Criteria {
        /// Substring of the apartment name, in any case.
        pub name: Option<String>,

        /// Exact parking availability.
        pub parking: Option<bool>,

        /// Exact number of beds.
        pub num_beds: Option<listing::NumBeds>,

        /// Exact number of bathrooms.
        pub num_baths: Option<listing::NumBaths>,

        /// Inclusive upper bound of the monthly rent.
        pub max_rent: Option<listing::Rent>,

        /// Substring of the street number or the street name, in any case.
        pub address: Option<String>,
    }

    impl Criteria {
        /// Returns the name substring to search for, if any.
        #[must_use]
        pub fn name(&self) -> Option<&str> {
            self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }

        /// Returns the address substring to search for, if any.
        #[must_use]
        pub fn address(&self) -> Option<&str> {
            self.address.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }

        /// Checks whether the `listing` meets these [`Criteria`].
        #[must_use]
        pub fn matches(&self, listing: &Listing) -> bool {
            self.name().map_or(true, |n| {
                listing
                    .apartment_name
                    .as_ref()
                    .to_lowercase()
                    .contains(&n.to_lowercase())
            }) && self.parking.map_or(true, |p| listing.parking == p)
                && self.num_beds.map_or(true, |n| listing.num_beds == n)
                && self.num_baths.map_or(true, |n| listing.num_baths == n)
                && self.max_rent.map_or(true, |r| listing.rent_per_month <= r)
                && self.address().map_or(true, |a| listing.address.mentions(a))
        }
    }

    /// Number of [`Listing`]s passing a [`Filter`].
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i64);

    #[cfg(test)]
    mod spec {
        use crate::{
            domain::{
                listing::{self, Address, ApartmentName},
                user::Role,
                Listing,
            },
            fixture,
        };

        use super::{Criteria, Cursor, Filter, Scope};

        fn listings() -> Vec<Listing> {
            let author = fixture::user(Role::Member);

            let mut first = fixture::approved_listing(&author);
            first.address = Address::new("123 Test Address, City").unwrap();

            let mut second = fixture::approved_listing(&author);
            second.apartment_name = ApartmentName::new("Test2 Apt").unwrap();
            second.address = Address::new("45 Rugby Road").unwrap();
            second.parking = false;
            second.num_beds = listing::NumBeds::new(3).unwrap();
            second.num_baths = listing::NumBaths::new(3).unwrap();
            second.rent_per_month = listing::Rent::new(1500).unwrap();

            let mut third = fixture::listing(&author);
            third.address = Address::new("9 Main St").unwrap();
            third.is_hidden = true;

            vec![first, second, third]
        }

        fn names(criteria: &Criteria, all: &[Listing]) -> Vec<String> {
            all.iter()
                .filter(|l| criteria.matches(l))
                .map(|l| l.address.raw().to_owned())
                .collect()
        }

        #[test]
        fn empty_criteria_keep_everything() {
            let all = listings();

            assert_eq!(names(&Criteria::default(), &all).len(), all.len());
        }

        #[test]
        fn address_matches_number_or_route() {
            let all = listings();
            let by_number = Criteria {
                address: Some("1".into()),
                ..Criteria::default()
            };
            let by_route = Criteria {
                address: Some("rugby".into()),
                ..Criteria::default()
            };

            assert_eq!(names(&by_number, &all), ["123 Test Address, City"]);
            assert_eq!(names(&by_route, &all), ["45 Rugby Road"]);
        }

        #[test]
        fn combines_field_conditions() {
            let all = listings();
            let criteria = Criteria {
                name: Some("TEST".into()),
                parking: Some(true),
                num_beds: listing::NumBeds::new(0),
                num_baths: listing::NumBaths::new(0),
                max_rent: listing::Rent::new(0),
                address: Some("  ".into()),
            };

            assert_eq!(
                names(&criteria, &all),
                ["123 Test Address, City", "9 Main St"],
            );
        }

        #[test]
        fn rent_bound_is_inclusive() {
            let all = listings();
            let criteria = Criteria {
                max_rent: listing::Rent::new(1500),
                ..Criteria::default()
            };

            assert_eq!(names(&criteria, &all).len(), 3);
        }

        #[test]
        fn scopes() {
            let all = listings();
            let author = all[0].author_id;
            let count = |scope| {
                let filter = Filter {
                    scope,
                    criteria: Criteria::default(),
                };
                all.iter().filter(|l| filter.matches(l)).count()
            };

            assert_eq!(count(Scope::Published), 2);
            assert_eq!(count(Scope::PendingReview), 1);
            assert_eq!(count(Scope::AuthoredBy(author)), 3);
            assert_eq!(count(Scope::All), 3);
        }

        #[test]
        fn cursor_roundtrips_through_text() {
            let all = listings();
            let cursor = Cursor::from(&all[0]);

            assert_eq!(cursor.to_string().parse::<Cursor>(), Ok(cursor));
            assert!("garbage".parse::<Cursor>().is_err());
        }
    }
}
