//! [`Listing`]-related definitions.

use std::future;

use common::{Date, DateTime};
use derive_more::{Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLObject,
    GraphQLScalar,
};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, AsError, Context, Error};

/// An apartment offered for rent.
#[derive(Clone, Debug, From)]
pub struct Listing {
    /// ID of this [`Listing`].
    id: Id,

    /// Underlying [`domain::Listing`].
    listing: OnceCell<domain::Listing>,
}

impl From<domain::Listing> for Listing {
    fn from(listing: domain::Listing) -> Self {
        Self {
            id: listing.id.into(),
            listing: OnceCell::new_with(Some(listing)),
        }
    }
}

impl Listing {
    /// Creates a new [`Listing`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Listing`] with the provided ID exists and
    /// may be seen by the current `User`, otherwise accessing this
    /// [`Listing`] will result with an error or a disclosure.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            listing: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Listing`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Listing`] doesn't exist.
    async fn listing(&self, ctx: &Context) -> Result<&domain::Listing, Error> {
        let id = self.id.into();
        self.listing
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::listing::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|l| {
                        future::ready(l.ok_or_else(|| {
                            api::query::ListingError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// An apartment offered for rent.
#[graphql_object(context = Context)]
impl Listing {
    /// Unique identifier of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `User` who created this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.author",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn author(&self, ctx: &Context) -> Result<api::User, Error> {
        let author_id = self.listing(ctx).await?.author_id;
        #[expect(
            unsafe_code,
            reason = "`Listing` author is guaranteed to exist by the database"
        )]
        let author = unsafe { api::User::new_unchecked(author_id) };
        Ok(author)
    }

    /// Name of the apartment.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.apartmentName",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn apartment_name(&self, ctx: &Context) -> Result<String, Error> {
        Ok(self.listing(ctx).await?.apartment_name.to_string())
    }

    /// Description of the apartment itself.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.apartmentDescription",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn apartment_description(
        &self,
        ctx: &Context,
    ) -> Result<String, Error> {
        Ok(self.listing(ctx).await?.apartment_description.to_string())
    }

    /// Description of the offer.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.listingDescription",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn listing_description(
        &self,
        ctx: &Context,
    ) -> Result<String, Error> {
        Ok(self.listing(ctx).await?.listing_description.to_string())
    }

    /// Kind of the offer.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.kind",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn kind(&self, ctx: &Context) -> Result<Kind, Error> {
        Ok(self.listing(ctx).await?.kind.into())
    }

    /// Human-readable label of the `kind`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.kindLabel",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn kind_label(&self, ctx: &Context) -> Result<String, Error> {
        Ok(self.listing(ctx).await?.kind.label().to_owned())
    }

    /// First day of the lease.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.leaseStart",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn lease_start(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.listing(ctx).await?.lease_start)
    }

    /// Last day of the lease.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.leaseEnd",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn lease_end(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.listing(ctx).await?.lease_end)
    }

    /// Street address of the apartment, as it was entered.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.address",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn address(&self, ctx: &Context) -> Result<String, Error> {
        Ok(self.listing(ctx).await?.address.raw().to_owned())
    }

    /// Identifier of the place the `address` resolves to.
    ///
    /// `null` if the address couldn't be resolved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.placeId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn place_id(
        &self,
        ctx: &Context,
    ) -> Result<Option<String>, Error> {
        let place_id = &self.listing(ctx).await?.place_id;
        Ok((!place_id.is_empty()).then(|| place_id.to_string()))
    }

    /// Position of the apartment on a map.
    ///
    /// `null` if the `address` can't be located right now.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.coordinates",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn coordinates(
        &self,
        ctx: &Context,
    ) -> Result<Option<Coordinates>, Error> {
        let address = self.listing(ctx).await?.address.clone();
        Ok(ctx
            .service()
            .execute(query::place::Coordinates::by(address))
            .await
            .map_err(|e| {
                tracing::warn!(
                    "failed to locate `Listing(id: {})`: {e}",
                    self.id,
                );
            })
            .ok()
            .flatten()
            .map(Into::into))
    }

    /// URLs of the photos of the place the apartment is located at.
    ///
    /// Empty if there are none or they can't be fetched right now.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.photoUrls",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn photo_urls(
        &self,
        ctx: &Context,
    ) -> Result<Vec<String>, Error> {
        let place_id = self.listing(ctx).await?.place_id.clone();
        if place_id.is_empty() {
            return Ok(Vec::new());
        }
        Ok(ctx
            .service()
            .execute(query::place::Photos::by(place_id))
            .await
            .map_err(|e| {
                tracing::warn!(
                    "failed to fetch photos of `Listing(id: {})`: {e}",
                    self.id,
                );
            })
            .unwrap_or_default()
            .into_iter()
            .map(|url| url.to_string())
            .collect())
    }

    /// Indicator whether a parking spot comes with the apartment.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.parking",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn parking(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.listing(ctx).await?.parking)
    }

    /// Area of the apartment, in square feet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.squareFeet",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn square_feet(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.listing(ctx).await?.square_feet.get())
    }

    /// Number of beds.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.numBeds",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn num_beds(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.listing(ctx).await?.num_beds.get())
    }

    /// Number of bathrooms.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.numBaths",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn num_baths(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.listing(ctx).await?.num_baths.get())
    }

    /// Monthly rent, in whole dollars.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.rentPerMonth",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn rent_per_month(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.listing(ctx).await?.rent_per_month.get())
    }

    /// Utilities included into the rent.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.utilities",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn utilities(&self, ctx: &Context) -> Result<Utilities, Error> {
        Ok(self.listing(ctx).await?.utilities.into())
    }

    /// Labels of the utilities included into the rent.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.providedUtilities",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn provided_utilities(
        &self,
        ctx: &Context,
    ) -> Result<Vec<String>, Error> {
        Ok(self
            .listing(ctx)
            .await?
            .utilities
            .provided()
            .into_iter()
            .map(ToOwned::to_owned)
            .collect())
    }

    /// Community amenities, in the entered order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.amenities",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn amenities(
        &self,
        ctx: &Context,
    ) -> Result<Vec<String>, Error> {
        Ok(self
            .listing(ctx)
            .await?
            .amenities
            .iter()
            .map(ToString::to_string)
            .collect())
    }

    /// Apartment features, in the entered order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.features",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn features(
        &self,
        ctx: &Context,
    ) -> Result<Vec<String>, Error> {
        Ok(self
            .listing(ctx)
            .await?
            .features
            .iter()
            .map(ToString::to_string)
            .collect())
    }

    /// Indicator whether an administrator approved this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.isApproved",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_approved(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.listing(ctx).await?.is_approved)
    }

    /// Indicator whether an administrator reviewed this `Listing` since its
    /// last significant change.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.isReviewed",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_reviewed(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.listing(ctx).await?.is_reviewed)
    }

    /// Indicator whether the author hides this `Listing` from the public.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.isHidden",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_hidden(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.listing(ctx).await?.is_hidden)
    }

    /// Review status of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.listing(ctx).await?.status().into())
    }

    /// `DateTime` when this `Listing` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.listing(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Listing`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::listing::Id)]
#[into(domain::listing::Id)]
#[graphql(name = "ListingId", transparent)]
pub struct Id(Uuid);

/// Kind of an offer a `Listing` makes.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ListingKind")]
pub enum Kind {
    /// Sublet for the summer.
    SubletSummer,

    /// Sublet for the winter.
    SubletWinter,

    /// Lease handed over to a new tenant.
    LeaseTakeover,

    /// Sublet for an arbitrary term.
    Sublet,

    /// Roommate search.
    Roommate,

    /// Direct lease.
    Lease,
}

impl From<domain::listing::Kind> for Kind {
    fn from(kind: domain::listing::Kind) -> Self {
        use domain::listing::Kind as K;

        match kind {
            K::SubletSummer => Self::SubletSummer,
            K::SubletWinter => Self::SubletWinter,
            K::LeaseTakeover => Self::LeaseTakeover,
            K::Sublet => Self::Sublet,
            K::Roommate => Self::Roommate,
            K::Lease => Self::Lease,
        }
    }
}

impl From<Kind> for domain::listing::Kind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::SubletSummer => Self::SubletSummer,
            Kind::SubletWinter => Self::SubletWinter,
            Kind::LeaseTakeover => Self::LeaseTakeover,
            Kind::Sublet => Self::Sublet,
            Kind::Roommate => Self::Roommate,
            Kind::Lease => Self::Lease,
        }
    }
}

/// Review status of a `Listing`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ListingStatus")]
pub enum Status {
    /// Approved by an administrator.
    Approved,

    /// Reviewed, but not approved.
    Rejected,

    /// Not reviewed since the last significant change.
    AwaitingReview,
}

impl From<domain::listing::Status> for Status {
    fn from(status: domain::listing::Status) -> Self {
        use domain::listing::Status as S;

        match status {
            S::Approved => Self::Approved,
            S::Rejected => Self::Rejected,
            S::AwaitingReview => Self::AwaitingReview,
        }
    }
}

/// Position of a `Listing` on a map.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "ListingCoordinates")]
pub struct Coordinates {
    /// Latitude, in degrees.
    pub latitude: f64,

    /// Longitude, in degrees.
    pub longitude: f64,
}

impl From<service::infra::geocoder::Coordinates> for Coordinates {
    fn from(point: service::infra::geocoder::Coordinates) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// Utilities included into the rent of a `Listing`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[expect(clippy::struct_excessive_bools, reason = "independent flags")]
#[graphql(name = "ListingUtilities")]
pub struct Utilities {
    /// Gas.
    pub gas: bool,

    /// Water.
    pub water: bool,

    /// Heat.
    pub heat: bool,

    /// Trash.
    pub trash: bool,

    /// Sewer.
    pub sewer: bool,

    /// Electricity.
    pub electricity: bool,

    /// Internet.
    pub internet: bool,

    /// Security.
    pub security: bool,

    /// Cable.
    pub cable: bool,

    /// Phone.
    pub phone: bool,
}

impl From<domain::listing::Utilities> for Utilities {
    fn from(u: domain::listing::Utilities) -> Self {
        Self {
            gas: u.gas,
            water: u.water,
            heat: u.heat,
            trash: u.trash,
            sewer: u.sewer,
            electricity: u.electricity,
            internet: u.internet,
            security: u.security,
            cable: u.cable,
            phone: u.phone,
        }
    }
}

/// Utilities included into the rent of a `Listing`, as entered by its
/// author.
///
/// Omitted ones are considered not included.
#[derive(Clone, Copy, Debug, Default, GraphQLInputObject)]
#[expect(clippy::struct_excessive_bools, reason = "independent flags")]
#[graphql(name = "ListingUtilitiesInput")]
pub struct UtilitiesInput {
    /// Gas.
    #[graphql(default)]
    pub gas: bool,

    /// Water.
    #[graphql(default)]
    pub water: bool,

    /// Heat.
    #[graphql(default)]
    pub heat: bool,

    /// Trash.
    #[graphql(default)]
    pub trash: bool,

    /// Sewer.
    #[graphql(default)]
    pub sewer: bool,

    /// Electricity.
    #[graphql(default)]
    pub electricity: bool,

    /// Internet.
    #[graphql(default)]
    pub internet: bool,

    /// Security.
    #[graphql(default)]
    pub security: bool,

    /// Cable.
    #[graphql(default)]
    pub cable: bool,

    /// Phone.
    #[graphql(default)]
    pub phone: bool,
}

impl From<UtilitiesInput> for domain::listing::Utilities {
    fn from(u: UtilitiesInput) -> Self {
        Self {
            gas: u.gas,
            water: u.water,
            heat: u.heat,
            trash: u.trash,
            sewer: u.sewer,
            electricity: u.electricity,
            internet: u.internet,
            security: u.security,
            cable: u.cable,
            phone: u.phone,
        }
    }
}

/// Author-editable content of a `Listing`.
///
/// The whole content is submitted on every change.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "ListingInput")]
pub struct Input {
    /// Name of the apartment, from 1 to 100 characters.
    pub apartment_name: String,

    /// Non-blank description of the apartment itself.
    pub apartment_description: String,

    /// Non-blank description of the offer.
    pub listing_description: String,

    /// Kind of the offer.
    pub kind: Kind,

    /// First day of the lease.
    pub lease_start: Date,

    /// Last day of the lease.
    pub lease_end: Date,

    /// Non-blank street address of the apartment.
    pub address: String,

    /// Indicator whether a parking spot comes with the apartment.
    #[graphql(default)]
    pub parking: bool,

    /// Non-negative area of the apartment, in square feet.
    pub square_feet: i32,

    /// Non-negative number of beds.
    pub num_beds: i32,

    /// Non-negative number of bathrooms.
    pub num_baths: i32,

    /// Non-negative monthly rent, in whole dollars.
    pub rent_per_month: i32,

    /// Indicator whether the `Listing` is hidden from the public.
    #[graphql(default)]
    pub is_hidden: bool,

    /// Utilities included into the rent.
    #[graphql(default)]
    pub utilities: UtilitiesInput,

    /// Community amenities, each from 1 to 50 characters.
    #[graphql(default)]
    pub amenities: Vec<String>,

    /// Apartment features, each from 1 to 50 characters.
    #[graphql(default)]
    pub features: Vec<String>,
}

impl Input {
    /// Validates this [`Input`] into a [`domain::listing::Draft`].
    ///
    /// # Errors
    ///
    /// With `INVALID_LISTING` code, naming every invalid field.
    pub fn into_draft(self) -> Result<domain::listing::Draft, Error> {
        domain::listing::Form::from(self)
            .validate()
            .map_err(AsError::into_error)
    }
}

impl From<Input> for domain::listing::Form {
    fn from(input: Input) -> Self {
        let Input {
            apartment_name,
            apartment_description,
            listing_description,
            kind,
            lease_start,
            lease_end,
            address,
            parking,
            square_feet,
            num_beds,
            num_baths,
            rent_per_month,
            is_hidden,
            utilities,
            amenities,
            features,
        } = input;
        Self {
            apartment_name,
            apartment_description,
            listing_description,
            kind: kind.into(),
            lease_start,
            lease_end,
            address,
            parking,
            square_feet,
            num_beds,
            num_baths,
            rent_per_month,
            is_hidden,
            utilities: utilities.into(),
            amenities,
            features,
        }
    }
}

/// Result of a `Listing` update.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context, name = "UpdateListingResult")]
pub struct UpdateResult {
    /// Updated `Listing`.
    pub listing: Listing,

    /// Names of the changed fields, in `snake_case`.
    pub changed_fields: Vec<String>,

    /// Indicator whether the update sent the `Listing` back to review.
    pub review_required: bool,
}

impl From<service::command::update_listing::Output> for UpdateResult {
    fn from(output: service::command::update_listing::Output) -> Self {
        let service::command::update_listing::Output { listing, changed } =
            output;
        Self {
            listing: listing.into(),
            review_required: changed.iter().any(|f| f.requires_review()),
            changed_fields: changed.iter().map(ToString::to_string).collect(),
        }
    }
}

pub mod list {
    //! Definitions related to [`Listing`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLInputObject, GraphQLScalar};
    use service::{domain, query, read::listing::list, Query as _};

    use crate::{api::scalar, define_error, AsError, Context, Error};

    use super::Listing;

    /// Cursor for the `Listing` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[graphql(
        name = "ListingListCursor",
        with = scalar::Via::<list::Cursor>,
    )]
    pub struct Cursor(list::Cursor);

    /// Conditions narrowing the `Listing` list.
    ///
    /// Every provided condition must hold.
    #[derive(Clone, Debug, Default, GraphQLInputObject)]
    #[graphql(name = "ListingFilter")]
    pub struct Filter {
        /// Substring of the apartment name, in any case.
        pub name: Option<String>,

        /// Exact parking availability.
        pub parking: Option<bool>,

        /// Exact number of beds.
        pub num_beds: Option<i32>,

        /// Exact number of bathrooms.
        pub num_baths: Option<i32>,

        /// Inclusive upper bound of the monthly rent.
        pub max_rent: Option<i32>,

        /// Substring of the street number or the street name, in any case.
        pub address: Option<String>,
    }

    impl Filter {
        /// Converts this [`Filter`] into [`list::Criteria`].
        ///
        /// # Errors
        ///
        /// With `INVALID_LISTING_FILTER` code, naming every negative number.
        pub fn into_criteria(self) -> Result<list::Criteria, Error> {
            define_error! {
                enum FilterError {
                    #[code = "INVALID_LISTING_FILTER"]
                    #[status = BAD_REQUEST]
                    #[message = "Provided `ListingFilter` numbers must not \
                                 be negative"]
                    Negative,
                }
            }

            /// Checks the optional number, remembering the `field` if it's
            /// invalid.
            fn check<T>(
                invalid: &mut Vec<&'static str>,
                field: &'static str,
                value: Option<i32>,
                new: fn(i32) -> Option<T>,
            ) -> Option<T> {
                let value = value?;
                let checked = new(value);
                if checked.is_none() {
                    invalid.push(field);
                }
                checked
            }

            let Self {
                name,
                parking,
                num_beds,
                num_baths,
                max_rent,
                address,
            } = self;

            let mut invalid = Vec::new();
            let criteria = list::Criteria {
                name,
                parking,
                num_beds: check(
                    &mut invalid,
                    "num_beds",
                    num_beds,
                    domain::listing::NumBeds::new,
                ),
                num_baths: check(
                    &mut invalid,
                    "num_baths",
                    num_baths,
                    domain::listing::NumBaths::new,
                ),
                max_rent: check(
                    &mut invalid,
                    "max_rent",
                    max_rent,
                    domain::listing::Rent::new,
                ),
                address,
            };

            if invalid.is_empty() {
                Ok(criteria)
            } else {
                Err(Error::from(FilterError::Negative).with_fields(invalid))
            }
        }
    }

    /// Edge in the [`Listing`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(list::Edge);

    /// Edge in the `Listing` list.
    #[graphql_object(name = "ListingListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `ListingListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `ListingListEdge`.
        #[must_use]
        pub fn node(&self) -> Listing {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees \
                          `Listing` existence and visibility"
            )]
            unsafe {
                Listing::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`Listing`] list.
    #[derive(Clone, Debug)]
    pub struct Connection {
        /// Fetched page.
        page: list::Connection,

        /// [`list::Filter`] the page was fetched with.
        filter: list::Filter,
    }

    impl Connection {
        /// Wraps the `page` fetched with the `filter`.
        #[must_use]
        pub fn new(page: list::Connection, filter: list::Filter) -> Self {
            Self { page, filter }
        }
    }

    /// Connection of the `Listing` list.
    #[graphql_object(name = "ListingListConnection", context = Context)]
    impl Connection {
        /// Edges in this `ListingListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.page.edges.iter().copied().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.page.page_info(),
                filter: self.filter.clone(),
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Debug)]
    pub struct PageInfo {
        /// Underlying [`list::PageInfo`].
        info: list::PageInfo,

        /// [`list::Filter`] the page was fetched with.
        filter: list::Filter,
    }

    /// Information about a `ListingListConnection` page.
    #[graphql_object(name = "ListingListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> Option<Cursor> {
            self.info.start_cursor.map(Into::into)
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> Option<Cursor> {
            self.info.end_cursor.map(Into::into)
        }

        /// Total count of the `Listing`s passing the filter.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            ctx.service()
                .execute(query::listings::TotalCount::by(self.filter.clone()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(|count| {
                    i32::try_from(i64::from(count)).unwrap_or(i32::MAX)
                })
        }
    }

    #[cfg(test)]
    mod spec {
        use super::Filter;

        #[test]
        fn empty_filter_has_no_constraints() {
            let criteria = Filter::default().into_criteria().unwrap();

            assert!(criteria.name().is_none());
            assert!(criteria.address().is_none());
            assert!(criteria.num_beds.is_none());
            assert!(criteria.max_rent.is_none());
        }

        #[test]
        fn keeps_provided_conditions() {
            let criteria = Filter {
                name: Some("Loft".into()),
                parking: Some(true),
                num_beds: Some(2),
                max_rent: Some(0),
                ..Filter::default()
            }
            .into_criteria()
            .unwrap();

            assert_eq!(criteria.name(), Some("Loft"));
            assert_eq!(criteria.parking, Some(true));
            assert_eq!(criteria.num_beds.map(|n| n.get()), Some(2));
            assert_eq!(criteria.max_rent.map(|r| r.get()), Some(0));
        }

        #[test]
        fn rejects_negative_numbers() {
            let err = Filter {
                num_beds: Some(-1),
                num_baths: Some(1),
                max_rent: Some(-500),
                ..Filter::default()
            }
            .into_criteria()
            .unwrap_err();

            assert_eq!(err.code, "INVALID_LISTING_FILTER");
            assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
            assert_eq!(err.fields, ["num_beds", "max_rent"]);
        }
    }
}
