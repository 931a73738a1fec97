//! [`Listing`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, Utilities},
        Listing,
    },
    infra::{
        database::{
            self,
            postgres::{self, Connection, LikePattern},
            Postgres,
        },
        Database,
    },
    read::listing::list,
};

/// Columns of a joined [`Listing`] row, in the order [`from_row()`]
/// expects.
const COLUMNS: &str = "\
    l.id, l.author_id, \
    l.apartment_name, l.apartment_description, l.listing_description, \
    l.kind, l.lease_start, l.lease_end, \
    l.address, l.place_id, l.parking, \
    l.square_feet, l.num_beds, l.num_baths, l.rent_per_month, \
    l.is_approved, l.is_reviewed, l.is_hidden, l.created_at, \
    u.gas, u.water, u.heat, u.trash, u.sewer, \
    u.electricity, u.internet, u.security, u.cable, u.phone, \
    ARRAY(SELECT a.name FROM listing_amenities a \
          WHERE a.listing_id = l.id \
          ORDER BY a.position) AS amenities, \
    ARRAY(SELECT f.name FROM listing_features f \
          WHERE f.listing_id = l.id \
          ORDER BY f.position) AS features";

/// Tables the [`COLUMNS`] are selected from.
const TABLES: &str = "\
    listings l \
    JOIN listing_utilities u ON u.listing_id = l.id";

/// Builds a [`Listing`] out of a [`COLUMNS`] [`Row`].
fn from_row(row: &Row) -> Listing {
    Listing {
        id: row.get("id"),
        author_id: row.get("author_id"),
        apartment_name: row.get("apartment_name"),
        apartment_description: row.get("apartment_description"),
        listing_description: row.get("listing_description"),
        kind: row.get("kind"),
        lease_start: row.get("lease_start"),
        lease_end: row.get("lease_end"),
        address: row.get("address"),
        place_id: row.get("place_id"),
        parking: row.get("parking"),
        square_feet: row.get("square_feet"),
        num_beds: row.get("num_beds"),
        num_baths: row.get("num_baths"),
        rent_per_month: row.get("rent_per_month"),
        utilities: Utilities {
            gas: row.get("gas"),
            water: row.get("water"),
            heat: row.get("heat"),
            trash: row.get("trash"),
            sewer: row.get("sewer"),
            electricity: row.get("electricity"),
            internet: row.get("internet"),
            security: row.get("security"),
            cable: row.get("cable"),
            phone: row.get("phone"),
        },
        amenities: row.get("amenities"),
        features: row.get("features"),
        is_approved: row.get("is_approved"),
        is_reviewed: row.get("is_reviewed"),
        is_hidden: row.get("is_hidden"),
        created_at: row.get("created_at"),
    }
}

/// `WHERE` clauses over the `listings l` table along with their parameters.
struct Conditions<'p> {
    /// Parameters bound so far.
    params: Vec<&'p (dyn ToSql + Sync)>,

    /// Clauses joined with `AND`.
    clauses: Vec<String>,
}

impl<'p> Conditions<'p> {
    /// Binds the `param`, returning its placeholder index.
    fn bind(&mut self, param: &'p (dyn ToSql + Sync)) -> usize {
        self.params.push(param);
        self.params.len()
    }

    /// Renders the clauses as a `WHERE` condition.
    fn sql(&self) -> String {
        if self.clauses.is_empty() {
            return "TRUE".into();
        }
        self.clauses
            .iter()
            .format_with(" AND ", |c, f| f(&format_args!("({c})")))
            .to_string()
    }
}

/// [`LikePattern`]s of the [`list::Criteria`] substrings.
struct Patterns {
    /// Pattern of the [`list::Criteria::name`].
    name: Option<LikePattern>,

    /// Pattern of the [`list::Criteria::address`].
    address: Option<LikePattern>,
}

impl Patterns {
    /// Prepares [`Patterns`] of the `criteria`.
    fn new(criteria: &list::Criteria) -> Self {
        Self {
            name: criteria.name().map(LikePattern::contains),
            address: criteria.address().map(LikePattern::contains),
        }
    }
}

/// Adds clauses of the `filter` to the `conds`.
fn narrow<'p>(
    conds: &mut Conditions<'p>,
    filter: &'p list::Filter,
    patterns: &'p Patterns,
) {
    let list::Filter { scope, criteria } = filter;

    match scope {
        list::Scope::Published => {
            conds.clauses.push("l.is_approved AND NOT l.is_hidden".into());
        }
        list::Scope::AuthoredBy(author_id) => {
            let idx = conds.bind(author_id);
            conds.clauses.push(format!("l.author_id = ${idx}::UUID"));
        }
        list::Scope::PendingReview => {
            conds.clauses.push("NOT l.is_reviewed".into());
        }
        list::Scope::All => {}
    }

    if let Some(name) = &patterns.name {
        let idx = conds.bind(name);
        conds
            .clauses
            .push(format!("l.apartment_name ILIKE ${idx}::VARCHAR"));
    }
    if let Some(parking) = &criteria.parking {
        let idx = conds.bind(parking);
        conds.clauses.push(format!("l.parking = ${idx}::BOOLEAN"));
    }
    if let Some(beds) = &criteria.num_beds {
        let idx = conds.bind(beds);
        conds.clauses.push(format!("l.num_beds = ${idx}::INT4"));
    }
    if let Some(baths) = &criteria.num_baths {
        let idx = conds.bind(baths);
        conds.clauses.push(format!("l.num_baths = ${idx}::INT4"));
    }
    if let Some(rent) = &criteria.max_rent {
        let idx = conds.bind(rent);
        conds.clauses.push(format!("l.rent_per_month <= ${idx}::INT4"));
    }
    if let Some(address) = &patterns.address {
        let idx = conds.bind(address);
        conds.clauses.push(format!(
            "l.street_number ILIKE ${idx}::VARCHAR \
             OR l.route ILIKE ${idx}::VARCHAR",
        ));
    }
}

impl<C, IDs> Database<Select<By<HashMap<listing::Id, Listing>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[listing::Id]>,
{
    type Ok = HashMap<listing::Id, Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<listing::Id, Listing>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        let ids: &[listing::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM {TABLES} \
             WHERE l.id = ANY($1::UUID[])",
        );
        Ok(self
            .query(&sql, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let listing = from_row(row);
                (listing.id, listing)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Listing>, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM {TABLES} \
             WHERE l.id = $1::UUID",
        );
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Insert<Listing>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(listing)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Listing>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let Listing {
            id,
            author_id,
            apartment_name,
            apartment_description,
            listing_description,
            kind,
            lease_start,
            lease_end,
            address,
            place_id,
            parking,
            square_feet,
            num_beds,
            num_baths,
            rent_per_month,
            utilities,
            amenities,
            features,
            is_approved,
            is_reviewed,
            is_hidden,
            created_at,
        } = listing;
        let street_number = address.street_number();
        let route = address.route();

        const LISTING_SQL: &str = "\
            INSERT INTO listings (\
                id, author_id, \
                apartment_name, apartment_description, listing_description, \
                kind, lease_start, lease_end, \
                address, street_number, route, place_id, parking, \
                square_feet, num_beds, num_baths, rent_per_month, \
                is_approved, is_reviewed, is_hidden, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::TEXT, $5::TEXT, \
                $6::INT2, $7::DATE, $8::DATE, \
                $9::VARCHAR, $10::VARCHAR, $11::VARCHAR, $12::VARCHAR, \
                $13::BOOLEAN, \
                $14::INT4, $15::INT4, $16::INT4, $17::INT4, \
                $18::BOOLEAN, $19::BOOLEAN, $20::BOOLEAN, $21::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET apartment_name = EXCLUDED.apartment_name, \
                apartment_description = EXCLUDED.apartment_description, \
                listing_description = EXCLUDED.listing_description, \
                kind = EXCLUDED.kind, \
                lease_start = EXCLUDED.lease_start, \
                lease_end = EXCLUDED.lease_end, \
                address = EXCLUDED.address, \
                street_number = EXCLUDED.street_number, \
                route = EXCLUDED.route, \
                place_id = EXCLUDED.place_id, \
                parking = EXCLUDED.parking, \
                square_feet = EXCLUDED.square_feet, \
                num_beds = EXCLUDED.num_beds, \
                num_baths = EXCLUDED.num_baths, \
                rent_per_month = EXCLUDED.rent_per_month, \
                is_approved = EXCLUDED.is_approved, \
                is_reviewed = EXCLUDED.is_reviewed, \
                is_hidden = EXCLUDED.is_hidden";
        self.exec(
            LISTING_SQL,
            &[
                &id,
                &author_id,
                &apartment_name,
                &apartment_description,
                &listing_description,
                &kind,
                &lease_start,
                &lease_end,
                &address,
                &street_number,
                &route,
                &place_id,
                &parking,
                &square_feet,
                &num_beds,
                &num_baths,
                &rent_per_month,
                &is_approved,
                &is_reviewed,
                &is_hidden,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())?;

        let Utilities {
            gas,
            water,
            heat,
            trash,
            sewer,
            electricity,
            internet,
            security,
            cable,
            phone,
        } = utilities;

        const UTILITIES_SQL: &str = "\
            INSERT INTO listing_utilities (\
                listing_id, gas, water, heat, trash, sewer, \
                electricity, internet, security, cable, phone\
            ) \
            VALUES (\
                $1::UUID, $2::BOOLEAN, $3::BOOLEAN, $4::BOOLEAN, \
                $5::BOOLEAN, $6::BOOLEAN, $7::BOOLEAN, $8::BOOLEAN, \
                $9::BOOLEAN, $10::BOOLEAN, $11::BOOLEAN\
            ) \
            ON CONFLICT (listing_id) DO UPDATE \
            SET gas = EXCLUDED.gas, \
                water = EXCLUDED.water, \
                heat = EXCLUDED.heat, \
                trash = EXCLUDED.trash, \
                sewer = EXCLUDED.sewer, \
                electricity = EXCLUDED.electricity, \
                internet = EXCLUDED.internet, \
                security = EXCLUDED.security, \
                cable = EXCLUDED.cable, \
                phone = EXCLUDED.phone";
        self.exec(
            UTILITIES_SQL,
            &[
                &id,
                &gas,
                &water,
                &heat,
                &trash,
                &sewer,
                &electricity,
                &internet,
                &security,
                &cable,
                &phone,
            ],
        )
        .await
        .map_err(tracerr::wrap!())?;

        for (table, tags) in [
            ("listing_amenities", &amenities),
            ("listing_features", &features),
        ] {
            let delete = format!(
                "DELETE FROM {table} \
                 WHERE listing_id = $1::UUID",
            );
            self.exec(&delete, &[&id])
                .await
                .map_err(tracerr::wrap!())?;

            let insert = format!(
                "INSERT INTO {table} (listing_id, position, name) \
                 SELECT $1::UUID, t.position::INT4, t.name \
                 FROM unnest($2::VARCHAR[]) \
                      WITH ORDINALITY AS t(name, position)",
            );
            self.exec(&insert, &[&id, tags])
                .await
                .map_err(tracerr::wrap!())?;
        }

        Ok(())
    }
}

impl<C> Database<Lock<By<Listing, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: listing::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO listings_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<list::Connection, list::Selector>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = list::Connection;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::Connection, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Selector { arguments, filter } = by.into_inner();
        let direction = arguments.direction();

        let limit = i64::try_from(arguments.limit())
            .unwrap_or(i64::MAX)
            .saturating_add(1);
        let patterns = Patterns::new(&filter.criteria);

        let mut conds = Conditions {
            params: vec![&limit],
            clauses: vec![],
        };
        narrow(&mut conds, &filter, &patterns);
        if let Some(cursor) = arguments.cursor() {
            let at = conds.bind(&cursor.created_at);
            let id = conds.bind(&cursor.id);
            conds.clauses.push(format!(
                "(l.created_at, l.id) {op} (${at}::TIMESTAMPTZ, ${id}::UUID)",
                op = direction.operator(),
            ));
        }

        let sql = format!(
            "SELECT l.id, l.created_at \
             FROM listings l \
             WHERE {conds} \
             ORDER BY l.created_at {order}, l.id {order} \
             LIMIT $1::INT8",
            conds = conds.sql(),
            order = direction.sql_order(),
        );
        let rows = self
            .query(&sql, conds.params.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows.into_iter().take(arguments.limit()).map(|row| {
            let cursor = list::Cursor {
                created_at: row.get("created_at"),
                id: row.get("id"),
            };
            (cursor, cursor.id)
        });
        Ok(list::Connection::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<list::TotalCount, list::Filter>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let patterns = Patterns::new(&filter.criteria);

        let mut conds = Conditions {
            params: vec![],
            clauses: vec![],
        };
        narrow(&mut conds, &filter, &patterns);

        let sql = format!(
            "SELECT COUNT(*) AS total \
             FROM listings l \
             WHERE {conds}",
            conds = conds.sql(),
        );
        self.query(&sql, conds.params.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .first()
            .map_or(Ok(0_i64), |row| {
                row.try_get("total")
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            })
            .map(list::TotalCount::from)
    }
}
