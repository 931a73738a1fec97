//! [Google Maps Platform] [`Geocoder`] implementation.
//!
//! [Google Maps Platform]: https://developers.google.com/maps/documentation

use std::time::Duration;

use common::operations::{By, Resolve};
use derive_more::{Display, Error as StdError, From};
use reqwest::Client;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use smart_default::SmartDefault;
use tracerr::Traced;

use crate::{
    domain::listing,
    infra::{
        geocoder::{self, Coordinates, PhotoUrl},
        Geocoder,
    },
};

/// [`GoogleMaps`] configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// API key the requests are authorized with.
    #[default(String::new().into())]
    pub api_key: SecretString,

    /// Base URL of the web services.
    #[default("https://maps.googleapis.com/maps/api".into())]
    pub base_url: String,

    /// Timeout of a single request.
    #[default(Duration::from_secs(5))]
    pub timeout: Duration,

    /// Maximum width of the photos to link, in pixels.
    #[default(400)]
    pub photo_max_width: u16,
}

/// [`Geocoder`] backed by the Google Maps web services.
#[derive(Clone, Debug)]
pub struct GoogleMaps {
    /// HTTP client performing the requests.
    client: Client,

    /// Base URL of the web services, without a trailing slash.
    base_url: String,

    /// API key the requests are authorized with.
    api_key: SecretString,

    /// Maximum width of the photos to link, in pixels.
    photo_max_width: u16,
}

impl GoogleMaps {
    /// Creates a new [`GoogleMaps`] client.
    ///
    /// # Errors
    ///
    /// If the underlying HTTP client fails to initialize.
    pub fn new(conf: Config) -> Result<Self, Traced<geocoder::Error>> {
        let client = Client::builder()
            .timeout(conf.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self {
            client,
            base_url: conf.base_url.trim_end_matches('/').to_owned(),
            api_key: conf.api_key,
            photo_max_width: conf.photo_max_width,
        })
    }

    /// Prepares a request to the `endpoint` with the `params` and the API
    /// key.
    fn request(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/{endpoint}", self.base_url))
            .query(params)
            .query(&[("key", self.api_key.expose_secret())])
    }

    /// Requests the `endpoint` and decodes its JSON response.
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, Traced<Error>> {
        let body = self
            .request(endpoint, params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(tracerr::from_and_wrap!(=> Error))?
            .bytes()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        serde_json::from_slice(&body).map_err(tracerr::from_and_wrap!(=> Error))
    }
}

/// Error of a [`GoogleMaps`] request.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Request failed.
    #[display("Request failed: {_0}")]
    Request(reqwest::Error),

    /// Response is not the expected JSON.
    #[display("Malformed response: {_0}")]
    Decode(serde_json::Error),
}

/// Status every response carries. Anything but `OK` means no results.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Status {
    /// Results are present.
    Ok,

    /// Any other status, like `ZERO_RESULTS` or `REQUEST_DENIED`.
    #[serde(other)]
    NotOk,
}

/// Response of the `place/findplacefromtext` endpoint.
#[derive(Debug, Deserialize)]
struct FindPlace {
    /// Response [`Status`].
    status: Status,

    /// Places matching the input.
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Place matching a text query.
#[derive(Debug, Deserialize)]
struct Candidate {
    /// ID of the place.
    place_id: String,
}

/// Response of the `geocode` endpoint.
#[derive(Debug, Deserialize)]
struct Geocode {
    /// Response [`Status`].
    status: Status,

    /// Locations matching the address.
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

/// Location matching an address.
#[derive(Debug, Deserialize)]
struct GeocodeResult {
    /// Geometry of the location.
    geometry: Geometry,
}

/// Geometry of a location.
#[derive(Debug, Deserialize)]
struct Geometry {
    /// Representative point of the location.
    location: LatLng,
}

/// Geographic point.
#[derive(Clone, Copy, Debug, Deserialize)]
struct LatLng {
    /// Latitude.
    lat: f64,

    /// Longitude.
    lng: f64,
}

/// Response of the `place/details` endpoint.
#[derive(Debug, Deserialize)]
struct Details {
    /// Response [`Status`].
    status: Status,

    /// Details of the place.
    result: Option<Place>,
}

/// Details of a place.
#[derive(Debug, Deserialize)]
struct Place {
    /// Photos of the place.
    #[serde(default)]
    photos: Vec<Photo>,
}

/// Photo of a place.
#[derive(Debug, Deserialize)]
struct Photo {
    /// Reference to fetch the photo by.
    photo_reference: String,
}

impl Geocoder<Resolve<By<listing::PlaceId, listing::Address>>> for GoogleMaps {
    type Ok = listing::PlaceId;
    type Err = Traced<geocoder::Error>;

    async fn execute(
        &self,
        Resolve(by): Resolve<By<listing::PlaceId, listing::Address>>,
    ) -> Result<Self::Ok, Self::Err> {
        let address = by.into_inner();

        let resp: FindPlace = self
            .get(
                "place/findplacefromtext/json",
                &[
                    ("input", address.raw()),
                    ("inputtype", "textquery"),
                    ("fields", "place_id"),
                ],
            )
            .await
            .map_err(tracerr::map_from_and_wrap!(=> geocoder::Error))?;
        if resp.status != Status::Ok {
            return Ok(listing::PlaceId::default());
        }

        Ok(resp
            .candidates
            .into_iter()
            .next()
            .map(|c| c.place_id.into())
            .unwrap_or_default())
    }
}

impl Geocoder<Resolve<By<Option<Coordinates>, listing::Address>>>
    for GoogleMaps
{
    type Ok = Option<Coordinates>;
    type Err = Traced<geocoder::Error>;

    async fn execute(
        &self,
        Resolve(by): Resolve<By<Option<Coordinates>, listing::Address>>,
    ) -> Result<Self::Ok, Self::Err> {
        let address = by.into_inner();

        let resp: Geocode = self
            .get("geocode/json", &[("address", address.raw())])
            .await
            .map_err(tracerr::map_from_and_wrap!(=> geocoder::Error))?;
        if resp.status != Status::Ok {
            return Ok(None);
        }

        Ok(resp.results.first().map(|r| Coordinates {
            latitude: r.geometry.location.lat,
            longitude: r.geometry.location.lng,
        }))
    }
}

impl Geocoder<Resolve<By<Vec<PhotoUrl>, listing::PlaceId>>> for GoogleMaps {
    type Ok = Vec<PhotoUrl>;
    type Err = Traced<geocoder::Error>;

    async fn execute(
        &self,
        Resolve(by): Resolve<By<Vec<PhotoUrl>, listing::PlaceId>>,
    ) -> Result<Self::Ok, Self::Err> {
        let place_id = by.into_inner();
        if place_id.is_empty() {
            return Ok(Vec::new());
        }

        let resp: Details = self
            .get(
                "place/details/json",
                &[("fields", "photos"), ("place_id", place_id.as_ref())],
            )
            .await
            .map_err(tracerr::map_from_and_wrap!(=> geocoder::Error))?;
        if resp.status != Status::Ok {
            return Ok(Vec::new());
        }

        let max_width = self.photo_max_width.to_string();
        resp.result
            .into_iter()
            .flat_map(|p| p.photos)
            .map(|photo| {
                self.request(
                    "place/photo",
                    &[
                        ("maxwidth", max_width.as_str()),
                        ("photo_reference", photo.photo_reference.as_str()),
                    ],
                )
                .build()
                .map(|req| PhotoUrl::from(req.url().to_string()))
                .map_err(tracerr::from_and_wrap!(=> Error))
                .map_err(tracerr::map_from)
            })
            .collect()
    }
}

#[cfg(test)]
mod spec {
    use super::{Details, FindPlace, Geocode, Status};

    #[test]
    fn decodes_found_place() {
        let resp: FindPlace = serde_json::from_str(
            r#"{"candidates":[{"place_id":"ChIJ"}],"status":"OK"}"#,
        )
        .unwrap();

        assert_eq!(resp.status, Status::Ok);
        assert_eq!(resp.candidates[0].place_id, "ChIJ");
    }

    #[test]
    fn unknown_status_is_not_ok() {
        let resp: Geocode =
            serde_json::from_str(r#"{"results":[],"status":"ZERO_RESULTS"}"#)
                .unwrap();

        assert_eq!(resp.status, Status::NotOk);
        assert!(resp.results.is_empty());
    }

    #[test]
    fn decodes_photo_references() {
        let resp: Details = serde_json::from_str(
            r#"{
                "result": {"photos": [{"photo_reference": "abc", "width": 1}]},
                "status": "OK"
            }"#,
        )
        .unwrap();

        let refs = resp
            .result
            .unwrap()
            .photos
            .into_iter()
            .map(|p| p.photo_reference)
            .collect::<Vec<_>>();
        assert_eq!(refs, ["abc"]);
    }
}
