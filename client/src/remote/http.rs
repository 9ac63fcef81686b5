use crate::remote::{FavoritesStore, RestaurantSource};
use async_trait::async_trait;
use colored::Color;
use common::config::ClientConfig;
use common::errors::PairingError;
use common::logger::Logger;
use common::types::candidate::Candidate;
use common::types::favorite::FavoriteRecord;
use common::types::geo::GeoCoordinate;
use common::utils::photo_url;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct NearbyQuery<'a> {
    session_id: &'a str,
    latitude: f64,
    longitude: f64,
    radius: u32,
}

#[derive(Serialize)]
struct SessionBody<'a> {
    session_id: &'a str,
}

#[derive(Deserialize)]
struct NearbyResponse {
    restaurants: Vec<Candidate>,
}

#[derive(Deserialize)]
struct NextResponse {
    restaurant: Candidate,
}

#[derive(Deserialize)]
struct FavoritesResponse {
    favorites: Vec<FavoriteRecord>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the restaurant service HTTP contract.
///
/// Favorites calls need the bearer token handed over by the token store;
/// restaurant calls are anonymous.
pub struct HttpRemote {
    client: reqwest::Client,
    api_url: String,
    auth_token: Option<String>,
    logger: Logger,
}

impl HttpRemote {
    pub fn new(
        api_url: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PairingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PairingError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            auth_token,
            logger: Logger::new("Http Remote", Color::Blue),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, PairingError> {
        let remote = Self::new(
            config.api_url.clone(),
            config.auth_token.clone(),
            config.http_timeout,
        )?;
        let logger = remote.logger.clone().with_verbose(config.verbose);
        Ok(remote.with_logger(logger))
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, PairingError> {
        match &self.auth_token {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(PairingError::Unauthenticated),
        }
    }

    async fn send(&self, what: &str, request: RequestBuilder) -> Result<Response, PairingError> {
        self.logger.debug(format!("{what}: sending request"));
        let response = request.send().await.map_err(|e| {
            self.logger.error(format!("{what}: transport failure: {e}"));
            PairingError::Network(format!("{what}: {e}"))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        self.logger
            .warn(format!("{what}: service answered {status}: {detail}"));
        Err(PairingError::Network(format!(
            "{what} failed with {status}: {detail}"
        )))
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        what: &str,
        request: RequestBuilder,
    ) -> Result<T, PairingError> {
        let response = self.send(what, request).await?;
        response.json::<T>().await.map_err(|e| {
            self.logger
                .error(format!("{what}: could not decode response: {e}"));
            PairingError::Network(format!("{what}: invalid response body: {e}"))
        })
    }

    /// Where the image behind `photo_reference` can be fetched.
    pub fn photo_url(&self, photo_reference: &str, max_width: u32) -> String {
        photo_url(&self.api_url, photo_reference, max_width)
    }

    /// Downloads the image behind `photo_reference`.
    pub async fn fetch_photo(
        &self,
        photo_reference: &str,
        max_width: u32,
    ) -> Result<Vec<u8>, PairingError> {
        let request = self.client.get(self.url("/photo")).query(&[
            ("photo_reference", photo_reference.to_string()),
            ("max_width", max_width.to_string()),
        ]);
        let response = self.send("photo", request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PairingError::Network(format!("photo: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl RestaurantSource for HttpRemote {
    async fn nearby_restaurants(
        &self,
        session_id: &str,
        coordinate: GeoCoordinate,
        radius_meters: u32,
    ) -> Result<Vec<Candidate>, PairingError> {
        let request = self
            .client
            .get(self.url("/nearby-restaurants"))
            .query(&NearbyQuery {
                session_id,
                latitude: coordinate.latitude,
                longitude: coordinate.longitude,
                radius: radius_meters,
            });
        let body: NearbyResponse = self.read_json("nearby-restaurants", request).await?;
        self.logger.info(format!(
            "Received {} restaurants around {}",
            body.restaurants.len(),
            coordinate
        ));
        Ok(body.restaurants)
    }

    async fn next_restaurant(&self, session_id: &str) -> Result<Candidate, PairingError> {
        let request = self
            .client
            .post(self.url("/next-restaurant"))
            .json(&SessionBody { session_id });
        let body: NextResponse = self.read_json("next-restaurant", request).await?;
        self.logger
            .debug(format!("next-restaurant returned {}", body.restaurant.id));
        Ok(body.restaurant)
    }

    async fn reset_session(&self, session_id: &str) -> Result<(), PairingError> {
        let request = self
            .client
            .post(self.url("/reset-session"))
            .json(&SessionBody { session_id });
        self.send("reset-session", request).await?;
        Ok(())
    }
}

#[async_trait]
impl FavoritesStore for HttpRemote {
    async fn list_favorites(&self) -> Result<Vec<FavoriteRecord>, PairingError> {
        let request = self.authorized(self.client.get(self.url("/favorites")))?;
        let body: FavoritesResponse = self.read_json("list favorites", request).await?;
        Ok(body.favorites)
    }

    async fn add_favorite(&self, record: &FavoriteRecord) -> Result<(), PairingError> {
        let request = self.authorized(self.client.post(self.url("/favorites")).json(record))?;
        self.send("add favorite", request).await?;
        self.logger.info(format!("Added {} to favorites", record.name));
        Ok(())
    }

    async fn remove_favorite(&self, place_id: &str) -> Result<(), PairingError> {
        let request = self.authorized(
            self.client
                .delete(self.url("/favorites"))
                .query(&[("place_id", place_id)]),
        )?;
        self.send("remove favorite", request).await?;
        self.logger.info(format!("Removed {} from favorites", place_id));
        Ok(())
    }
}
