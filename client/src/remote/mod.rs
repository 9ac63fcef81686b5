//! Seams to the remote restaurant and favorites services.
//!
//! The engine only depends on these traits; `HttpRemote` talks to the real
//! service and `FixtureRemote` serves a fixed list in test mode.

pub mod fixture;
pub mod http;

use async_trait::async_trait;
use common::errors::PairingError;
use common::types::candidate::Candidate;
use common::types::favorite::FavoriteRecord;
use common::types::geo::GeoCoordinate;

pub use fixture::FixtureRemote;
pub use http::HttpRemote;

/// Source of restaurant candidates for a session.
#[async_trait]
pub trait RestaurantSource: Send + Sync {
    /// Initial batch around `coordinate`, keyed by the session.
    async fn nearby_restaurants(
        &self,
        session_id: &str,
        coordinate: GeoCoordinate,
        radius_meters: u32,
    ) -> Result<Vec<Candidate>, PairingError>;

    /// One more candidate for the session. May repeat earlier ones.
    async fn next_restaurant(&self, session_id: &str) -> Result<Candidate, PairingError>;

    /// Drops the server-side state of the session.
    async fn reset_session(&self, session_id: &str) -> Result<(), PairingError>;
}

/// Authoritative store of the user's favorites.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    async fn list_favorites(&self) -> Result<Vec<FavoriteRecord>, PairingError>;

    async fn add_favorite(&self, record: &FavoriteRecord) -> Result<(), PairingError>;

    async fn remove_favorite(&self, place_id: &str) -> Result<(), PairingError>;
}
