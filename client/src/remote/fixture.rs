use crate::remote::{FavoritesStore, RestaurantSource};
use async_trait::async_trait;
use common::errors::PairingError;
use common::types::candidate::{Candidate, PlaceLocation};
use common::types::favorite::FavoriteRecord;
use common::types::geo::GeoCoordinate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[derive(Deserialize)]
#[serde(untagged)]
enum FixtureFile {
    Wrapped { restaurants: Vec<Candidate> },
    Bare(Vec<Candidate>),
}

/// In-memory stand-in for the remote service.
///
/// Every session gets the whole list up front; `next_restaurant` walks the
/// list round-robin. Favorites live in memory for the lifetime of the value.
pub struct FixtureRemote {
    restaurants: Vec<Candidate>,
    cursors: Mutex<HashMap<String, usize>>,
    favorites: Mutex<Vec<FavoriteRecord>>,
}

impl FixtureRemote {
    pub fn new(restaurants: Vec<Candidate>) -> Self {
        Self {
            restaurants,
            cursors: Mutex::new(HashMap::new()),
            favorites: Mutex::new(Vec::new()),
        }
    }

    /// Loads a JSON fixture, either a bare array or `{"restaurants": [...]}`.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: FixtureFile = serde_json::from_str(&raw)?;
        let restaurants = match file {
            FixtureFile::Wrapped { restaurants } => restaurants,
            FixtureFile::Bare(restaurants) => restaurants,
        };
        Ok(Self::new(restaurants))
    }

    /// A handful of places around lower Manhattan.
    pub fn sample() -> Self {
        let places = [
            ("fixture-1", "Joe's Pizza", 4.5, 1, 40.7306, -73.9897, "7 Carmine St"),
            ("fixture-2", "Katz's Delicatessen", 4.6, 2, 40.7223, -73.9874, "205 E Houston St"),
            ("fixture-3", "Veselka", 4.4, 2, 40.7290, -73.9870, "144 2nd Ave"),
            ("fixture-4", "Xi'an Famous Foods", 4.3, 1, 40.7155, -73.9970, "45 Bayard St"),
            ("fixture-5", "Russ & Daughters", 4.7, 3, 40.7223, -73.9882, "179 E Houston St"),
            ("fixture-6", "Prince Street Pizza", 4.5, 1, 40.7231, -73.9945, "27 Prince St"),
        ];
        let restaurants = places
            .into_iter()
            .map(|(id, name, rating, price, lat, lng, vicinity)| {
                let mut candidate = Candidate::new(id, name);
                candidate.rating = Some(rating);
                candidate.price_level = Some(price);
                candidate.vicinity = Some(vicinity.to_string());
                candidate.open_now = Some(true);
                candidate.location = Some(PlaceLocation { lat, lng });
                candidate
            })
            .collect();
        Self::new(restaurants)
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl RestaurantSource for FixtureRemote {
    async fn nearby_restaurants(
        &self,
        session_id: &str,
        _coordinate: GeoCoordinate,
        _radius_meters: u32,
    ) -> Result<Vec<Candidate>, PairingError> {
        lock(&self.cursors).insert(session_id.to_string(), 0);
        Ok(self.restaurants.clone())
    }

    async fn next_restaurant(&self, session_id: &str) -> Result<Candidate, PairingError> {
        if self.restaurants.is_empty() {
            return Err(PairingError::Network(
                "fixture has no restaurants".to_string(),
            ));
        }
        let mut cursors = lock(&self.cursors);
        let cursor = cursors.entry(session_id.to_string()).or_insert(0);
        *cursor = (*cursor + 1) % self.restaurants.len();
        Ok(self.restaurants[*cursor].clone())
    }

    async fn reset_session(&self, session_id: &str) -> Result<(), PairingError> {
        lock(&self.cursors).remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl FavoritesStore for FixtureRemote {
    async fn list_favorites(&self) -> Result<Vec<FavoriteRecord>, PairingError> {
        Ok(lock(&self.favorites).clone())
    }

    async fn add_favorite(&self, record: &FavoriteRecord) -> Result<(), PairingError> {
        let mut favorites = lock(&self.favorites);
        if !favorites.iter().any(|f| f.place_id == record.place_id) {
            favorites.push(record.clone());
        }
        Ok(())
    }

    async fn remove_favorite(&self, place_id: &str) -> Result<(), PairingError> {
        lock(&self.favorites).retain(|f| f.place_id != place_id);
        Ok(())
    }
}
