//! Scripted stand-ins for the platform and the remote service.

use crate::location::{LocationProvider, PermissionStatus};
use crate::remote::{FavoritesStore, RestaurantSource};
use async_trait::async_trait;
use common::errors::PairingError;
use common::types::candidate::Candidate;
use common::types::favorite::FavoriteRecord;
use common::types::geo::GeoCoordinate;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn candidates(ids: &[&str]) -> Vec<Candidate> {
    ids.iter()
        .map(|id| Candidate::new(*id, format!("Restaurant {id}")))
        .collect()
}

pub fn nyc() -> GeoCoordinate {
    GeoCoordinate::new(40.7128, -74.006).unwrap()
}

/////////////////////////////////////////////////////////////////////
// Location
/////////////////////////////////////////////////////////////////////

pub enum PositionStep {
    Fix(GeoCoordinate),
    Fail(PairingError),
    /// Never resolves.
    Hang,
}

pub struct ScriptedLocation {
    status: Mutex<PermissionStatus>,
    answer: PermissionStatus,
    services: bool,
    steps: Mutex<VecDeque<PositionStep>>,
    request_calls: AtomicUsize,
    position_calls: AtomicUsize,
}

impl ScriptedLocation {
    pub fn granted(steps: Vec<PositionStep>) -> Self {
        Self {
            status: Mutex::new(PermissionStatus::Granted),
            answer: PermissionStatus::Granted,
            services: true,
            steps: Mutex::new(steps.into()),
            request_calls: AtomicUsize::new(0),
            position_calls: AtomicUsize::new(0),
        }
    }

    /// Always fixes at `coordinate`.
    pub fn at(coordinate: GeoCoordinate) -> Self {
        Self::granted((0..16).map(|_| PositionStep::Fix(coordinate)).collect())
    }

    pub fn with_permission(self, status: PermissionStatus, answer: PermissionStatus) -> Self {
        Self {
            status: Mutex::new(status),
            answer,
            ..self
        }
    }

    pub fn with_services(self, services: bool) -> Self {
        Self { services, ..self }
    }

    pub fn request_calls(&self) -> usize {
        self.request_calls.load(Ordering::SeqCst)
    }

    pub fn position_calls(&self) -> usize {
        self.position_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for ScriptedLocation {
    async fn permission_status(&self) -> PermissionStatus {
        *self.status.lock().unwrap()
    }

    async fn request_permission(&self) -> PermissionStatus {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        *self.status.lock().unwrap() = self.answer;
        self.answer
    }

    async fn services_enabled(&self) -> bool {
        self.services
    }

    async fn current_position(&self) -> Result<GeoCoordinate, PairingError> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(PositionStep::Fix(coordinate)) => Ok(coordinate),
            Some(PositionStep::Fail(e)) => Err(e),
            Some(PositionStep::Hang) => std::future::pending::<Result<GeoCoordinate, PairingError>>().await,
            None => Err(PairingError::LocationUnavailable("script exhausted".into())),
        }
    }
}

/////////////////////////////////////////////////////////////////////
// Restaurants
/////////////////////////////////////////////////////////////////////

pub struct ScriptedSource {
    initial: Mutex<VecDeque<Result<Vec<Candidate>, PairingError>>>,
    next: Mutex<VecDeque<Result<Candidate, PairingError>>>,
    next_delay: Mutex<Duration>,
    nearby_calls: AtomicUsize,
    next_calls: AtomicUsize,
    reset_sessions: Mutex<Vec<String>>,
    nearby_sessions: Mutex<Vec<String>>,
}

impl ScriptedSource {
    /// Every initial fetch returns `batch`.
    pub fn with_batch(batch: Vec<Candidate>) -> Self {
        Self::with_initial(vec![Ok(batch)])
    }

    /// Initial fetches answer in order; the last answer repeats.
    pub fn with_initial(initial: Vec<Result<Vec<Candidate>, PairingError>>) -> Self {
        Self {
            initial: Mutex::new(initial.into()),
            next: Mutex::new(VecDeque::new()),
            next_delay: Mutex::new(Duration::ZERO),
            nearby_calls: AtomicUsize::new(0),
            next_calls: AtomicUsize::new(0),
            reset_sessions: Mutex::new(Vec::new()),
            nearby_sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn push_next(&self, result: Result<Candidate, PairingError>) {
        self.next.lock().unwrap().push_back(result);
    }

    pub fn push_next_ids(&self, ids: &[&str]) {
        for candidate in candidates(ids) {
            self.push_next(Ok(candidate));
        }
    }

    pub fn set_next_delay(&self, delay: Duration) {
        *self.next_delay.lock().unwrap() = delay;
    }

    pub fn nearby_calls(&self) -> usize {
        self.nearby_calls.load(Ordering::SeqCst)
    }

    pub fn next_calls(&self) -> usize {
        self.next_calls.load(Ordering::SeqCst)
    }

    pub fn reset_sessions(&self) -> Vec<String> {
        self.reset_sessions.lock().unwrap().clone()
    }

    pub fn nearby_sessions(&self) -> Vec<String> {
        self.nearby_sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl RestaurantSource for ScriptedSource {
    async fn nearby_restaurants(
        &self,
        session_id: &str,
        _coordinate: GeoCoordinate,
        _radius_meters: u32,
    ) -> Result<Vec<Candidate>, PairingError> {
        self.nearby_calls.fetch_add(1, Ordering::SeqCst);
        self.nearby_sessions
            .lock()
            .unwrap()
            .push(session_id.to_string());
        let mut initial = self.initial.lock().unwrap();
        if initial.len() > 1 {
            initial.pop_front().unwrap()
        } else {
            initial
                .front()
                .cloned()
                .unwrap_or_else(|| Err(PairingError::Network("no batch scripted".into())))
        }
    }

    async fn next_restaurant(&self, _session_id: &str) -> Result<Candidate, PairingError> {
        self.next_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.next_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let answer = self.next.lock().unwrap().pop_front();
        answer.unwrap_or_else(|| Err(PairingError::Network("no candidate scripted".into())))
    }

    async fn reset_session(&self, session_id: &str) -> Result<(), PairingError> {
        self.reset_sessions
            .lock()
            .unwrap()
            .push(session_id.to_string());
        Ok(())
    }
}

/////////////////////////////////////////////////////////////////////
// Favorites
/////////////////////////////////////////////////////////////////////

/// Favorites service with a server-side set that tests can inspect and edit.
pub struct ScriptedFavorites {
    server: Mutex<Vec<FavoriteRecord>>,
    fail_writes: AtomicBool,
    fail_list: AtomicBool,
    write_delay: Mutex<Duration>,
    list_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

impl ScriptedFavorites {
    pub fn new(server_ids: &[&str]) -> Self {
        let server = candidates(server_ids)
            .iter()
            .map(FavoriteRecord::from)
            .collect();
        Self {
            server: Mutex::new(server),
            fail_writes: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            write_delay: Mutex::new(Duration::ZERO),
            list_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = delay;
    }

    pub fn server_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self
            .server
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.place_id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    async fn before_write(&self) -> Result<(), PairingError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.write_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PairingError::Network("favorites write refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl FavoritesStore for ScriptedFavorites {
    async fn list_favorites(&self) -> Result<Vec<FavoriteRecord>, PairingError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(PairingError::Network("favorites list refused".into()));
        }
        Ok(self.server.lock().unwrap().clone())
    }

    async fn add_favorite(&self, record: &FavoriteRecord) -> Result<(), PairingError> {
        self.before_write().await?;
        let mut server = self.server.lock().unwrap();
        if !server.iter().any(|r| r.place_id == record.place_id) {
            server.push(record.clone());
        }
        Ok(())
    }

    async fn remove_favorite(&self, place_id: &str) -> Result<(), PairingError> {
        self.before_write().await?;
        self.server
            .lock()
            .unwrap()
            .retain(|r| r.place_id != place_id);
        Ok(())
    }
}
