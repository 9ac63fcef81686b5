use crate::remote::RestaurantSource;
use common::constants::MIN_INITIAL_CANDIDATES;
use common::errors::PairingError;
use common::types::candidate::Candidate;
use common::types::geo::GeoCoordinate;
use std::collections::HashSet;
use std::sync::Arc;

/// Everything a pairing session needs from the outside, injected once.
#[derive(Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub coordinate: GeoCoordinate,
    pub radius_meters: u32,
    pub source: Arc<dyn RestaurantSource>,
}

impl SessionContext {
    pub fn new(
        session_id: impl Into<String>,
        coordinate: GeoCoordinate,
        radius_meters: u32,
        source: Arc<dyn RestaurantSource>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            coordinate,
            radius_meters,
            source,
        }
    }
}

/// Candidate cache of one session.
///
/// `candidates` is append-only and duplicate-free, `seen_ids` mirrors it, and
/// `cursor` never exceeds `candidates.len()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    candidates: Vec<Candidate>,
    seen_ids: HashSet<String>,
    cursor: usize,
}

impl Session {
    /// Builds the cache from the initial batch, dropping repeated ids.
    ///
    /// The first two candidates seed the slots, so the cursor starts after
    /// them.
    pub fn seeded(batch: Vec<Candidate>) -> Result<Self, PairingError> {
        let mut session = Session::default();
        for candidate in batch {
            if session.seen_ids.insert(candidate.id.clone()) {
                session.candidates.push(candidate);
            }
        }
        if session.candidates.len() < MIN_INITIAL_CANDIDATES {
            return Err(PairingError::InsufficientResults {
                found: session.candidates.len(),
            });
        }
        session.cursor = MIN_INITIAL_CANDIDATES;
        Ok(session)
    }

    /// The two candidates the slots start with.
    pub fn initial_pair(&self) -> Option<(Candidate, Candidate)> {
        match self.candidates.as_slice() {
            [first, second, ..] => Some((first.clone(), second.clone())),
            _ => None,
        }
    }

    /// Next cached candidate, if the cursor has not reached the end.
    pub fn take_cached(&mut self) -> Option<Candidate> {
        let candidate = self.candidates.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(candidate)
    }

    pub fn has_seen(&self, id: &str) -> bool {
        self.seen_ids.contains(id)
    }

    pub fn seen_ids(&self) -> &HashSet<String> {
        &self.seen_ids
    }

    /// Appends a remotely fetched candidate and moves the cursor past it.
    /// Returns `false`, leaving the cache untouched, if the id was seen.
    pub fn append_fetched(&mut self, candidate: Candidate) -> bool {
        if !self.seen_ids.insert(candidate.id.clone()) {
            return false;
        }
        self.candidates.push(candidate);
        self.cursor = self.candidates.len();
        true
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}
