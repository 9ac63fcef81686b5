use actix::{Message, Recipient};
use common::errors::PairingError;
use common::types::candidate::Candidate;
use common::types::geo::GeoCoordinate;
use common::types::pair_view::PairView;
use common::types::slot::Slot;
use std::collections::HashSet;

/// Message that detaches an engine actor from the screen.
///
/// ## Purpose
/// Sent when the hosting screen goes away. The receiver stops; results of work
/// still in flight are discarded instead of applied.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct Unmount;

/////////////////////////////////////////////////////////////////////
// RestaurantStream
/////////////////////////////////////////////////////////////////////

/// Message that starts a session at a coordinate.
///
/// ## Purpose
/// Fetches the initial batch for the stream's session id and replaces any
/// previous session cache.
///
/// ## Contents
/// - `coordinate`: Where to search.
///
/// Answers with the deduplicated batch, at least two candidates long.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<Vec<Candidate>, PairingError>")]
pub struct InitializeStream {
    pub coordinate: GeoCoordinate,
}

/// Message asking for the next unseen candidate of the session.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "Result<Candidate, PairingError>")]
pub struct NextCandidate;

/// Message that ends the current session.
///
/// ## Purpose
/// Asks the service to drop the session, clears the local cache and switches
/// to a fresh session id, which is returned.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "String")]
pub struct ResetStream;

/// Query for the stream's bookkeeping.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "StreamSnapshot")]
pub struct GetStreamSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct StreamSnapshot {
    pub session_id: String,
    pub coordinate: Option<GeoCoordinate>,
    pub cursor: usize,
    pub len: usize,
}

/////////////////////////////////////////////////////////////////////
// FavoriteSyncCoordinator
/////////////////////////////////////////////////////////////////////

/// Message that flips the favorite state of a candidate.
///
/// ## Purpose
/// The new value is applied locally right away and then persisted. If the
/// remote write fails the local value is rolled back.
///
/// ## Contents
/// - `candidate`: The candidate to toggle, sent in full so the remote record
///   can be built.
///
/// Answers with the favorite value the toggle set.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<bool, PairingError>")]
pub struct ToggleFavorite {
    pub candidate: Candidate,
}

/// Message that reloads the favorite set from the service.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "Result<(), PairingError>")]
pub struct RefreshFavorites;

#[derive(Message, Debug, Clone)]
#[rtype(result = "bool")]
pub struct IsFavorite {
    pub candidate_id: String,
}

/// Query for the whole local favorite set.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "HashSet<String>")]
pub struct GetFavorites;

/// Message that registers a listener for favorite changes. The current set is
/// delivered immediately.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SubscribeFavorites {
    pub recipient: Recipient<FavoritesChanged>,
}

/// Snapshot of the local favorite set after it changed.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct FavoritesChanged {
    pub favorites: HashSet<String>,
}

/////////////////////////////////////////////////////////////////////
// PairPresenter
/////////////////////////////////////////////////////////////////////

/// Message that brings the screen up: acquire a location, then fill both
/// slots. Answers `Ok` once the pair is loaded and `NotReady` while another
/// load is still running.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "Result<(), PairingError>")]
pub struct StartPairing;

/// Message that leaves the `Error` phase and loads again.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "Result<(), PairingError>")]
pub struct Retry;

/// Message carrying a coordinate typed in by the user.
///
/// ## Purpose
/// Fallback when the device location cannot be obtained. When a pair is
/// already on screen the session is reset around the new coordinate.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "Result<(), PairingError>")]
pub struct UseManualLocation {
    pub coordinate: GeoCoordinate,
}

/// Message that starts over with a fresh session at the same coordinate.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "Result<(), PairingError>")]
pub struct ResetSession;

/// Message that replaces the candidate in `slot` with the next one from the
/// stream. The other slot is untouched.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "Result<Candidate, PairingError>")]
pub struct Advance {
    pub slot: Slot,
}

/// Message for a click on `slot`: it is kept and its sibling is replaced.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "Result<Candidate, PairingError>")]
pub struct Pick {
    pub slot: Slot,
}

/// Message that toggles the favorite state of whatever `slot` shows.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "Result<bool, PairingError>")]
pub struct ToggleSlotFavorite {
    pub slot: Slot,
}

#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "PairView")]
pub struct GetPairView;

/// Message that registers a listener for view changes. The current view is
/// delivered immediately.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SubscribePair {
    pub recipient: Recipient<PairUpdated>,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct PairUpdated {
    pub view: PairView,
}

