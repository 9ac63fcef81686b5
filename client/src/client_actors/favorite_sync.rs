use crate::messages::internal_messages::{
    FavoritesChanged, GetFavorites, IsFavorite, RefreshFavorites, SubscribeFavorites,
    ToggleFavorite, Unmount,
};
use crate::mount_guard::MountGuard;
use crate::remote::FavoritesStore;
use actix::prelude::*;
use common::errors::PairingError;
use common::logger::Logger;
use common::types::favorite::FavoriteRecord;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// A local favorite flip and the value it replaced.
#[derive(Debug, Clone, PartialEq)]
struct FavoriteChange {
    candidate_id: String,
    previous: bool,
    next: bool,
}

impl FavoriteChange {
    fn inverse(&self) -> Self {
        Self {
            candidate_id: self.candidate_id.clone(),
            previous: self.next,
            next: self.previous,
        }
    }
}

/// A change the service may not reflect yet.
#[derive(Debug)]
struct JournalEntry {
    change: FavoriteChange,
    /// Clock value when the remote write succeeded.
    settled_at: Option<u64>,
}

/// Actor FavoriteSyncCoordinator: local cache of the favorite set.
///
/// Toggles are applied optimistically and journaled until the service is
/// known to reflect them. A refresh replaces the cache with the service's
/// set and replays the journal on top, so an in-flight or freshly settled
/// toggle is never undone by a listing taken before it.
pub struct FavoriteSyncCoordinator {
    store: Arc<dyn FavoritesStore>,
    favorites: HashSet<String>,
    journal: BTreeMap<u64, JournalEntry>,
    /// Logical clock ordering toggles, settlements and refreshes.
    clock: u64,
    /// Clock value of the newest refresh applied so far.
    applied_refresh: u64,
    subscribers: Vec<Recipient<FavoritesChanged>>,
    guard: MountGuard,
    logger: Logger,
}

impl FavoriteSyncCoordinator {
    pub fn new(store: Arc<dyn FavoritesStore>, guard: MountGuard, logger: Logger) -> Self {
        Self {
            store,
            favorites: HashSet::new(),
            journal: BTreeMap::new(),
            clock: 0,
            applied_refresh: 0,
            subscribers: Vec::new(),
            guard,
            logger,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn apply(&mut self, change: &FavoriteChange) {
        if change.next {
            self.favorites.insert(change.candidate_id.clone());
        } else {
            self.favorites.remove(&change.candidate_id);
        }
    }

    /// Whether no toggle of the same candidate was issued after `seq`.
    fn is_latest(&self, seq: u64, candidate_id: &str) -> bool {
        !self
            .journal
            .range(seq + 1..)
            .any(|(_, entry)| entry.change.candidate_id == candidate_id)
    }

    fn notify(&mut self) {
        self.subscribers.retain(|subscriber| subscriber.connected());
        for subscriber in &self.subscribers {
            subscriber.do_send(FavoritesChanged {
                favorites: self.favorites.clone(),
            });
        }
    }

    fn settle(&mut self, seq: u64, result: Result<(), PairingError>) -> Result<bool, PairingError> {
        match result {
            Ok(()) => {
                let settled_at = self.tick();
                let Some(entry) = self.journal.get_mut(&seq) else {
                    return Ok(true);
                };
                entry.settled_at = Some(settled_at);
                self.logger.debug(format!(
                    "Favorite {} confirmed as {}",
                    entry.change.candidate_id, entry.change.next
                ));
                Ok(entry.change.next)
            }
            Err(e) => {
                let Some(entry) = self.journal.remove(&seq) else {
                    return Err(PairingError::FavoriteSync(e.to_string()));
                };
                let change = entry.change;
                if self.is_latest(seq, &change.candidate_id) {
                    self.logger.warn(format!(
                        "Could not save favorite {}, rolling back: {}",
                        change.candidate_id, e
                    ));
                    self.apply(&change.inverse());
                    self.notify();
                } else {
                    // This flip never happened, so the next one started from
                    // the value before it.
                    if let Some((_, later)) = self
                        .journal
                        .range_mut(seq + 1..)
                        .find(|(_, entry)| entry.change.candidate_id == change.candidate_id)
                    {
                        later.change.previous = change.previous;
                    }
                    self.logger.warn(format!(
                        "Could not save favorite {}, a newer toggle is pending: {}",
                        change.candidate_id, e
                    ));
                }
                match e {
                    PairingError::Unauthenticated => Err(e),
                    other => Err(PairingError::FavoriteSync(other.to_string())),
                }
            }
        }
    }

    fn apply_listing(&mut self, issued_at: u64, records: Vec<FavoriteRecord>) {
        if issued_at < self.applied_refresh {
            self.logger
                .debug("Dropping favorites listing older than the one applied");
            return;
        }
        self.applied_refresh = issued_at;

        // Changes settled before the listing was requested are in it.
        self.journal
            .retain(|_, entry| entry.settled_at.is_none_or(|settled| settled > issued_at));

        let mut favorites: HashSet<String> = records.into_iter().map(|r| r.place_id).collect();
        for entry in self.journal.values() {
            if entry.change.next {
                favorites.insert(entry.change.candidate_id.clone());
            } else {
                favorites.remove(&entry.change.candidate_id);
            }
        }

        if favorites != self.favorites {
            self.logger
                .info(format!("Favorites updated ({} saved)", favorites.len()));
            self.favorites = favorites;
            self.notify();
        }
    }
}

impl Actor for FavoriteSyncCoordinator {
    type Context = Context<Self>;
}

impl Handler<ToggleFavorite> for FavoriteSyncCoordinator {
    type Result = ResponseActFuture<Self, Result<bool, PairingError>>;

    fn handle(&mut self, msg: ToggleFavorite, _ctx: &mut Self::Context) -> Self::Result {
        let candidate_id = msg.candidate.id.clone();
        let previous = self.favorites.contains(&candidate_id);
        let change = FavoriteChange {
            candidate_id,
            previous,
            next: !previous,
        };

        self.apply(&change);
        let seq = self.tick();
        self.journal.insert(
            seq,
            JournalEntry {
                change: change.clone(),
                settled_at: None,
            },
        );
        self.notify();
        self.logger.info(format!(
            "{} {}",
            if change.next { "Favoriting" } else { "Unfavoriting" },
            msg.candidate.name
        ));

        let store = self.store.clone();
        let record = FavoriteRecord::from(&msg.candidate);
        let fut = async move {
            if change.next {
                store.add_favorite(&record).await
            } else {
                store.remove_favorite(&record.place_id).await
            }
        };

        Box::pin(fut.into_actor(self).map(move |res, act, _ctx| {
            if !act.guard.is_mounted() {
                return Err(PairingError::Detached);
            }
            act.settle(seq, res)
        }))
    }
}

impl Handler<RefreshFavorites> for FavoriteSyncCoordinator {
    type Result = ResponseActFuture<Self, Result<(), PairingError>>;

    fn handle(&mut self, _msg: RefreshFavorites, _ctx: &mut Self::Context) -> Self::Result {
        let issued_at = self.tick();
        let store = self.store.clone();
        let fut = async move { store.list_favorites().await };

        Box::pin(fut.into_actor(self).map(move |res, act, _ctx| {
            if !act.guard.is_mounted() {
                return Err(PairingError::Detached);
            }
            match res {
                Ok(records) => {
                    act.apply_listing(issued_at, records);
                    Ok(())
                }
                Err(PairingError::Unauthenticated) => {
                    act.logger
                        .warn("Not logged in, keeping local favorites");
                    Err(PairingError::Unauthenticated)
                }
                Err(e) => {
                    act.logger
                        .warn(format!("Could not refresh favorites, keeping local copy: {}", e));
                    Err(PairingError::FavoriteSync(e.to_string()))
                }
            }
        }))
    }
}

impl Handler<IsFavorite> for FavoriteSyncCoordinator {
    type Result = bool;

    fn handle(&mut self, msg: IsFavorite, _ctx: &mut Self::Context) -> Self::Result {
        self.favorites.contains(&msg.candidate_id)
    }
}

impl Handler<GetFavorites> for FavoriteSyncCoordinator {
    type Result = MessageResult<GetFavorites>;

    fn handle(&mut self, _msg: GetFavorites, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.favorites.clone())
    }
}

impl Handler<SubscribeFavorites> for FavoriteSyncCoordinator {
    type Result = ();

    fn handle(&mut self, msg: SubscribeFavorites, _ctx: &mut Self::Context) {
        msg.recipient.do_send(FavoritesChanged {
            favorites: self.favorites.clone(),
        });
        self.subscribers.push(msg.recipient);
    }
}

impl Handler<Unmount> for FavoriteSyncCoordinator {
    type Result = ();

    fn handle(&mut self, _msg: Unmount, ctx: &mut Self::Context) {
        self.subscribers.clear();
        ctx.stop();
    }
}
