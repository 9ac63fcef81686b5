use crate::client_actors::favorite_sync::FavoriteSyncCoordinator;
use crate::client_actors::restaurant_stream::RestaurantStream;
use crate::location::LocationAcquirer;
use crate::messages::flatten;
use crate::messages::internal_messages::{
    Advance, FavoritesChanged, GetPairView, InitializeStream, NextCandidate, PairUpdated, Pick,
    RefreshFavorites, ResetSession, ResetStream, Retry, StartPairing, SubscribeFavorites,
    SubscribePair, ToggleFavorite, ToggleSlotFavorite, Unmount, UseManualLocation,
};
use crate::mount_guard::MountGuard;
use actix::fut::ready;
use actix::prelude::*;
use common::errors::PairingError;
use common::logger::Logger;
use common::types::candidate::Candidate;
use common::types::geo::GeoCoordinate;
use common::types::pair_view::{PairPhase, PairView, SlotState};
use common::types::slot::Slot;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

type LoadStep = Option<Result<Vec<Candidate>, PairingError>>;

/// Replacement tickets of one slot.
///
/// Fetches run concurrently with the mailbox, so their answers are applied
/// in the order the replacements were requested rather than the order they
/// land in.
#[derive(Debug, Default)]
struct SlotQueue {
    issued: u64,
    applied: u64,
    /// Outcomes that arrived before an older ticket. `None` is a failed fetch.
    early: BTreeMap<u64, Option<Candidate>>,
}

impl SlotQueue {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Records the outcome of `ticket` and returns the candidates now due,
    /// oldest first.
    fn complete(&mut self, ticket: u64, outcome: Option<Candidate>) -> Vec<Candidate> {
        self.early.insert(ticket, outcome);
        let mut due = Vec::new();
        while let Some(outcome) = self.early.remove(&(self.applied + 1)) {
            self.applied += 1;
            due.extend(outcome);
        }
        due
    }
}

/// Actor PairPresenter: the two slots on screen and the keep-one,
/// replace-one policy.
///
/// Loads (location, then initial batch) run concurrently with the mailbox and
/// are tagged with an epoch, so a load that was superseded by a newer one is
/// dropped. Slot replacements do not block the mailbox either; each takes a
/// ticket from its slot's queue, so two replacements for the same slot apply
/// in the order they were requested.
pub struct PairPresenter {
    stream: Addr<RestaurantStream>,
    favorites: Addr<FavoriteSyncCoordinator>,
    location: Arc<LocationAcquirer>,
    coordinate: Option<GeoCoordinate>,
    phase: PairPhase,
    left: SlotState,
    right: SlotState,
    favorite_ids: HashSet<String>,
    generation: u64,
    load_epoch: u64,
    loading: bool,
    queues: [SlotQueue; 2],
    subscribers: Vec<Recipient<PairUpdated>>,
    guard: MountGuard,
    logger: Logger,
}

fn reannotate(state: &mut SlotState, favorites: &HashSet<String>) -> bool {
    match state {
        SlotState::Filled {
            candidate,
            is_favorite,
        } => {
            let now = favorites.contains(&candidate.id);
            let changed = *is_favorite != now;
            *is_favorite = now;
            changed
        }
        SlotState::Loading => false,
    }
}

impl PairPresenter {
    pub fn new(
        stream: Addr<RestaurantStream>,
        favorites: Addr<FavoriteSyncCoordinator>,
        location: Arc<LocationAcquirer>,
        guard: MountGuard,
        logger: Logger,
    ) -> Self {
        Self {
            stream,
            favorites,
            location,
            coordinate: None,
            phase: PairPhase::Loading,
            left: SlotState::Loading,
            right: SlotState::Loading,
            favorite_ids: HashSet::new(),
            generation: 0,
            load_epoch: 0,
            loading: false,
            queues: Default::default(),
            subscribers: Vec::new(),
            guard,
            logger,
        }
    }

    fn view(&self) -> PairView {
        PairView {
            phase: self.phase.clone(),
            left: self.left.clone(),
            right: self.right.clone(),
            generation: self.generation,
        }
    }

    fn slot(&self, slot: Slot) -> &SlotState {
        match slot {
            Slot::Left => &self.left,
            Slot::Right => &self.right,
        }
    }

    fn queue(&mut self, slot: Slot) -> &mut SlotQueue {
        match slot {
            Slot::Left => &mut self.queues[0],
            Slot::Right => &mut self.queues[1],
        }
    }

    fn publish(&mut self) {
        self.generation += 1;
        self.subscribers.retain(|subscriber| subscriber.connected());
        let view = self.view();
        for subscriber in &self.subscribers {
            subscriber.do_send(PairUpdated { view: view.clone() });
        }
    }

    fn filled(&self, candidate: Candidate) -> SlotState {
        let is_favorite = self.favorite_ids.contains(&candidate.id);
        SlotState::filled(candidate, is_favorite)
    }

    fn enter_loading(&mut self) {
        self.phase = PairPhase::Loading;
        self.left = SlotState::Loading;
        self.right = SlotState::Loading;
        self.publish();
    }

    fn enter_error(&mut self, error: PairingError) {
        self.logger.error(format!("Pairing failed: {}", error));
        self.phase = PairPhase::Error(error);
        self.publish();
    }

    fn fill_pair(&mut self, batch: Vec<Candidate>) {
        let mut batch = batch.into_iter();
        let (Some(left), Some(right)) = (batch.next(), batch.next()) else {
            self.enter_error(PairingError::InsufficientResults { found: 0 });
            return;
        };
        self.logger
            .info(format!("Pair ready: {} vs {}", left.name, right.name));
        self.left = self.filled(left);
        self.right = self.filled(right);
        self.phase = PairPhase::Ready;
        self.publish();
    }

    fn replace_slot(&mut self, slot: Slot, candidate: Candidate) {
        self.logger
            .info(format!("{} slot now shows {}", slot, candidate.name));
        let state = self.filled(candidate);
        match slot {
            Slot::Left => self.left = state,
            Slot::Right => self.right = state,
        }
        self.publish();
    }

    /// Moves to `Loading` and runs a fresh load: optional session reset,
    /// location (unless `known`), then the initial batch.
    fn begin_load(
        &mut self,
        known: Option<GeoCoordinate>,
        reset: bool,
    ) -> ResponseActFuture<Self, Result<(), PairingError>> {
        self.load_epoch += 1;
        let epoch = self.load_epoch;
        self.loading = true;
        self.queues = Default::default();
        self.enter_loading();

        let stream = self.stream.clone();
        let location = self.location.clone();
        let logger = self.logger.clone();
        let locate = async move {
            if reset {
                match stream.send(ResetStream).await {
                    Ok(session_id) => logger.debug(format!("Switched to session {}", session_id)),
                    Err(_) => return Err(PairingError::Detached),
                }
            }
            match known {
                Some(coordinate) => Ok(coordinate),
                None => location.acquire().await,
            }
        };

        Box::pin(
            locate
                .into_actor(self)
                .then(move |located, act, _ctx| -> ResponseActFuture<Self, LoadStep> {
                    if act.load_epoch != epoch || !act.guard.is_mounted() {
                        return Box::pin(ready(None));
                    }
                    match located {
                        Ok(coordinate) => {
                            act.coordinate = Some(coordinate);
                            Box::pin(
                                act.stream
                                    .send(InitializeStream { coordinate })
                                    .into_actor(act)
                                    .map(|res, _act, _ctx| Some(flatten(res))),
                            )
                        }
                        Err(e) => Box::pin(ready(Some(Err(e)))),
                    }
                })
                .map(move |step, act, _ctx| {
                    if !act.guard.is_mounted() {
                        return Err(PairingError::Detached);
                    }
                    let Some(result) = step.filter(|_| act.load_epoch == epoch) else {
                        act.logger.debug("Dropping the result of a superseded load");
                        return Ok(());
                    };
                    act.loading = false;
                    match result {
                        Ok(batch) => {
                            act.fill_pair(batch);
                            act.favorites.do_send(RefreshFavorites);
                            Ok(())
                        }
                        Err(e) => {
                            act.enter_error(e.clone());
                            Err(e)
                        }
                    }
                }),
        )
    }

    /// Replaces `slot` with the stream's next candidate.
    fn advance(&mut self, slot: Slot) -> ResponseActFuture<Self, Result<Candidate, PairingError>> {
        if self.phase != PairPhase::Ready {
            return Box::pin(ready(Err(PairingError::NotReady)));
        }
        let epoch = self.load_epoch;
        let ticket = self.queue(slot).issue();
        self.logger
            .debug(format!("Replacing {} slot (ticket {})", slot, ticket));

        Box::pin(self.stream.send(NextCandidate).into_actor(self).map(
            move |res, act, _ctx| {
                if !act.guard.is_mounted() {
                    return Err(PairingError::Detached);
                }
                if act.load_epoch != epoch {
                    act.logger
                        .debug(format!("Dropping {} replacement from an older load", slot));
                    return Err(PairingError::NotReady);
                }
                let res = flatten(res);
                let due = act.queue(slot).complete(ticket, res.as_ref().ok().cloned());
                if !due.is_empty() {
                    for candidate in due {
                        act.replace_slot(slot, candidate);
                    }
                    act.favorites.do_send(RefreshFavorites);
                }
                if let Err(e) = &res {
                    act.logger
                        .warn(format!("Keeping {} slot as is: {}", slot, e));
                }
                res
            },
        ))
    }
}

impl Actor for PairPresenter {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.favorites.do_send(SubscribeFavorites {
            recipient: ctx.address().recipient(),
        });
        self.logger.debug("Presenter started");
    }
}

impl Handler<StartPairing> for PairPresenter {
    type Result = ResponseActFuture<Self, Result<(), PairingError>>;

    fn handle(&mut self, _msg: StartPairing, _ctx: &mut Self::Context) -> Self::Result {
        match &self.phase {
            PairPhase::Ready => Box::pin(ready(Ok(()))),
            PairPhase::Error(e) => Box::pin(ready(Err(e.clone()))),
            PairPhase::Loading if self.loading => Box::pin(ready(Err(PairingError::NotReady))),
            PairPhase::Loading => self.begin_load(self.coordinate, false),
        }
    }
}

impl Handler<Retry> for PairPresenter {
    type Result = ResponseActFuture<Self, Result<(), PairingError>>;

    fn handle(&mut self, _msg: Retry, _ctx: &mut Self::Context) -> Self::Result {
        match &self.phase {
            PairPhase::Error(e) => {
                self.logger.info(format!("Retrying after: {}", e));
                self.begin_load(self.coordinate, false)
            }
            _ => Box::pin(ready(Ok(()))),
        }
    }
}

impl Handler<UseManualLocation> for PairPresenter {
    type Result = ResponseActFuture<Self, Result<(), PairingError>>;

    fn handle(&mut self, msg: UseManualLocation, _ctx: &mut Self::Context) -> Self::Result {
        self.logger
            .info(format!("Using manual location {}", msg.coordinate));
        let reset = self.phase == PairPhase::Ready;
        self.coordinate = Some(msg.coordinate);
        self.begin_load(Some(msg.coordinate), reset)
    }
}

impl Handler<ResetSession> for PairPresenter {
    type Result = ResponseActFuture<Self, Result<(), PairingError>>;

    fn handle(&mut self, _msg: ResetSession, _ctx: &mut Self::Context) -> Self::Result {
        self.logger.info("Starting over with a new session");
        self.begin_load(self.coordinate, true)
    }
}

impl Handler<Advance> for PairPresenter {
    type Result = ResponseActFuture<Self, Result<Candidate, PairingError>>;

    fn handle(&mut self, msg: Advance, _ctx: &mut Self::Context) -> Self::Result {
        self.advance(msg.slot)
    }
}

impl Handler<Pick> for PairPresenter {
    type Result = ResponseActFuture<Self, Result<Candidate, PairingError>>;

    fn handle(&mut self, msg: Pick, _ctx: &mut Self::Context) -> Self::Result {
        if let Some(kept) = self.slot(msg.slot).candidate() {
            self.logger.info(format!("Kept {}", kept.name));
        }
        self.advance(msg.slot.sibling())
    }
}

impl Handler<ToggleSlotFavorite> for PairPresenter {
    type Result = ResponseActFuture<Self, Result<bool, PairingError>>;

    fn handle(&mut self, msg: ToggleSlotFavorite, _ctx: &mut Self::Context) -> Self::Result {
        let candidate = match (&self.phase, self.slot(msg.slot).candidate()) {
            (PairPhase::Ready, Some(candidate)) => candidate.clone(),
            _ => return Box::pin(ready(Err(PairingError::NotReady))),
        };

        Box::pin(
            self.favorites
                .send(ToggleFavorite { candidate })
                .into_actor(self)
                .map(|res, act, _ctx| {
                    if !act.guard.is_mounted() {
                        return Err(PairingError::Detached);
                    }
                    flatten(res)
                }),
        )
    }
}

impl Handler<FavoritesChanged> for PairPresenter {
    type Result = ();

    fn handle(&mut self, msg: FavoritesChanged, _ctx: &mut Self::Context) {
        if !self.guard.is_mounted() {
            return;
        }
        self.favorite_ids = msg.favorites;
        let left = reannotate(&mut self.left, &self.favorite_ids);
        let right = reannotate(&mut self.right, &self.favorite_ids);
        if left || right {
            self.publish();
        }
    }
}

impl Handler<GetPairView> for PairPresenter {
    type Result = MessageResult<GetPairView>;

    fn handle(&mut self, _msg: GetPairView, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.view())
    }
}

impl Handler<SubscribePair> for PairPresenter {
    type Result = ();

    fn handle(&mut self, msg: SubscribePair, _ctx: &mut Self::Context) {
        msg.recipient.do_send(PairUpdated { view: self.view() });
        self.subscribers.push(msg.recipient);
    }
}

impl Handler<Unmount> for PairPresenter {
    type Result = ();

    fn handle(&mut self, _msg: Unmount, ctx: &mut Self::Context) {
        self.guard.unmount();
        self.stream.do_send(Unmount);
        self.favorites.do_send(Unmount);
        self.subscribers.clear();
        self.logger.info("Pairing screen unmounted");
        ctx.stop();
    }
}
