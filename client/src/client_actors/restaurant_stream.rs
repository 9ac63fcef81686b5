use crate::messages::internal_messages::{
    GetStreamSnapshot, InitializeStream, NextCandidate, ResetStream, StreamSnapshot, Unmount,
};
use crate::mount_guard::MountGuard;
use crate::remote::RestaurantSource;
use crate::session::{Session, SessionContext};
use actix::fut::ready;
use actix::prelude::*;
use common::errors::PairingError;
use common::logger::Logger;
use common::types::candidate::Candidate;
use common::utils::new_session_id;
use std::collections::HashSet;
use std::sync::Arc;

/// Knobs of the candidate stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamSettings {
    pub radius_meters: u32,
    /// Remote fetches one `NextCandidate` may spend on already seen ids.
    pub max_novel_attempts: u32,
}

/// Actor RestaurantStream: owner of the session's candidate cache.
///
/// Initial batch and single fetches are answered atomically, so the cache is
/// only ever mutated by one request at a time, in mailbox order.
pub struct RestaurantStream {
    source: Arc<dyn RestaurantSource>,
    settings: StreamSettings,
    /// Id the next `InitializeStream` will run under.
    session_id: String,
    context: Option<SessionContext>,
    session: Option<Session>,
    guard: MountGuard,
    logger: Logger,
}

impl RestaurantStream {
    pub fn new(
        source: Arc<dyn RestaurantSource>,
        settings: StreamSettings,
        guard: MountGuard,
        logger: Logger,
    ) -> Self {
        Self {
            source,
            settings,
            session_id: new_session_id(),
            context: None,
            session: None,
            guard,
            logger,
        }
    }
}

/// Fetches until the service hands out an id outside `seen`, at most
/// `max_attempts` times.
async fn fetch_novel(
    context: SessionContext,
    seen: HashSet<String>,
    max_attempts: u32,
    logger: Logger,
) -> Result<Candidate, PairingError> {
    for attempt in 1..=max_attempts {
        let candidate = context.source.next_restaurant(&context.session_id).await?;
        if !seen.contains(&candidate.id) {
            return Ok(candidate);
        }
        logger.debug(format!(
            "Discarding already seen {} (fetch {}/{})",
            candidate.id, attempt, max_attempts
        ));
    }
    Err(PairingError::NoNovelCandidates {
        attempts: max_attempts,
    })
}

impl Actor for RestaurantStream {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        self.logger
            .debug(format!("Stream started with session {}", self.session_id));
    }
}

impl Handler<InitializeStream> for RestaurantStream {
    type Result = AtomicResponse<Self, Result<Vec<Candidate>, PairingError>>;

    fn handle(&mut self, msg: InitializeStream, _ctx: &mut Self::Context) -> Self::Result {
        let context = SessionContext::new(
            self.session_id.clone(),
            msg.coordinate,
            self.settings.radius_meters,
            self.source.clone(),
        );
        self.logger.info(format!(
            "Fetching restaurants within {}m of {}",
            context.radius_meters, context.coordinate
        ));

        let request = context.clone();
        let fut = async move {
            request
                .source
                .nearby_restaurants(&request.session_id, request.coordinate, request.radius_meters)
                .await
        };

        AtomicResponse::new(Box::pin(fut.into_actor(self).map(
            move |res, act, _ctx| {
                if !act.guard.is_mounted() {
                    return Err(PairingError::Detached);
                }
                let seeded = res.and_then(Session::seeded);
                match seeded {
                    Ok(session) => {
                        act.logger.info(format!(
                            "Session {} ready with {} restaurants",
                            context.session_id,
                            session.len()
                        ));
                        let candidates = session.candidates().to_vec();
                        act.context = Some(context);
                        act.session = Some(session);
                        Ok(candidates)
                    }
                    Err(e) => {
                        act.logger
                            .error(format!("Initial fetch failed: {}", e));
                        act.context = None;
                        act.session = None;
                        Err(e)
                    }
                }
            },
        )))
    }
}

impl Handler<NextCandidate> for RestaurantStream {
    type Result = AtomicResponse<Self, Result<Candidate, PairingError>>;

    fn handle(&mut self, _msg: NextCandidate, _ctx: &mut Self::Context) -> Self::Result {
        let (Some(session), Some(context)) = (self.session.as_mut(), self.context.clone()) else {
            return AtomicResponse::new(Box::pin(ready(Err(PairingError::NotReady))));
        };

        if let Some(candidate) = session.take_cached() {
            self.logger.debug(format!(
                "Cache hit {} (cursor {}/{})",
                candidate.id,
                session.cursor(),
                session.len()
            ));
            return AtomicResponse::new(Box::pin(ready(Ok(candidate))));
        }

        self.logger.debug(format!(
            "Cache exhausted at {}, asking the service",
            session.cursor()
        ));
        let fut = fetch_novel(
            context,
            session.seen_ids().clone(),
            self.settings.max_novel_attempts.max(1),
            self.logger.clone(),
        );

        AtomicResponse::new(Box::pin(fut.into_actor(self).map(|res, act, _ctx| {
            if !act.guard.is_mounted() {
                return Err(PairingError::Detached);
            }
            match res {
                Ok(candidate) => {
                    if let Some(session) = act.session.as_mut() {
                        session.append_fetched(candidate.clone());
                        act.logger.info(format!(
                            "Fetched {} ({} cached)",
                            candidate.name,
                            session.len()
                        ));
                    }
                    Ok(candidate)
                }
                Err(e) => {
                    act.logger.warn(format!("Next restaurant failed: {}", e));
                    Err(e)
                }
            }
        })))
    }
}

impl Handler<ResetStream> for RestaurantStream {
    type Result = AtomicResponse<Self, String>;

    fn handle(&mut self, _msg: ResetStream, _ctx: &mut Self::Context) -> Self::Result {
        let previous = self.context.take();
        self.session = None;
        self.session_id = new_session_id();
        let session_id = self.session_id.clone();
        let logger = self.logger.clone();

        let fut = async move {
            if let Some(context) = previous {
                if let Err(e) = context.source.reset_session(&context.session_id).await {
                    logger.warn(format!(
                        "Could not reset session {} on the service: {}",
                        context.session_id, e
                    ));
                }
            }
        };

        self.logger
            .info(format!("Session reset, new session {}", session_id));
        AtomicResponse::new(Box::pin(
            fut.into_actor(self).map(move |_, _act, _ctx| session_id),
        ))
    }
}

impl Handler<GetStreamSnapshot> for RestaurantStream {
    type Result = MessageResult<GetStreamSnapshot>;

    fn handle(&mut self, _msg: GetStreamSnapshot, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(StreamSnapshot {
            session_id: self.session_id.clone(),
            coordinate: self.context.as_ref().map(|c| c.coordinate),
            cursor: self.session.as_ref().map_or(0, Session::cursor),
            len: self.session.as_ref().map_or(0, Session::len),
        })
    }
}

impl Handler<Unmount> for RestaurantStream {
    type Result = ();

    fn handle(&mut self, _msg: Unmount, ctx: &mut Self::Context) {
        self.logger.debug("Stream unmounted");
        ctx.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedSource, candidates, nyc};
    use colored::Color;
    use std::time::Duration;

    fn stream_over(source: Arc<ScriptedSource>, max_novel_attempts: u32) -> Addr<RestaurantStream> {
        RestaurantStream::new(
            source,
            StreamSettings {
                radius_meters: 1000,
                max_novel_attempts,
            },
            MountGuard::new(),
            Logger::new("Stream Test", Color::Green),
        )
        .start()
    }

    fn ids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.id.as_str()).collect()
    }

    #[actix_rt::test]
    async fn test_initialize_returns_batch_and_moves_cursor_past_pair() {
        let source = Arc::new(ScriptedSource::with_batch(candidates(&["A", "B", "C", "D", "E"])));
        let stream = stream_over(source.clone(), 10);

        let batch = stream
            .send(InitializeStream { coordinate: nyc() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ids(&batch), ["A", "B", "C", "D", "E"]);

        let snapshot = stream.send(GetStreamSnapshot).await.unwrap();
        assert_eq!(snapshot.cursor, 2);
        assert_eq!(snapshot.len, 5);
        assert_eq!(snapshot.coordinate, Some(nyc()));
        assert_eq!(source.nearby_sessions(), [snapshot.session_id]);
    }

    #[actix_rt::test]
    async fn test_single_candidate_is_insufficient() {
        let source = Arc::new(ScriptedSource::with_batch(candidates(&["A"])));
        let stream = stream_over(source, 10);

        let err = stream
            .send(InitializeStream { coordinate: nyc() })
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(err, PairingError::InsufficientResults { found: 1 });
        assert_eq!(
            stream.send(NextCandidate).await.unwrap(),
            Err(PairingError::NotReady)
        );
    }

    #[actix_rt::test]
    async fn test_next_serves_cache_before_the_service() {
        let source = Arc::new(ScriptedSource::with_batch(candidates(&["A", "B", "C"])));
        let stream = stream_over(source.clone(), 10);
        stream
            .send(InitializeStream { coordinate: nyc() })
            .await
            .unwrap()
            .unwrap();

        let next = stream.send(NextCandidate).await.unwrap().unwrap();
        assert_eq!(next.id, "C");
        assert_eq!(source.next_calls(), 0);
    }

    #[actix_rt::test]
    async fn test_exhausted_cache_fetches_and_appends() {
        let source = Arc::new(ScriptedSource::with_batch(candidates(&["A", "B", "C", "D", "E"])));
        source.push_next_ids(&["F"]);
        let stream = stream_over(source.clone(), 10);
        stream
            .send(InitializeStream { coordinate: nyc() })
            .await
            .unwrap()
            .unwrap();
        for _ in 0..3 {
            stream.send(NextCandidate).await.unwrap().unwrap();
        }
        assert_eq!(stream.send(GetStreamSnapshot).await.unwrap().cursor, 5);

        let fetched = stream.send(NextCandidate).await.unwrap().unwrap();

        assert_eq!(fetched.id, "F");
        let snapshot = stream.send(GetStreamSnapshot).await.unwrap();
        assert_eq!((snapshot.cursor, snapshot.len), (6, 6));
    }

    #[actix_rt::test]
    async fn test_seen_ids_are_discarded_until_a_novel_one() {
        let source = Arc::new(ScriptedSource::with_batch(candidates(&["A", "B"])));
        source.push_next_ids(&["A", "B", "A", "G"]);
        let stream = stream_over(source.clone(), 10);
        stream
            .send(InitializeStream { coordinate: nyc() })
            .await
            .unwrap()
            .unwrap();

        let fetched = stream.send(NextCandidate).await.unwrap().unwrap();

        assert_eq!(fetched.id, "G");
        assert_eq!(source.next_calls(), 4);
        let snapshot = stream.send(GetStreamSnapshot).await.unwrap();
        assert_eq!((snapshot.cursor, snapshot.len), (3, 3));
    }

    #[actix_rt::test]
    async fn test_duplicate_loop_is_bounded() {
        let source = Arc::new(ScriptedSource::with_batch(candidates(&["A", "B"])));
        source.push_next_ids(&["A", "A", "A", "A", "H"]);
        let stream = stream_over(source.clone(), 3);
        stream
            .send(InitializeStream { coordinate: nyc() })
            .await
            .unwrap()
            .unwrap();

        let err = stream.send(NextCandidate).await.unwrap().unwrap_err();

        assert_eq!(err, PairingError::NoNovelCandidates { attempts: 3 });
        assert_eq!(source.next_calls(), 3);
        let snapshot = stream.send(GetStreamSnapshot).await.unwrap();
        assert_eq!((snapshot.cursor, snapshot.len), (2, 2));
    }

    #[actix_rt::test]
    async fn test_no_id_is_returned_twice() {
        let source = Arc::new(ScriptedSource::with_batch(candidates(&["A", "B", "C", "A"])));
        source.push_next_ids(&["C", "D", "B", "E", "D", "F"]);
        let stream = stream_over(source, 10);
        let batch = stream
            .send(InitializeStream { coordinate: nyc() })
            .await
            .unwrap()
            .unwrap();

        let mut returned: Vec<String> = batch[..2].iter().map(|c| c.id.clone()).collect();
        for _ in 0..4 {
            returned.push(stream.send(NextCandidate).await.unwrap().unwrap().id);
        }

        assert_eq!(returned, ["A", "B", "C", "D", "E", "F"]);
    }

    #[actix_rt::test]
    async fn test_concurrent_next_requests_are_serialized() {
        let source = Arc::new(ScriptedSource::with_batch(candidates(&["A", "B"])));
        source.push_next_ids(&["C", "D"]);
        source.set_next_delay(Duration::from_millis(20));
        let stream = stream_over(source, 10);
        stream
            .send(InitializeStream { coordinate: nyc() })
            .await
            .unwrap()
            .unwrap();

        let first = stream.send(NextCandidate);
        let second = stream.send(NextCandidate);
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap().unwrap().id, "C");
        assert_eq!(second.unwrap().unwrap().id, "D");
    }

    #[actix_rt::test]
    async fn test_reset_switches_session_and_clears_cache() {
        let source = Arc::new(ScriptedSource::with_batch(candidates(&["A", "B", "C"])));
        let stream = stream_over(source.clone(), 10);
        stream
            .send(InitializeStream { coordinate: nyc() })
            .await
            .unwrap()
            .unwrap();
        let before = stream.send(GetStreamSnapshot).await.unwrap();

        let new_id = stream.send(ResetStream).await.unwrap();

        assert_ne!(new_id, before.session_id);
        assert_eq!(source.reset_sessions(), [before.session_id]);
        let after = stream.send(GetStreamSnapshot).await.unwrap();
        assert_eq!(after.session_id, new_id);
        assert_eq!((after.cursor, after.len), (0, 0));
        assert_eq!(
            stream.send(NextCandidate).await.unwrap(),
            Err(PairingError::NotReady)
        );
    }

    #[actix_rt::test]
    async fn test_unmounted_stream_discards_late_fetch() {
        let source = Arc::new(ScriptedSource::with_batch(candidates(&["A", "B"])));
        source.push_next_ids(&["C"]);
        source.set_next_delay(Duration::from_millis(50));
        let guard = MountGuard::new();
        let stream = RestaurantStream::new(
            source,
            StreamSettings {
                radius_meters: 1000,
                max_novel_attempts: 10,
            },
            guard.clone(),
            Logger::new("Stream Test", Color::Green),
        )
        .start();
        stream
            .send(InitializeStream { coordinate: nyc() })
            .await
            .unwrap()
            .unwrap();

        let pending = stream.send(NextCandidate);
        guard.unmount();

        assert_eq!(pending.await.unwrap(), Err(PairingError::Detached));
    }
}
