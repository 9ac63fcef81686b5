use crate::client_actors::favorite_sync::FavoriteSyncCoordinator;
use crate::client_actors::pair_presenter::PairPresenter;
use crate::messages::flatten;
use crate::messages::internal_messages::{
    Advance, GetPairView, PairUpdated, Pick, RefreshFavorites, ResetSession, Retry,
    ToggleSlotFavorite, UseManualLocation,
};
use crate::messages::ui_messages::UIMessage;
use actix::prelude::*;
use common::constants::DEFAULT_PHOTO_MAX_WIDTH;
use common::errors::PairingError;
use common::logger::Logger;
use common::types::geo::{GeoCoordinate, parse_manual_coordinate};
use common::types::pair_view::{PairPhase, PairView, SlotState};
use common::types::slot::Slot;
use common::utils::photo_url;
use std::future::Future;

const HELP: &str = "Commands:
  l | r        keep the left/right restaurant, replace the other
  al | ar      skip the left/right restaurant
  fl | fr      toggle favorite on the left/right restaurant
  loc LAT LNG  search around a coordinate
  retry        try loading again after an error
  reset        start over with a new session
  refresh      reload favorites
  show         print the current pair
  quit         leave";

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Pick(Slot),
    Advance(Slot),
    Favorite(Slot),
    Locate(GeoCoordinate),
    Retry,
    Reset,
    Refresh,
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["l" | "left"] => Command::Pick(Slot::Left),
            ["r" | "right"] => Command::Pick(Slot::Right),
            ["al"] => Command::Advance(Slot::Left),
            ["ar"] => Command::Advance(Slot::Right),
            ["fl"] => Command::Favorite(Slot::Left),
            ["fr"] => Command::Favorite(Slot::Right),
            ["loc", lat, lng] => {
                let coordinate =
                    parse_manual_coordinate(lat, lng).map_err(|e| e.user_message())?;
                Command::Locate(coordinate)
            }
            ["loc", ..] => return Err("Usage: loc <latitude> <longitude>".to_string()),
            ["retry"] => Command::Retry,
            ["reset"] => Command::Reset,
            ["refresh"] => Command::Refresh,
            ["show"] => Command::Show,
            ["help" | "?"] => Command::Help,
            ["quit" | "q" | "exit"] => Command::Quit,
            [] => return Err("Type 'help' to see the commands".to_string()),
            _ => {
                return Err(format!(
                    "Unknown command {:?}. Type 'help' to see the commands",
                    line.trim()
                ));
            }
        };
        Ok(command)
    }
}

/// Actor UIHandler: terminal front end of the pairing screen.
pub struct UIHandler {
    pub presenter: Addr<PairPresenter>,
    pub favorites: Addr<FavoriteSyncCoordinator>,
    /// Base URL used to print photo links, when a service is configured.
    pub api_url: Option<String>,
    last_generation: Option<u64>,
    pub logger: Logger,
}

impl UIHandler {
    pub fn new(
        presenter: Addr<PairPresenter>,
        favorites: Addr<FavoriteSyncCoordinator>,
        api_url: Option<String>,
        logger: Logger,
    ) -> Self {
        UIHandler {
            presenter,
            favorites,
            api_url,
            last_generation: None,
            logger,
        }
    }

    fn report(&self, error: &PairingError) {
        self.logger.error(error.user_message());
        self.logger.debug(error.to_string());
        if error.is_location_failure() {
            self.logger
                .info("Enter a location with: loc <latitude> <longitude>");
        }
    }

    fn render_slot(&self, slot: Slot, state: &SlotState) {
        let label = match slot {
            Slot::Left => "L",
            Slot::Right => "R",
        };
        match state {
            SlotState::Loading => self.logger.info(format!("[{}] ...", label)),
            SlotState::Filled {
                candidate,
                is_favorite,
            } => {
                let marker = if *is_favorite { "♥ " } else { "" };
                self.logger
                    .info(format!("[{}] {}{}", label, marker, candidate.summary()));
                if let (Some(api_url), Some(reference)) =
                    (&self.api_url, &candidate.photo_reference)
                {
                    self.logger.debug(format!(
                        "    {}",
                        photo_url(api_url, reference, DEFAULT_PHOTO_MAX_WIDTH)
                    ));
                }
            }
        }
    }

    fn render(&mut self, view: &PairView) {
        if self.last_generation == Some(view.generation) {
            return;
        }
        self.last_generation = Some(view.generation);
        match &view.phase {
            PairPhase::Loading => self.logger.info("Looking for restaurants nearby..."),
            PairPhase::Error(e) => {
                self.report(e);
                self.logger.info("Type 'retry' to try again");
            }
            PairPhase::Ready => {
                for slot in Slot::BOTH {
                    self.render_slot(slot, view.slot(slot));
                }
                self.logger.info("Which one? (l / r, 'help' for more)");
            }
        }
    }

    /// Runs `request` in the background and reports how it ended.
    fn forward<T, F, D>(&self, ctx: &mut Context<Self>, request: F, describe: D)
    where
        T: 'static,
        F: Future<Output = Result<Result<T, PairingError>, MailboxError>> + 'static,
        D: FnOnce(T) -> Option<String> + 'static,
    {
        ctx.spawn(
            request
                .into_actor(self)
                .map(move |res, act, _ctx| match flatten(res) {
                    Ok(value) => {
                        if let Some(text) = describe(value) {
                            act.logger.info(text);
                        }
                    }
                    Err(PairingError::Detached) => {}
                    Err(e) => act.report(&e),
                }),
        );
    }

    fn dispatch(&mut self, command: Command, ctx: &mut Context<Self>) {
        match command {
            Command::Pick(slot) => {
                let request = self.presenter.send(Pick { slot });
                self.forward(ctx, request, |_| None);
            }
            Command::Advance(slot) => {
                let request = self.presenter.send(Advance { slot });
                self.forward(ctx, request, |_| None);
            }
            Command::Favorite(slot) => {
                let request = self.presenter.send(ToggleSlotFavorite { slot });
                self.forward(ctx, request, |on| {
                    Some(if on {
                        "Added to favorites".to_string()
                    } else {
                        "Removed from favorites".to_string()
                    })
                });
            }
            Command::Locate(coordinate) => {
                let request = self.presenter.send(UseManualLocation { coordinate });
                self.forward(ctx, request, |_| None);
            }
            Command::Retry => {
                let request = self.presenter.send(Retry);
                self.forward(ctx, request, |_| None);
            }
            Command::Reset => {
                let request = self.presenter.send(ResetSession);
                self.forward(ctx, request, |_| None);
            }
            Command::Refresh => {
                let request = self.favorites.send(RefreshFavorites);
                self.forward(ctx, request, |_| Some("Favorites up to date".to_string()));
            }
            Command::Show => {
                ctx.spawn(self.presenter.send(GetPairView).into_actor(self).map(
                    |res, act, _ctx| match res {
                        Ok(view) => {
                            act.last_generation = None;
                            act.render(&view);
                        }
                        Err(_) => act.report(&PairingError::Detached),
                    },
                ));
            }
            Command::Help => self.logger.info(HELP),
            Command::Quit => self.logger.info("Bye!"),
        }
    }
}

impl Actor for UIHandler {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        self.logger.debug("UIHandler started");
    }
}

impl Handler<UIMessage> for UIHandler {
    type Result = ();

    fn handle(&mut self, msg: UIMessage, ctx: &mut Self::Context) {
        match msg {
            UIMessage::UserInput(line) => match Command::parse(&line) {
                Ok(command) => self.dispatch(command, ctx),
                Err(hint) => self.logger.warn(hint),
            },
            UIMessage::ShowMessage(text) => self.logger.info(text),
        }
    }
}

impl Handler<PairUpdated> for UIHandler {
    type Result = ();

    fn handle(&mut self, msg: PairUpdated, _ctx: &mut Self::Context) {
        self.render(&msg.view);
    }
}
