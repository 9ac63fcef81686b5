//! Wiring of the pairing screen: one stream, one favorites coordinator and the
//! presenter on top, all sharing a mount guard.

use crate::client_actors::favorite_sync::FavoriteSyncCoordinator;
use crate::client_actors::pair_presenter::PairPresenter;
use crate::client_actors::restaurant_stream::{RestaurantStream, StreamSettings};
use crate::location::{ConfiguredLocationProvider, LocationAcquirer, RetryPolicy};
use crate::messages::internal_messages::Unmount;
use crate::mount_guard::MountGuard;
use crate::remote::{FavoritesStore, FixtureRemote, HttpRemote, RestaurantSource};
use actix::prelude::*;
use colored::Color;
use common::config::ClientConfig;
use common::logger::Logger;
use std::sync::Arc;

/// Everything the engine needs from the outside world.
pub struct EngineParts {
    pub source: Arc<dyn RestaurantSource>,
    pub favorites: Arc<dyn FavoritesStore>,
    pub location: LocationAcquirer,
    pub settings: StreamSettings,
    pub verbose: bool,
}

impl EngineParts {
    /// Remote service or fixture, plus the configured location, as the
    /// configuration asks.
    pub fn from_config(config: &ClientConfig) -> std::io::Result<Self> {
        let logger = Logger::new("Remote", Color::Cyan).with_verbose(config.verbose);
        let (source, favorites): (Arc<dyn RestaurantSource>, Arc<dyn FavoritesStore>) =
            if config.test_mode {
                let fixture = match &config.fixture_path {
                    Some(path) => FixtureRemote::from_file(path)?,
                    None => FixtureRemote::sample(),
                };
                logger.info(format!(
                    "Test mode: serving {} fixture restaurants",
                    fixture.len()
                ));
                let fixture = Arc::new(fixture);
                (fixture.clone(), fixture)
            } else {
                let remote = HttpRemote::from_config(config)
                    .map_err(|e| std::io::Error::other(e.to_string()))?
                    .with_logger(logger);
                let remote = Arc::new(remote);
                (remote.clone(), remote)
            };

        let provider = Arc::new(ConfiguredLocationProvider::new(config.fixed_location));
        let location = LocationAcquirer::new(provider, RetryPolicy::default()).with_logger(
            Logger::new("Location", Color::Blue).with_verbose(config.verbose),
        );

        Ok(Self {
            source,
            favorites,
            location,
            settings: StreamSettings {
                radius_meters: config.radius_meters,
                max_novel_attempts: config.max_novel_attempts,
            },
            verbose: config.verbose,
        })
    }
}

/// Handles to the running actors of one pairing screen.
pub struct PairingEngine {
    pub presenter: Addr<PairPresenter>,
    pub stream: Addr<RestaurantStream>,
    pub favorites: Addr<FavoriteSyncCoordinator>,
    guard: MountGuard,
}

impl PairingEngine {
    /// Starts the actors. Must run inside an actix system.
    pub fn mount(parts: EngineParts) -> Self {
        let guard = MountGuard::new();
        let verbose = parts.verbose;

        let stream = RestaurantStream::new(
            parts.source,
            parts.settings,
            guard.clone(),
            Logger::new("Stream", Color::Green).with_verbose(verbose),
        )
        .start();
        let favorites = FavoriteSyncCoordinator::new(
            parts.favorites,
            guard.clone(),
            Logger::new("Favorites", Color::Magenta).with_verbose(verbose),
        )
        .start();
        let presenter = PairPresenter::new(
            stream.clone(),
            favorites.clone(),
            Arc::new(parts.location),
            guard.clone(),
            Logger::new("Presenter", Color::BrightBlue).with_verbose(verbose),
        )
        .start();

        Self {
            presenter,
            stream,
            favorites,
            guard,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.guard.is_mounted()
    }

    /// Tears the screen down. Work still in flight completes into nothing.
    pub fn unmount(&self) {
        self.guard.unmount();
        self.presenter.do_send(Unmount);
    }
}
