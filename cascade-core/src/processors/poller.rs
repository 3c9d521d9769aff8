//! Poller.
//!
//! Fetches the world-state feed, turns the snapshot into at most one
//! [`PollSignal`] and hands it to the coordinator. Between ticks it sleeps
//! for [`next_poll_delay`], hibernating while a long cascade runs.
//!
//! Shutdown only interrupts the sleep. A fetch that is already running is
//! allowed to finish and its signal is still delivered.

use super::coordinator::CoordinatorHandle;
use crate::config::{ConfigStore, ConfigWatcher, MissionSelector, PollerConfig};
use crate::entities::Session;
use crate::events::{DetectedCascade, PollSignal, SessionChange};
use crate::framework::{MissionFeed, StateStore};
use crate::utils::poll_interval::next_poll_delay;
use cascade_sdk::objects::WorldState;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Decide what a feed snapshot means for the current session.
///
/// - a matching mission with a new id and more than `min_remaining` left
///   is reported as detected
/// - otherwise, a session past its expiry is reported as expired
/// - otherwise nothing happens
pub fn evaluate(
    world: &WorldState,
    selector: &MissionSelector,
    current: Option<&Session>,
    now: OffsetDateTime,
    min_remaining: Duration,
) -> Option<PollSignal> {
    let found = world.active_missions.iter().find_map(|mission| {
        let matches = mission.node == selector.node
            && mission.mission_type == selector.mission_type
            && mission.hard == selector.hard;
        if !matches {
            return None;
        }
        mission.expiry().map(|expiry| (mission.id(), expiry))
    });

    if let Some((id, expiry)) = found {
        let is_new = current.is_none_or(|session| session.id != id);
        if is_new && expiry - now > min_remaining {
            return Some(PollSignal::Detected(DetectedCascade {
                id: id.into(),
                expiry,
                label: selector.label.clone(),
            }));
        }
    }

    current
        .filter(|session| session.is_expired_at(now))
        .map(|session| PollSignal::Expired {
            id: session.id.clone(),
        })
}

pub struct Poller {
    feed: Arc<dyn MissionFeed>,
    store: Arc<dyn StateStore>,
    coordinator: CoordinatorHandle,
}

impl Poller {
    pub fn new(
        feed: Arc<dyn MissionFeed>,
        store: Arc<dyn StateStore>,
        coordinator: CoordinatorHandle,
    ) -> Self {
        Self {
            feed,
            store,
            coordinator,
        }
    }

    /// Poll until shutdown is signaled.
    ///
    /// The config is re-read at the start of every tick; a config update
    /// cuts the current sleep short.
    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        config_store: ConfigStore<PollerConfig>,
        mut config_watcher: ConfigWatcher,
    ) {
        info!("Poller started");

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let config = config_store.snapshot().await;
            let delay = self.tick(&config).await;
            debug!(%delay, "Next poll scheduled");

            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Poller received shutdown signal");
                        break;
                    }
                }

                Ok(()) = config_watcher.changed() => {
                    info!("Poller config changed, polling now");
                }

                _ = tokio::time::sleep(delay.unsigned_abs()) => {}
            }
        }

        info!("Poller shutdown complete");
    }

    /// Run one poll and return the delay until the next one.
    ///
    /// Never fails: feed and store errors are logged and the tick counts as
    /// producing no signal. A signal the coordinator could not apply falls
    /// back to the base interval.
    pub async fn tick(&self, config: &PollerConfig) -> Duration {
        let current = match self.store.load().await {
            Ok(document) => document.active_cascade,
            Err(e) => {
                warn!(error = %e, "Failed to load state, skipping poll");
                return config.base_interval;
            }
        };

        let signal = match self.feed.fetch(&config.feed_url, &config.user_agent).await {
            Ok(world) => evaluate(
                &world,
                &config.selector,
                current.as_ref(),
                OffsetDateTime::now_utc(),
                config.min_remaining,
            ),
            Err(e) => {
                warn!(error = %e, feed_url = %config.feed_url, "Feed fetch failed");
                None
            }
        };

        // Hibernate only on a session the coordinator actually holds.
        let expiry = match signal {
            None => current.as_ref().map(|session| session.expiry),
            Some(signal) => match self.coordinator.poll(signal).await {
                Ok(change) => {
                    debug!(?change, "Poll signal applied");
                    match change {
                        SessionChange::Started(session)
                        | SessionChange::Superseded {
                            current: session, ..
                        } => Some(session.expiry),
                        SessionChange::Ended(_) => None,
                        SessionChange::Unchanged => current.as_ref().map(|session| session.expiry),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to apply poll signal");
                    None
                }
            },
        };

        next_poll_delay(
            expiry,
            OffsetDateTime::now_utc(),
            config.base_interval,
            config.wake_buffer,
        )
    }
}
