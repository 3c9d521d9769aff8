//! Session state machine.
//!
//! Two states: idle (no session) and active. Poll signals move between them:
//!
//! | current            | signal                 | result                        |
//! |--------------------|------------------------|-------------------------------|
//! | idle               | detected               | start session, fan out        |
//! | active (id = x)    | detected (id = x)      | nothing                       |
//! | active (id = x)    | detected (id = y)      | tear down x, start y, fan out |
//! | active (id = x)    | expired (id = x)       | tear down x, clear squads     |
//! | anything else      |                        | nothing                       |

use super::broadcaster::Broadcaster;
use crate::entities::{Session, StateDocument};
use crate::events::{DetectedCascade, PollSignal, SessionChange};
use crate::framework::{StateStore, StoreError};
use kanau::processor::Processor;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a signal should do to the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Ignore,
    Start(DetectedCascade),
    Supersede(DetectedCascade),
    End,
}

/// Transition table. Pure, so it can be checked without any collaborators.
pub fn transition(current: Option<&Session>, signal: &PollSignal) -> Transition {
    match (current, signal) {
        (None, PollSignal::Detected(detected)) => Transition::Start(detected.clone()),
        (Some(session), PollSignal::Detected(detected)) if session.id == detected.id => {
            Transition::Ignore
        }
        (Some(_), PollSignal::Detected(detected)) => Transition::Supersede(detected.clone()),
        (Some(session), PollSignal::Expired { id }) if session.id == *id => Transition::End,
        (_, PollSignal::Expired { .. }) => Transition::Ignore,
    }
}

pub struct SessionMachine {
    store: Arc<dyn StateStore>,
    broadcaster: Broadcaster,
}

impl SessionMachine {
    pub fn new(store: Arc<dyn StateStore>, broadcaster: Broadcaster) -> Self {
        Self { store, broadcaster }
    }

    async fn start(&self, document: &mut StateDocument, detected: DetectedCascade) -> Session {
        let mut session = Session {
            id: detected.id,
            expiry: detected.expiry,
            label: detected.label,
            announcements: Vec::new(),
        };
        if document.servers.is_empty() {
            warn!(session_id = %session.id, "No servers registered, session has no announcements");
        }
        session.announcements = self
            .broadcaster
            .fan_out(&session, &document.servers)
            .await;
        document.squads.clear();
        document.active_cascade = Some(session.clone());
        session
    }

    /// Tear down the current session and persist the cleared document.
    ///
    /// The clear is saved before anything new is posted, so the stored
    /// document never holds announcements of two sessions.
    async fn end(&self, document: &mut StateDocument) -> Result<Option<Session>, StoreError> {
        let Some(previous) = document.active_cascade.as_ref() else {
            return Ok(None);
        };
        self.broadcaster.teardown(&previous.announcements).await;
        let previous = document.clear_session();
        self.store.save(document.clone()).await?;
        Ok(previous)
    }
}

impl Processor<PollSignal> for SessionMachine {
    type Output = SessionChange;
    type Error = StoreError;

    async fn process(&self, signal: PollSignal) -> Result<SessionChange, StoreError> {
        let mut document = self.store.load().await?;

        match transition(document.active_cascade.as_ref(), &signal) {
            Transition::Ignore => {
                debug!(?signal, "Poll signal needs no transition");
                Ok(SessionChange::Unchanged)
            }
            Transition::Start(detected) => {
                info!(session_id = %detected.id, expiry = %detected.expiry, "Cascade detected");
                let session = self.start(&mut document, detected).await;
                self.store.save(document).await?;
                Ok(SessionChange::Started(session))
            }
            Transition::Supersede(detected) => {
                info!(session_id = %detected.id, "Cascade superseded by a new mission");
                let previous = self.end(&mut document).await?;
                let current = self.start(&mut document, detected).await;
                self.store.save(document).await?;
                Ok(match previous {
                    Some(previous) => SessionChange::Superseded { previous, current },
                    None => SessionChange::Started(current),
                })
            }
            Transition::End => {
                let previous = self.end(&mut document).await?;
                match previous {
                    Some(previous) => {
                        info!(session_id = %previous.id, "Cascade expired");
                        Ok(SessionChange::Ended(previous))
                    }
                    None => Ok(SessionChange::Unchanged),
                }
            }
        }
    }
}
