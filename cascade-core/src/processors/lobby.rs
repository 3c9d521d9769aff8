//! Lobby: squad membership and server bookkeeping.
//!
//! A join or leave is applied in two phases. [`Processor::process`]
//! validates, mutates and saves the document and returns the reply for the
//! originating interaction together with a [`BoardSync`]. The caller sends
//! the reply first and then runs [`Lobby::sync`] to bring the other
//! announcements up to date.

use super::broadcaster::Broadcaster;
use crate::entities::{MAX_NAME_LEN, Participant, ServerRegistration, Session, Squad, StateDocument};
use crate::events::{
    BoardView, CoordinatorError, JoinRejection, JoinReply, JoinRequest, LeaveRequest,
    WhitelistAction,
};
use crate::framework::{StateStore, StoreError};
use crate::matchmaker::place_candidate;
use crate::utils::board::render_board;
use cascade_sdk::objects::{GuildId, MessageId};
use compact_str::CompactString;
use kanau::processor::Processor;
use std::sync::Arc;
use tracing::{debug, info};

/// Follow-up work after a membership change has been saved.
#[derive(Debug, Clone)]
pub struct BoardSync {
    pub session: Session,
    pub squads: Vec<Squad>,
    pub origin: Option<MessageId>,
    /// Set when this change filled a squad.
    pub filled: Option<Squad>,
}

/// Output of a membership change: the reply plus the deferred sync.
#[derive(Debug, Clone)]
pub struct Applied<T> {
    pub reply: T,
    pub sync: BoardSync,
}

pub struct Lobby {
    store: Arc<dyn StateStore>,
    broadcaster: Broadcaster,
}

/// Trim and length-check a display name.
pub fn validate_name(raw: &str) -> Result<CompactString, JoinRejection> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(JoinRejection::InvalidName { max: MAX_NAME_LEN });
    }
    Ok(CompactString::from(name))
}

fn board_view(session: &Session, squads: &[Squad]) -> BoardView {
    BoardView {
        label: session.label.clone(),
        text: render_board(squads),
    }
}

fn active_session(document: &StateDocument) -> Result<Session, JoinRejection> {
    document
        .active_cascade
        .clone()
        .ok_or(JoinRejection::NoActiveSession)
}

impl Lobby {
    pub fn new(store: Arc<dyn StateStore>, broadcaster: Broadcaster) -> Self {
        Self { store, broadcaster }
    }

    /// Propagate a saved change to the other announcements and, if a squad
    /// filled, announce its host.
    pub async fn sync(&self, sync: BoardSync) {
        let fan_in = self
            .broadcaster
            .fan_in(&sync.session, &sync.squads, sync.origin.as_ref());
        match &sync.filled {
            Some(squad) => {
                tokio::join!(fan_in, self.broadcaster.announce_host(squad));
            }
            None => {
                fan_in.await;
            }
        }
    }

    /// Register or replace the board channel of a guild.
    pub async fn register_server(
        &self,
        guild: GuildId,
        registration: ServerRegistration,
    ) -> Result<(), StoreError> {
        let mut document = self.store.load().await?;
        info!(guild_id = %guild, channel_id = %registration.channel_id, "Registering server");
        document.servers.insert(guild, registration);
        self.store.save(document).await
    }

    /// Add or remove a guild from the whitelist. Returns whether the set changed.
    pub async fn set_whitelisted(
        &self,
        guild: GuildId,
        action: WhitelistAction,
    ) -> Result<bool, StoreError> {
        let mut document = self.store.load().await?;
        let changed = match action {
            WhitelistAction::Add => document.whitelisted_servers.insert(guild.clone()),
            WhitelistAction::Remove => document.whitelisted_servers.remove(&guild),
        };
        if changed {
            info!(guild_id = %guild, ?action, "Whitelist updated");
            self.store.save(document).await?;
        }
        Ok(changed)
    }
}

impl Processor<JoinRequest> for Lobby {
    type Output = Applied<JoinReply>;
    type Error = CoordinatorError;

    async fn process(&self, request: JoinRequest) -> Result<Applied<JoinReply>, CoordinatorError> {
        let name = validate_name(&request.name)?;
        let mut document = self.store.load().await?;
        let session = active_session(&document)?;

        let (updated_in_place, filled) = match document.locate(&request.user) {
            Some((squad_index, member_index)) => {
                if let Some(member) = document.squads[squad_index].member_mut(member_index) {
                    member.name = name;
                    member.region = request.region;
                }
                debug!(user_id = %request.user, squad_index, "Updated member in place");
                (true, None)
            }
            None => {
                let candidate = Participant {
                    id: request.user.clone(),
                    name,
                    region: request.region,
                    channel_id: request.channel.clone(),
                };
                let placement = place_candidate(&mut document.squads, candidate);
                info!(
                    user_id = %request.user,
                    region = %request.region,
                    squad_index = placement.squad_index,
                    opened_new_squad = placement.opened_new_squad,
                    "Placed participant"
                );
                let filled = placement
                    .filled
                    .then(|| document.squads[placement.squad_index].clone());
                (false, filled)
            }
        };

        let view = board_view(&session, &document.squads);
        let squads = document.squads.clone();
        self.store.save(document).await?;

        Ok(Applied {
            reply: JoinReply {
                view,
                updated_in_place,
            },
            sync: BoardSync {
                session,
                squads,
                origin: request.origin,
                filled,
            },
        })
    }
}

impl Processor<LeaveRequest> for Lobby {
    type Output = Applied<BoardView>;
    type Error = CoordinatorError;

    async fn process(&self, request: LeaveRequest) -> Result<Applied<BoardView>, CoordinatorError> {
        let mut document = self.store.load().await?;
        let session = active_session(&document)?;
        let (squad_index, member_index) = document
            .locate(&request.user)
            .ok_or(JoinRejection::NotInSquad)?;

        let squad = &mut document.squads[squad_index];
        squad.remove(member_index);
        if squad.is_empty() {
            document.squads.remove(squad_index);
        }
        info!(user_id = %request.user, squad_index, "Participant left");

        let view = board_view(&session, &document.squads);
        let squads = document.squads.clone();
        self.store.save(document).await?;

        Ok(Applied {
            reply: view,
            sync: BoardSync {
                session,
                squads,
                origin: request.origin,
                filled: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_trimmed() {
        assert_eq!(validate_name("  Tenno  ").unwrap(), "Tenno");
    }

    #[test]
    fn test_empty_and_long_names_are_rejected() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }
}
