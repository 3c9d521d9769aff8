//! The whole persisted state.
//!
//! Field names match the on-disk JSON written by earlier deployments, so an
//! existing `data.json` loads without migration.

use crate::entities::participant::Participant;
use crate::entities::session::{ServerRegistration, Session};
use crate::entities::squad::Squad;
use cascade_sdk::objects::{GuildId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDocument {
    #[serde(default, alias = "activeSession")]
    pub active_cascade: Option<Session>,
    #[serde(default)]
    pub squads: Vec<Squad>,
    #[serde(default)]
    pub servers: BTreeMap<GuildId, ServerRegistration>,
    #[serde(default, alias = "whitelistedEndpoints")]
    pub whitelisted_servers: BTreeSet<GuildId>,
}

/// Position of a member: `(squad index, slot index)`.
pub type SlotPosition = (usize, usize);

impl StateDocument {
    pub fn locate(&self, id: &UserId) -> Option<SlotPosition> {
        self.squads
            .iter()
            .enumerate()
            .find_map(|(i, squad)| squad.position(id).map(|slot| (i, slot)))
    }

    pub fn find_member(&self, id: &UserId) -> Option<&Participant> {
        let (squad, slot) = self.locate(id)?;
        self.squads.get(squad)?.members().get(slot)
    }

    /// Drop the session and every squad formed under it.
    pub fn clear_session(&mut self) -> Option<Session> {
        self.squads.clear();
        self.active_cascade.take()
    }

    pub fn is_whitelisted(&self, guild: &GuildId) -> bool {
        self.whitelisted_servers.contains(guild)
    }
}
