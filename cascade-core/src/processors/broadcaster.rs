//! Broadcaster.
//!
//! Keeps every announcement of the active session showing the same board:
//! - fan-out posts a fresh board to each registered server when a session
//!   starts
//! - fan-in pushes an updated board to every announcement except the one
//!   whose interaction already got the new view
//! - teardown deletes the announcements of a session that is going away
//!
//! Every per-channel call runs concurrently and fails on its own. Failures
//! are logged and never roll anything back.

use crate::entities::{Announcement, Participant, ServerRegistration, Session, Squad};
use crate::framework::ChatPlatform;
use crate::matchmaker::select_host;
use crate::utils::board::{announcement_message, board_embed, host_announcement, render_board};
use cascade_sdk::objects::{ChannelId, EditMessage, GuildId, MessageId};
use futures_util::future::join_all;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct Broadcaster {
    platform: Arc<dyn ChatPlatform>,
}

impl Broadcaster {
    pub fn new(platform: Arc<dyn ChatPlatform>) -> Self {
        Self { platform }
    }

    /// Post the initial board to every registered server.
    ///
    /// Returns one announcement per successful post, in registration order.
    pub async fn fan_out(
        &self,
        session: &Session,
        servers: &BTreeMap<GuildId, ServerRegistration>,
    ) -> Vec<Announcement> {
        let posts = servers.iter().map(|(guild_id, registration)| async move {
            let message = announcement_message(session, registration);
            match self
                .platform
                .send_message(&registration.channel_id, &message)
                .await
            {
                Ok(message_id) => {
                    debug!(%guild_id, channel_id = %registration.channel_id, "Posted board");
                    Some(Announcement {
                        guild_id: guild_id.clone(),
                        channel_id: registration.channel_id.clone(),
                        message_id,
                    })
                }
                Err(e) => {
                    warn!(
                        %guild_id,
                        channel_id = %registration.channel_id,
                        error = %e,
                        "Failed to post board, skipping server"
                    );
                    None
                }
            }
        });

        let announcements: Vec<Announcement> =
            join_all(posts).await.into_iter().flatten().collect();
        info!(
            session_id = %session.id,
            posted = announcements.len(),
            registered = servers.len(),
            "Fan-out complete"
        );
        announcements
    }

    /// Push the current board to every announcement except `origin`.
    ///
    /// Returns how many announcements were updated.
    pub async fn fan_in(
        &self,
        session: &Session,
        squads: &[Squad],
        origin: Option<&MessageId>,
    ) -> usize {
        let edit = EditMessage {
            content: None,
            embeds: Some(vec![board_embed(&session.label, render_board(squads))]),
        };

        let edits = session
            .announcements
            .iter()
            .filter(|a| Some(&a.message_id) != origin)
            .map(|announcement| {
                let edit = &edit;
                async move {
                    self.platform
                        .edit_message(&announcement.channel_id, &announcement.message_id, edit)
                        .await
                        .map_err(|e| {
                            warn!(
                                guild_id = %announcement.guild_id,
                                message_id = %announcement.message_id,
                                error = %e,
                                "Failed to sync board"
                            );
                        })
                        .is_ok()
                }
            });

        let updated = join_all(edits).await.into_iter().filter(|ok| *ok).count();
        debug!(session_id = %session.id, updated, "Fan-in complete");
        updated
    }

    /// Delete every announcement. Returns how many deletions succeeded.
    pub async fn teardown(&self, announcements: &[Announcement]) -> usize {
        let deletions = announcements.iter().map(|announcement| async move {
            self.platform
                .delete_message(&announcement.channel_id, &announcement.message_id)
                .await
                .map_err(|e| {
                    warn!(
                        guild_id = %announcement.guild_id,
                        message_id = %announcement.message_id,
                        error = %e,
                        "Failed to delete announcement"
                    );
                })
                .is_ok()
        });

        let deleted = join_all(deletions)
            .await
            .into_iter()
            .filter(|ok| *ok)
            .count();
        info!(
            deleted,
            attempted = announcements.len(),
            "Teardown complete"
        );
        deleted
    }

    /// Tell each distinct origin channel of a full squad who should host.
    ///
    /// Does nothing for an empty squad.
    pub async fn announce_host(&self, squad: &Squad) {
        let Some(host) = select_host(squad) else {
            return;
        };
        info!(host = %host.name, region = %host.region, "Squad filled");

        let channels: Vec<&ChannelId> = squad
            .members()
            .iter()
            .map(|m| &m.channel_id)
            .unique()
            .collect();

        let sends = channels.into_iter().map(|channel_id| {
            let members: Vec<&Participant> = squad
                .members()
                .iter()
                .filter(|m| &m.channel_id == channel_id)
                .collect();
            let message = host_announcement(&members, host);
            async move {
                if let Err(e) = self.platform.send_message(channel_id, &message).await {
                    warn!(%channel_id, error = %e, "Failed to announce host");
                }
            }
        });
        join_all(sends).await;
    }
}
