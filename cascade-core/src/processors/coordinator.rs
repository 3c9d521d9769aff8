//! Coordinator.
//!
//! The only task that mutates the state document. Poll signals and user
//! commands arrive on one queue and are handled strictly in order. A user
//! command gets its reply as soon as the change is saved; the coordinator
//! then finishes the board sync for that command before it takes the next
//! one.

use super::broadcaster::Broadcaster;
use super::lobby::Lobby;
use super::session_machine::SessionMachine;
use crate::entities::ServerRegistration;
use crate::events::{
    BoardView, Command, CommandReceiver, CommandSender, CoordinatorError, JoinReply, JoinRequest,
    LeaveRequest, PollSignal, Reply, SessionChange, WhitelistAction,
};
use crate::framework::{ChatPlatform, StateStore};
use cascade_sdk::objects::GuildId;
use kanau::processor::Processor;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info};

pub struct Coordinator {
    machine: SessionMachine,
    lobby: Lobby,
}

impl Coordinator {
    pub fn new(store: Arc<dyn StateStore>, platform: Arc<dyn ChatPlatform>) -> Self {
        let broadcaster = Broadcaster::new(platform);
        Self {
            machine: SessionMachine::new(Arc::clone(&store), broadcaster.clone()),
            lobby: Lobby::new(store, broadcaster),
        }
    }

    /// Handle commands until shutdown is signaled, then drain whatever is
    /// still queued.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>, mut commands: CommandReceiver) {
        info!("Coordinator started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Coordinator received shutdown signal");
                        break;
                    }
                }

                command = commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => {
                        info!("Command channel closed");
                        break;
                    }
                },
            }
        }

        commands.close();
        let mut drained = 0usize;
        while let Some(command) = commands.recv().await {
            self.handle(command).await;
            drained += 1;
        }

        info!(drained, "Coordinator shutdown complete");
    }

    pub async fn handle(&self, command: Command) {
        match command {
            Command::Poll { signal, reply } => {
                let result = self.machine.process(signal).await;
                if let Err(e) = &result {
                    error!(error = %e, "Failed to apply poll signal");
                }
                let _ = reply.send(result.map_err(CoordinatorError::from));
            }
            Command::Join { request, reply } => match self.lobby.process(request).await {
                Ok(applied) => {
                    let _ = reply.send(Ok(applied.reply));
                    self.lobby.sync(applied.sync).await;
                }
                Err(e) => {
                    debug!(error = %e, "Join refused");
                    let _ = reply.send(Err(e));
                }
            },
            Command::Leave { request, reply } => match self.lobby.process(request).await {
                Ok(applied) => {
                    let _ = reply.send(Ok(applied.reply));
                    self.lobby.sync(applied.sync).await;
                }
                Err(e) => {
                    debug!(error = %e, "Leave refused");
                    let _ = reply.send(Err(e));
                }
            },
            Command::RegisterServer {
                guild,
                registration,
                reply,
            } => {
                let result = self.lobby.register_server(guild, registration).await;
                let _ = reply.send(result.map_err(CoordinatorError::from));
            }
            Command::Whitelist {
                guild,
                action,
                reply,
            } => {
                let result = self.lobby.set_whitelisted(guild, action).await;
                let _ = reply.send(result.map_err(CoordinatorError::from));
            }
        }
    }
}

/// Cloneable front door to a running [`Coordinator`].
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: CommandSender,
}

impl CoordinatorHandle {
    pub fn new(commands: CommandSender) -> Self {
        Self { commands }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| CoordinatorError::Stopped)?;
        reply_rx.await.map_err(|_| CoordinatorError::Stopped)?
    }

    pub async fn poll(&self, signal: PollSignal) -> Result<SessionChange, CoordinatorError> {
        self.request(|reply| Command::Poll { signal, reply }).await
    }

    pub async fn join(&self, request: JoinRequest) -> Result<JoinReply, CoordinatorError> {
        self.request(|reply| Command::Join { request, reply }).await
    }

    pub async fn leave(&self, request: LeaveRequest) -> Result<BoardView, CoordinatorError> {
        self.request(|reply| Command::Leave { request, reply }).await
    }

    pub async fn register_server(
        &self,
        guild: GuildId,
        registration: ServerRegistration,
    ) -> Result<(), CoordinatorError> {
        self.request(|reply| Command::RegisterServer {
            guild,
            registration,
            reply,
        })
        .await
    }

    pub async fn whitelist(
        &self,
        guild: GuildId,
        action: WhitelistAction,
    ) -> Result<bool, CoordinatorError> {
        self.request(|reply| Command::Whitelist {
            guild,
            action,
            reply,
        })
        .await
    }
}
