//! Seams between the core and the outside world.
//!
//! The processors only talk to storage, the chat platform and the mission
//! feed through these traits, so every state transition can be driven in
//! tests with in-memory fakes.

use crate::entities::StateDocument;
use async_trait::async_trait;
use cascade_sdk::client::{ClientError, DiscordClient, WorldStateClient};
use cascade_sdk::objects::{ChannelId, CreateMessage, EditMessage, MessageId, WorldState};
use thiserror::Error;
use url::Url;

/// Errors that can occur while loading or persisting the state document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("state store is closed")]
    Closed,
}

/// Errors returned by a chat platform call.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The platform refused the call (missing permission, unknown channel).
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Errors returned by the mission feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("feed unavailable: {0}")]
    Unavailable(String),
}

/// Atomic access to the single state document.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<StateDocument, StoreError>;

    /// Replace the document. Implementations may persist lazily, but a
    /// subsequent `load` must observe the new value.
    async fn save(&self, document: StateDocument) -> Result<(), StoreError>;
}

/// The message operations the broadcaster needs.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn send_message(
        &self,
        channel: &ChannelId,
        message: &CreateMessage,
    ) -> Result<MessageId, PlatformError>;

    async fn edit_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        edit: &EditMessage,
    ) -> Result<(), PlatformError>;

    async fn delete_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<(), PlatformError>;
}

/// Source of world-state snapshots.
#[async_trait]
pub trait MissionFeed: Send + Sync {
    async fn fetch(&self, feed_url: &Url, user_agent: &str) -> Result<WorldState, FeedError>;
}

#[async_trait]
impl ChatPlatform for DiscordClient {
    async fn send_message(
        &self,
        channel: &ChannelId,
        message: &CreateMessage,
    ) -> Result<MessageId, PlatformError> {
        let posted = self.create_message(channel, message).await?;
        Ok(posted.id)
    }

    async fn edit_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        edit: &EditMessage,
    ) -> Result<(), PlatformError> {
        DiscordClient::edit_message(self, channel, message, edit).await?;
        Ok(())
    }

    async fn delete_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<(), PlatformError> {
        DiscordClient::delete_message(self, channel, message).await?;
        Ok(())
    }
}

#[async_trait]
impl MissionFeed for WorldStateClient {
    async fn fetch(&self, feed_url: &Url, user_agent: &str) -> Result<WorldState, FeedError> {
        Ok(WorldStateClient::fetch(self, feed_url, user_agent).await?)
    }
}
