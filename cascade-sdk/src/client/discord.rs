//! Bot REST client for posting, editing and deleting board messages.

use reqwest::Client;
use url::Url;

use super::{ClientError, error_for_status};
use crate::objects::ids::{ChannelId, MessageId};
use crate::objects::message::{CreateMessage, EditMessage, Message};

/// Default REST API root. Must end with a slash so relative joins keep the
/// version segment.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10/";

/// Typed HTTP client for the chat platform's bot REST API.
///
/// Every request is authenticated with `Authorization: Bot {token}`.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl DiscordClient {
    /// Create a new `DiscordClient`.
    ///
    /// * `base_url` – API root, normally [`DEFAULT_API_BASE`].
    /// * `token` – bot token, without the `Bot ` prefix.
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }

    fn message_url(&self, channel: &ChannelId, message: &MessageId) -> Result<Url, ClientError> {
        Ok(self
            .base_url
            .join(&format!("channels/{channel}/messages/{message}"))?)
    }

    /// `POST /channels/{channel}/messages` – post a new message.
    pub async fn create_message(
        &self,
        channel: &ChannelId,
        payload: &CreateMessage,
    ) -> Result<Message, ClientError> {
        let url = self.base_url.join(&format!("channels/{channel}/messages"))?;

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(payload)
            .send()
            .await?;

        let resp = error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    /// `PATCH /channels/{channel}/messages/{message}` – edit a posted message.
    pub async fn edit_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        payload: &EditMessage,
    ) -> Result<Message, ClientError> {
        let url = self.message_url(channel, message)?;

        let resp = self
            .http
            .patch(url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(payload)
            .send()
            .await?;

        let resp = error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    /// `DELETE /channels/{channel}/messages/{message}` – delete a posted message.
    pub async fn delete_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<(), ClientError> {
        let url = self.message_url(channel, message)?;

        let resp = self
            .http
            .delete(url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await?;

        error_for_status(resp).await?;
        Ok(())
    }
}
