//! World-state feed client.

use reqwest::Client;
use url::Url;

use super::{ClientError, error_for_status};
use crate::objects::worldstate::WorldState;

/// Fetches the public world-state document.
///
/// The feed location is passed per call so a config reload can move it
/// without rebuilding the client.
#[derive(Debug, Clone, Default)]
pub struct WorldStateClient {
    http: Client,
}

impl WorldStateClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET {feed_url}` – fetch and decode the current world state.
    pub async fn fetch(&self, feed_url: &Url, user_agent: &str) -> Result<WorldState, ClientError> {
        let resp = self
            .http
            .get(feed_url.clone())
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await?;

        let resp = error_for_status(resp).await?;
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
