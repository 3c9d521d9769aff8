//! Chat platform configuration.

use cascade_sdk::objects::UserId;
use cascade_sdk::signature::InteractionPublicKey;
use url::Url;

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// REST API root, ending with a slash.
    pub api_base: Url,
    /// Key used to verify signed interaction webhooks.
    pub public_key: InteractionPublicKey,
    /// The only user allowed to edit the whitelist.
    pub owner_id: Option<UserId>,
    /// Reject interactions from guilds outside the whitelist.
    pub enforce_whitelist: bool,
}
