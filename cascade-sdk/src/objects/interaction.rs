//! Incoming interaction payloads and the synchronous callback responses.
//!
//! Interactions arrive on the signed webhook endpoint. The `data` payload
//! differs per interaction kind, so it is kept as raw JSON and decoded on
//! demand through the typed accessors.

use crate::objects::ids::{ChannelId, GuildId, UserId};
use crate::objects::message::{ActionRow, Embed, Message};
use serde::{Deserialize, Serialize};

/// Message flag hiding a reply from everyone but the invoking user.
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "u8")]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    Autocomplete,
    ModalSubmit,
    Unknown(u8),
}

impl From<u8> for InteractionType {
    fn from(value: u8) -> Self {
        match value {
            1 => InteractionType::Ping,
            2 => InteractionType::ApplicationCommand,
            3 => InteractionType::MessageComponent,
            4 => InteractionType::Autocomplete,
            5 => InteractionType::ModalSubmit,
            other => InteractionType::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Member {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    #[serde(default)]
    pub token: String,
    pub guild_id: Option<GuildId>,
    pub channel_id: Option<ChannelId>,
    pub member: Option<Member>,
    pub user: Option<User>,
    pub message: Option<Message>,
    pub data: Option<serde_json::Value>,
}

impl Interaction {
    /// The invoking user, whether the interaction came from a guild or a DM.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .map(|m| &m.user)
            .or(self.user.as_ref())
    }

    pub fn command_data(&self) -> Option<CommandData> {
        self.decode_data()
    }

    pub fn component_data(&self) -> Option<ComponentData> {
        self.decode_data()
    }

    pub fn modal_data(&self) -> Option<ModalData> {
        self.decode_data()
    }

    fn decode_data<T: for<'de> Deserialize<'de>>(&self) -> Option<T> {
        let data = self.data.as_ref()?;
        serde_json::from_value(data.clone()).ok()
    }
}

/// Slash command invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

impl CommandData {
    pub fn option(&self, name: &str) -> Option<&CommandOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// First subcommand, if the command was invoked through one.
    pub fn subcommand(&self) -> Option<&CommandOption> {
        const SUB_COMMAND: u8 = 1;
        self.options.iter().find(|o| o.kind == SUB_COMMAND)
    }
}

impl CommandOption {
    pub fn option(&self, name: &str) -> Option<&CommandOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Snowflake and string options are both delivered as JSON strings.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref()?.as_str()
    }
}

/// Button click.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentData {
    pub custom_id: String,
}

/// Submitted modal with its text input values.
#[derive(Debug, Clone, Deserialize)]
pub struct ModalData {
    pub custom_id: String,
    #[serde(default)]
    pub components: Vec<ModalRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModalRow {
    #[serde(default)]
    pub components: Vec<ModalField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModalField {
    pub custom_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl ModalData {
    pub fn value(&self, custom_id: &str) -> Option<&str> {
        self.components
            .iter()
            .flat_map(|row| row.components.iter())
            .find(|field| field.custom_id == custom_id)
            .and_then(|field| field.value.as_deref())
    }
}

/// Synchronous reply to an interaction webhook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<InteractionCallbackData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionCallbackData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Embed>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ActionRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl InteractionResponse {
    const PONG: u8 = 1;
    const CHANNEL_MESSAGE: u8 = 4;
    const UPDATE_MESSAGE: u8 = 7;
    const MODAL: u8 = 9;

    pub fn pong() -> Self {
        Self {
            kind: Self::PONG,
            data: None,
        }
    }

    /// A reply only the invoking user can see.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            kind: Self::CHANNEL_MESSAGE,
            data: Some(InteractionCallbackData {
                content: Some(content.into()),
                flags: Some(EPHEMERAL_FLAG),
                ..Default::default()
            }),
        }
    }

    /// Replace the embeds of the message the component was attached to.
    pub fn update_embeds(embeds: Vec<Embed>) -> Self {
        Self {
            kind: Self::UPDATE_MESSAGE,
            data: Some(InteractionCallbackData {
                embeds: Some(embeds),
                ..Default::default()
            }),
        }
    }

    pub fn modal(custom_id: impl Into<String>, title: impl Into<String>, rows: Vec<ActionRow>) -> Self {
        Self {
            kind: Self::MODAL,
            data: Some(InteractionCallbackData {
                custom_id: Some(custom_id.into()),
                title: Some(title.into()),
                components: Some(rows),
                ..Default::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_submit_decoding() {
        let payload = r#"{
            "id": "1",
            "type": 5,
            "token": "tok",
            "guild_id": "10",
            "channel_id": "20",
            "member": { "user": { "id": "30", "username": "tenno" } },
            "message": { "id": "40", "channel_id": "20" },
            "data": {
                "custom_id": "ign_modal",
                "components": [
                    { "type": 1, "components": [ { "type": 4, "custom_id": "ign_input", "value": "Slowboat" } ] },
                    { "type": 1, "components": [ { "type": 4, "custom_id": "region_input", "value": " eu " } ] }
                ]
            }
        }"#;
        let interaction: Interaction = serde_json::from_str(payload).unwrap();
        assert_eq!(interaction.kind, InteractionType::ModalSubmit);
        assert_eq!(interaction.invoker().map(|u| u.id.as_str()), Some("30"));
        let modal = interaction.modal_data().unwrap();
        assert_eq!(modal.custom_id, "ign_modal");
        assert_eq!(modal.value("ign_input"), Some("Slowboat"));
        assert_eq!(modal.value("region_input"), Some(" eu "));
        assert_eq!(modal.value("missing"), None);
    }

    #[test]
    fn test_subcommand_options() {
        let payload = r#"{
            "id": "1", "type": 2,
            "user": { "id": "30" },
            "data": {
                "name": "whitelist",
                "options": [ { "name": "add", "type": 1, "options": [ { "name": "guild", "type": 3, "value": "99" } ] } ]
            }
        }"#;
        let interaction: Interaction = serde_json::from_str(payload).unwrap();
        let command = interaction.command_data().unwrap();
        let sub = command.subcommand().unwrap();
        assert_eq!(sub.name, "add");
        assert_eq!(sub.option("guild").and_then(CommandOption::as_str), Some("99"));
    }

    #[test]
    fn test_ephemeral_response_flags() {
        let json = serde_json::to_value(InteractionResponse::ephemeral("nope")).unwrap();
        assert_eq!(json["type"], 4);
        assert_eq!(json["data"]["flags"], 64);
        assert_eq!(json["data"]["content"], "nope");
    }
}
