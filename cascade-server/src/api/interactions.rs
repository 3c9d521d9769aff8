//! Interaction webhook handler.
//!
//! # Endpoint
//!
//! - `POST /interactions` – signed interaction callbacks from the chat platform
//!
//! Buttons, the join modal and the two slash commands are translated into
//! coordinator commands here. User mistakes come back as ephemeral replies;
//! only infrastructure failures turn into error statuses.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use cascade_core::entities::{MAX_NAME_LEN, Region, ServerRegistration};
use cascade_core::events::{
    CoordinatorError, JoinRejection, JoinRequest, LeaveRequest, WhitelistAction,
};
use cascade_core::utils::board::{
    BOARD_BUTTON_ID, JOIN_MODAL_ID, LEAVE_BUTTON_ID, NAME_INPUT_ID, REGION_INPUT_ID,
};
use cascade_sdk::objects::{
    ActionRow, ChannelId, CommandData, GuildId, Interaction, InteractionResponse,
    InteractionType, RoleId, TextInput, UserId,
};
use itertools::Itertools;
use tracing::{debug, error, info};

use crate::api::extractors::VerifiedInteraction;
use crate::state::AppState;

const SETUP_COMMAND: &str = "setup";
const WHITELIST_COMMAND: &str = "whitelist";

const NO_ACTIVE_CASCADE: &str = "There is no active cascade right now. Boards open as soon as one is detected.";
const NOT_IN_SQUAD: &str = "You aren't currently in any squads!";
const NOT_WHITELISTED: &str = "This server is not authorized to use this bot.";
const OWNER_ONLY: &str = "Only the bot owner can manage the whitelist.";
const GUILD_ONLY: &str = "This command can only be used inside a server.";

/// Build the interaction router.
pub fn router() -> Router<AppState> {
    Router::new().route("/interactions", post(handle_interaction))
}

/// Failures that cannot be expressed as an ephemeral reply.
#[derive(Debug, thiserror::Error)]
pub enum InteractionApiError {
    #[error("unsupported interaction")]
    Unsupported,
    #[error("interaction is missing {0}")]
    MissingField(&'static str),
    #[error("state store error: {0}")]
    Store(#[from] cascade_core::framework::StoreError),
    #[error("coordinator unavailable")]
    Unavailable,
}

impl IntoResponse for InteractionApiError {
    fn into_response(self) -> Response {
        let status = match self {
            InteractionApiError::Unsupported | InteractionApiError::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }
            InteractionApiError::Store(ref e) => {
                error!(error = %e, "Failed to read state for interaction");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            InteractionApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, self.to_string()).into_response()
    }
}

type ApiResult = Result<Json<InteractionResponse>, InteractionApiError>;

fn ephemeral(content: impl Into<String>) -> ApiResult {
    Ok(Json(InteractionResponse::ephemeral(content)))
}

/// Map a coordinator failure to a reply, or to an error for infra failures.
fn rejection(err: CoordinatorError) -> ApiResult {
    match err {
        CoordinatorError::Rejected(JoinRejection::NoActiveSession) => ephemeral(NO_ACTIVE_CASCADE),
        CoordinatorError::Rejected(JoinRejection::NotInSquad) => ephemeral(NOT_IN_SQUAD),
        CoordinatorError::Rejected(JoinRejection::InvalidName { max }) => {
            ephemeral(format!("Your IGN must be between 1 and {max} characters."))
        }
        CoordinatorError::Store(e) => {
            error!(error = %e, "Coordinator failed to persist state");
            Err(InteractionApiError::Unavailable)
        }
        CoordinatorError::Stopped => Err(InteractionApiError::Unavailable),
    }
}

fn invoker(interaction: &Interaction) -> Result<UserId, InteractionApiError> {
    interaction
        .invoker()
        .map(|user| user.id.clone())
        .ok_or(InteractionApiError::MissingField("user"))
}

/// `POST /interactions`
async fn handle_interaction(
    State(state): State<AppState>,
    VerifiedInteraction(interaction): VerifiedInteraction,
) -> ApiResult {
    if interaction.kind == InteractionType::Ping {
        return Ok(Json(InteractionResponse::pong()));
    }

    if !is_allowed(&state, &interaction).await? {
        debug!(guild_id = ?interaction.guild_id, "Interaction from non-whitelisted guild");
        return ephemeral(NOT_WHITELISTED);
    }

    match interaction.kind {
        InteractionType::MessageComponent => {
            let data = interaction
                .component_data()
                .ok_or(InteractionApiError::MissingField("data"))?;
            match data.custom_id.as_str() {
                BOARD_BUTTON_ID => open_join_modal(&state, &interaction).await,
                LEAVE_BUTTON_ID => leave(&state, &interaction).await,
                _ => Err(InteractionApiError::Unsupported),
            }
        }
        InteractionType::ModalSubmit => submit_join(&state, &interaction).await,
        InteractionType::ApplicationCommand => {
            let data = interaction
                .command_data()
                .ok_or(InteractionApiError::MissingField("data"))?;
            match data.name.as_str() {
                SETUP_COMMAND => setup(&state, &interaction, &data).await,
                WHITELIST_COMMAND => whitelist(&state, &interaction, &data).await,
                _ => Err(InteractionApiError::Unsupported),
            }
        }
        _ => Err(InteractionApiError::Unsupported),
    }
}

/// Whitelist gate. The owner's `whitelist` command always passes so a
/// fresh deployment can be bootstrapped.
async fn is_allowed(state: &AppState, interaction: &Interaction) -> Result<bool, InteractionApiError> {
    let discord = state.config.discord.read().await;
    if !discord.enforce_whitelist {
        return Ok(true);
    }
    let is_owner = match (&discord.owner_id, interaction.invoker()) {
        (Some(owner), Some(user)) => *owner == user.id,
        _ => false,
    };
    drop(discord);

    let is_whitelist_command = interaction.kind == InteractionType::ApplicationCommand
        && interaction
            .command_data()
            .is_some_and(|data| data.name == WHITELIST_COMMAND);
    if is_owner && is_whitelist_command {
        return Ok(true);
    }

    let Some(guild_id) = &interaction.guild_id else {
        return Ok(false);
    };
    Ok(state.store.load().await?.is_whitelisted(guild_id))
}

/// Board button: show the join form, prefilled when the user already
/// holds a slot.
async fn open_join_modal(state: &AppState, interaction: &Interaction) -> ApiResult {
    let user = invoker(interaction)?;
    let document = state.store.load().await?;
    if document.active_cascade.is_none() {
        return ephemeral(NO_ACTIVE_CASCADE);
    }

    let current = document.find_member(&user);
    let title = if current.is_some() {
        "Update Info"
    } else {
        "Join the Global LFG"
    };

    let name = TextInput::short(NAME_INPUT_ID, "In-Game Name (IGN)")
        .placeholder("Your Warframe username")
        .max_length(MAX_NAME_LEN as u16)
        .value(current.map(|m| m.name.to_string()));
    let region = TextInput::short(
        REGION_INPUT_ID,
        format!("Region ({})", Region::ALL.iter().join(", ")),
    )
    .placeholder("NA")
    .max_length(4)
    .value(current.map(|m| m.region.code().to_owned()));

    Ok(Json(InteractionResponse::modal(
        JOIN_MODAL_ID,
        title,
        vec![ActionRow::text_input(name), ActionRow::text_input(region)],
    )))
}

async fn submit_join(state: &AppState, interaction: &Interaction) -> ApiResult {
    let data = interaction
        .modal_data()
        .ok_or(InteractionApiError::MissingField("data"))?;
    if data.custom_id != JOIN_MODAL_ID {
        return Err(InteractionApiError::Unsupported);
    }

    let raw_region = data.value(REGION_INPUT_ID).unwrap_or_default();
    let Ok(region) = raw_region.parse::<Region>() else {
        return ephemeral(format!(
            "Invalid region! Please use one of: {}",
            Region::ALL.iter().join(", ")
        ));
    };

    let request = JoinRequest {
        user: invoker(interaction)?,
        name: data.value(NAME_INPUT_ID).unwrap_or_default().to_owned(),
        region,
        channel: interaction
            .channel_id
            .clone()
            .ok_or(InteractionApiError::MissingField("channel_id"))?,
        origin: interaction.message.as_ref().map(|m| m.id.clone()),
    };

    match state.coordinator.join(request).await {
        Ok(reply) => Ok(Json(InteractionResponse::update_embeds(vec![
            reply.view.embed(),
        ]))),
        Err(e) => rejection(e),
    }
}

async fn leave(state: &AppState, interaction: &Interaction) -> ApiResult {
    let request = LeaveRequest {
        user: invoker(interaction)?,
        origin: interaction.message.as_ref().map(|m| m.id.clone()),
    };
    match state.coordinator.leave(request).await {
        Ok(view) => Ok(Json(InteractionResponse::update_embeds(vec![view.embed()]))),
        Err(e) => rejection(e),
    }
}

/// `/setup channel:<channel> [role:<role>]`
async fn setup(state: &AppState, interaction: &Interaction, data: &CommandData) -> ApiResult {
    let Some(guild_id) = interaction.guild_id.clone() else {
        return ephemeral(GUILD_ONLY);
    };
    let channel_id = data
        .option("channel")
        .and_then(|o| o.as_str())
        .map(ChannelId::from)
        .ok_or(InteractionApiError::MissingField("channel option"))?;
    let role_id = data.option("role").and_then(|o| o.as_str()).map(RoleId::from);

    let registration = ServerRegistration {
        channel_id: channel_id.clone(),
        role_id: role_id.clone(),
    };
    match state.coordinator.register_server(guild_id.clone(), registration).await {
        Ok(()) => {
            info!(%guild_id, %channel_id, "Server registered via command");
            let ping = role_id
                .map(|role| format!(" New cascades will ping <@&{role}>."))
                .unwrap_or_default();
            ephemeral(format!("Cascade boards will be posted in <#{channel_id}>.{ping}"))
        }
        Err(e) => rejection(e),
    }
}

/// `/whitelist add|remove guild:<id>`, owner only.
async fn whitelist(state: &AppState, interaction: &Interaction, data: &CommandData) -> ApiResult {
    let owner = state.config.discord.read().await.owner_id.clone();
    let user = invoker(interaction)?;
    if owner.as_ref() != Some(&user) {
        return ephemeral(OWNER_ONLY);
    }

    let sub = data
        .subcommand()
        .ok_or(InteractionApiError::MissingField("subcommand"))?;
    let action = match sub.name.as_str() {
        "add" => WhitelistAction::Add,
        "remove" => WhitelistAction::Remove,
        _ => return Err(InteractionApiError::Unsupported),
    };
    let guild = sub
        .option("guild")
        .and_then(|o| o.as_str())
        .map(|id| GuildId::from(id.trim()))
        .ok_or(InteractionApiError::MissingField("guild option"))?;

    match state.coordinator.whitelist(guild.clone(), action).await {
        Ok(changed) => ephemeral(match (action, changed) {
            (WhitelistAction::Add, true) => format!("Server `{guild}` added to the whitelist."),
            (WhitelistAction::Add, false) => format!("Server `{guild}` is already whitelisted."),
            (WhitelistAction::Remove, true) => {
                format!("Server `{guild}` removed from the whitelist.")
            }
            (WhitelistAction::Remove, false) => format!("Server `{guild}` was not whitelisted."),
        }),
        Err(e) => rejection(e),
    }
}
