//! Board rendering.
//!
//! Every announcement shows the same text, regenerated from the squad list
//! whenever membership changes.

use crate::entities::{Participant, SQUAD_CAPACITY, ServerRegistration, Session, Squad};
use cascade_sdk::objects::{ActionRow, Button, ButtonStyle, CreateMessage, Embed, EmbedFooter};
use std::fmt::Write;

pub const BOARD_BUTTON_ID: &str = "board";
pub const LEAVE_BUTTON_ID: &str = "leave";
pub const JOIN_MODAL_ID: &str = "ign_modal";
pub const NAME_INPUT_ID: &str = "ign_input";
pub const REGION_INPUT_ID: &str = "region_input";

const BOARD_COLOR: u32 = 0x9b59b6;
const BOARD_FOOTER: &str = "Cascade Level Cap LFG";
const BOARD_HEADER: &str =
    "Click **'Board'** below to register your IGN and Region in the cross-server LFG.\n\n";

/// Render the squad list as the embed description.
pub fn render_board(squads: &[Squad]) -> String {
    let mut text = String::from(BOARD_HEADER);
    if squads.is_empty() {
        text.push_str("**Squad 1**\n*Empty*");
        return text;
    }

    for (index, squad) in squads.iter().enumerate() {
        let _ = writeln!(text, "**Squad {}**", index + 1);
        for member in squad.members() {
            let _ = writeln!(text, "• {} [{}]", member.name, member.region);
        }
        if squad.len() < SQUAD_CAPACITY {
            let _ = writeln!(text, "*...and {} open slot(s)*", squad.open_slots());
        }
        text.push('\n');
    }
    text
}

pub fn board_embed(label: &str, board_text: String) -> Embed {
    Embed {
        title: Some(format!("Mission: {label}")),
        description: Some(board_text),
        color: Some(BOARD_COLOR),
        footer: Some(EmbedFooter {
            text: BOARD_FOOTER.to_owned(),
        }),
    }
}

pub fn board_components() -> Vec<ActionRow> {
    vec![ActionRow::buttons([
        Button::new(BOARD_BUTTON_ID, "Board", ButtonStyle::Success),
        Button::new(LEAVE_BUTTON_ID, "Leave", ButtonStyle::Danger),
    ])]
}

/// The fresh board posted to one registered server when a cascade starts.
pub fn announcement_message(session: &Session, registration: &ServerRegistration) -> CreateMessage {
    let expiry = session.expiry.unix_timestamp();
    let ping = registration
        .role_id
        .as_ref()
        .map(|role| format!("<@&{role}>\n"))
        .unwrap_or_default();

    CreateMessage {
        content: Some(format!(
            "{ping}**Cascade up till** <t:{expiry}:t>. <t:{expiry}:R> remaining."
        )),
        embeds: vec![board_embed(&session.label, render_board(&[]))],
        components: board_components(),
    }
}

/// Notice sent to one origin channel once a squad fills up.
pub fn host_announcement(members: &[&Participant], host: &Participant) -> CreateMessage {
    let pings = members
        .iter()
        .map(|m| format!("<@{}>", m.id))
        .collect::<Vec<_>>()
        .join(" ");
    CreateMessage::text(format!(
        "**Squad Filled!**\n{pings}\n**{}** [{}] is the optimal host. Please expect an invite or `/w` them in-game.",
        host.name, host.region
    ))
}
