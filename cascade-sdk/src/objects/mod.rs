pub mod ids;
pub mod interaction;
pub mod message;
pub mod worldstate;

pub use ids::{ChannelId, GuildId, MessageId, RoleId, UserId};
pub use interaction::{
    CommandData, CommandOption, ComponentData, Interaction, InteractionCallbackData,
    InteractionResponse, InteractionType, Member, ModalData, User,
};
pub use message::{
    ActionRow, Button, ButtonStyle, CreateMessage, EditMessage, Embed, EmbedFooter, Message,
    TextInput, TextInputStyle,
};
pub use worldstate::{ActiveMission, WorldState};
