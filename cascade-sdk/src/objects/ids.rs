//! Snowflake identifiers used by the chat platform.
//!
//! Snowflakes travel as decimal strings on the wire. They are short enough
//! to stay inline in a [`CompactString`], so cloning an id never allocates.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub CompactString);

        impl $name {
            pub fn new(id: impl Into<CompactString>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(CompactString::from(value))
            }
        }
    };
}

snowflake!(
    /// A guild (community server) id.
    GuildId
);
snowflake!(
    /// A text channel id.
    ChannelId
);
snowflake!(
    /// A posted message id.
    MessageId
);
snowflake!(
    /// A user id.
    UserId
);
snowflake!(
    /// A role id.
    RoleId
);
