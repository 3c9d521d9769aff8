#![allow(dead_code)]

use async_trait::async_trait;
use cascade_core::config::PollerConfig;
use cascade_core::entities::{Region, ServerRegistration, StateDocument};
use cascade_core::events::{JoinRequest, PollSignal, command_channel};
use cascade_core::framework::{ChatPlatform, FeedError, MissionFeed, PlatformError};
use cascade_core::processors::{Coordinator, CoordinatorHandle};
use cascade_core::store::MemoryStore;
use cascade_sdk::objects::{
    ChannelId, CreateMessage, EditMessage, GuildId, MessageId, UserId, WorldState,
};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Send {
        channel: ChannelId,
        message: MessageId,
        content: Option<String>,
    },
    Edit {
        channel: ChannelId,
        message: MessageId,
    },
    Delete {
        channel: ChannelId,
        message: MessageId,
    },
}

/// Chat platform fake that records every successful call in order.
#[derive(Default)]
pub struct RecordingPlatform {
    ops: Mutex<Vec<Op>>,
    failing: Mutex<HashSet<ChannelId>>,
    next_id: AtomicU64,
}

impl RecordingPlatform {
    pub fn fail_channel(&self, channel: &str) {
        self.failing.lock().unwrap().insert(ChannelId::from(channel));
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    pub fn sends(&self) -> Vec<Op> {
        self.ops()
            .into_iter()
            .filter(|op| matches!(op, Op::Send { .. }))
            .collect()
    }

    pub fn edits(&self) -> Vec<MessageId> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Edit { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<MessageId> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Delete { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    fn check(&self, channel: &ChannelId) -> Result<(), PlatformError> {
        if self.failing.lock().unwrap().contains(channel) {
            return Err(PlatformError::Rejected("Missing Access".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn send_message(
        &self,
        channel: &ChannelId,
        message: &CreateMessage,
    ) -> Result<MessageId, PlatformError> {
        self.check(channel)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let message_id = MessageId::from(format!("msg-{id}").as_str());
        self.ops.lock().unwrap().push(Op::Send {
            channel: channel.clone(),
            message: message_id.clone(),
            content: message.content.clone(),
        });
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        _edit: &EditMessage,
    ) -> Result<(), PlatformError> {
        self.check(channel)?;
        self.ops.lock().unwrap().push(Op::Edit {
            channel: channel.clone(),
            message: message.clone(),
        });
        Ok(())
    }

    async fn delete_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<(), PlatformError> {
        self.check(channel)?;
        self.ops.lock().unwrap().push(Op::Delete {
            channel: channel.clone(),
            message: message.clone(),
        });
        Ok(())
    }
}

/// Feed fake that replays queued responses, then reports an empty world.
#[derive(Default)]
pub struct ScriptedFeed {
    responses: Mutex<VecDeque<Result<WorldState, FeedError>>>,
    fetches: AtomicUsize,
}

impl ScriptedFeed {
    pub fn push(&self, response: Result<WorldState, FeedError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MissionFeed for ScriptedFeed {
    async fn fetch(&self, _feed_url: &Url, _user_agent: &str) -> Result<WorldState, FeedError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(WorldState::default()))
    }
}

pub fn cascade_world(id: &str, expiry: OffsetDateTime) -> WorldState {
    serde_json::from_value(serde_json::json!({
        "ActiveMissions": [{
            "_id": { "$oid": id },
            "Node": "SolNode232",
            "MissionType": "MT_VOID_CASCADE",
            "Hard": true,
            "Expiry": { "$date": { "$numberLong": (expiry.unix_timestamp() * 1000).to_string() } },
        }]
    }))
    .unwrap()
}

pub fn poller_config() -> PollerConfig {
    PollerConfig::new(Url::parse("http://feed.test/worldState.php").unwrap())
}

pub fn registered(servers: &[(&str, &str)]) -> StateDocument {
    let mut document = StateDocument::default();
    for (guild, channel) in servers {
        document.servers.insert(
            GuildId::from(*guild),
            ServerRegistration {
                channel_id: ChannelId::from(*channel),
                role_id: None,
            },
        );
    }
    document
}

pub fn join(user: &str, region: Region, channel: &str) -> JoinRequest {
    JoinRequest {
        user: UserId::from(user),
        name: format!("{user}-ign"),
        region,
        channel: ChannelId::from(channel),
        origin: None,
    }
}

/// A running coordinator wired to in-memory fakes.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub platform: Arc<RecordingPlatform>,
    pub handle: CoordinatorHandle,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Harness {
    pub fn start(document: StateDocument) -> Self {
        Self::with_platform(document, RecordingPlatform::default())
    }

    pub fn with_platform(document: StateDocument, platform: RecordingPlatform) -> Self {
        let store = Arc::new(MemoryStore::new(document));
        let platform = Arc::new(platform);
        let (commands_tx, commands_rx) = command_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let coordinator = Coordinator::new(store.clone(), platform.clone());
        let task = tokio::spawn(coordinator.run(shutdown_rx, commands_rx));
        Self {
            store,
            platform,
            handle: CoordinatorHandle::new(commands_tx),
            shutdown_tx,
            task,
        }
    }

    /// Wait until every previously queued command, including its board
    /// sync, has been handled.
    pub async fn settle(&self) {
        self.handle
            .poll(PollSignal::Expired {
                id: "__settle__".into(),
            })
            .await
            .unwrap();
    }

    pub async fn document(&self) -> StateDocument {
        use cascade_core::framework::StateStore;
        self.store.load().await.unwrap()
    }

    pub async fn stop(self) {
        self.shutdown_tx.send(true).unwrap();
        self.task.await.unwrap();
    }
}
