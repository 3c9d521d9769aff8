use crate::server::build_router;
use crate::state::AppState;
use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use cascade_core::config::{ConfigStore, DiscordConfig, PollerConfig, SharedConfig};
use cascade_core::entities::{Session, StateDocument};
use cascade_core::events::command_channel;
use cascade_core::framework::{ChatPlatform, PlatformError, StateStore};
use cascade_core::processors::{Coordinator, CoordinatorHandle};
use cascade_core::store::MemoryStore;
use cascade_sdk::objects::{ChannelId, CreateMessage, EditMessage, GuildId, MessageId, UserId};
use cascade_sdk::signature::{InteractionPublicKey, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair};
use serde_json::{Value, json};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::{RwLock, watch};
use tower::ServiceExt;
use url::Url;

const OWNER: &str = "900";

struct NullPlatform;

#[async_trait]
impl ChatPlatform for NullPlatform {
    async fn send_message(
        &self,
        _channel: &ChannelId,
        _message: &CreateMessage,
    ) -> Result<MessageId, PlatformError> {
        Ok(MessageId::from("1"))
    }

    async fn edit_message(
        &self,
        _channel: &ChannelId,
        _message: &MessageId,
        _edit: &EditMessage,
    ) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn delete_message(
        &self,
        _channel: &ChannelId,
        _message: &MessageId,
    ) -> Result<(), PlatformError> {
        Ok(())
    }
}

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    key: Ed25519KeyPair,
    _shutdown: watch::Sender<bool>,
}

fn active_document() -> StateDocument {
    StateDocument {
        active_cascade: Some(Session {
            id: "X".into(),
            expiry: OffsetDateTime::now_utc() + Duration::minutes(30),
            label: "Tuvul Commons (Zariman)".to_owned(),
            announcements: Vec::new(),
        }),
        ..Default::default()
    }
}

fn app(document: StateDocument, enforce_whitelist: bool) -> TestApp {
    let rng = SystemRandom::new();
    let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).unwrap();
    let key = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap();
    let public_key = InteractionPublicKey::from_bytes(key.public_key().as_ref()).unwrap();

    let config = SharedConfig {
        discord: Arc::new(RwLock::new(DiscordConfig {
            api_base: Url::parse("http://discord.test/api/").unwrap(),
            public_key,
            owner_id: Some(UserId::from(OWNER)),
            enforce_whitelist,
        })),
        poller: ConfigStore::new(PollerConfig::new(
            Url::parse("http://feed.test/worldState.php").unwrap(),
        )),
    };

    let store = Arc::new(MemoryStore::new(document));
    let (commands_tx, commands_rx) = command_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(Coordinator::new(store.clone(), Arc::new(NullPlatform)).run(shutdown_rx, commands_rx));

    let state = AppState::new(config, store.clone(), CoordinatorHandle::new(commands_tx));
    TestApp {
        router: build_router(state),
        store,
        key,
        _shutdown: shutdown_tx,
    }
}

impl TestApp {
    fn signed(&self, body: &Value) -> Request<Body> {
        let body = body.to_string();
        let timestamp = "1700000000";
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body.as_bytes());
        let signature = self.key.sign(&message);

        Request::post("/interactions")
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, hex::encode(signature.as_ref()))
            .header(TIMESTAMP_HEADER, timestamp)
            .body(Body::from(body))
            .unwrap()
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn interact(&self, body: Value) -> (StatusCode, Value) {
        let request = self.signed(&body);
        self.call(request).await
    }
}

fn component(custom_id: &str, user: &str) -> Value {
    json!({
        "id": "i1",
        "type": 3,
        "token": "t",
        "guild_id": "g1",
        "channel_id": "c1",
        "member": { "user": { "id": user, "username": "someone" } },
        "message": { "id": "m1", "channel_id": "c1", "content": "" },
        "data": { "custom_id": custom_id, "component_type": 2 },
    })
}

fn modal_submit(user: &str, name: &str, region: &str) -> Value {
    json!({
        "id": "i2",
        "type": 5,
        "token": "t",
        "guild_id": "g1",
        "channel_id": "c1",
        "member": { "user": { "id": user, "username": "someone" } },
        "message": { "id": "m1", "channel_id": "c1", "content": "" },
        "data": {
            "custom_id": "ign_modal",
            "components": [
                { "type": 1, "components": [{ "type": 4, "custom_id": "ign_input", "value": name }] },
                { "type": 1, "components": [{ "type": 4, "custom_id": "region_input", "value": region }] },
            ],
        },
    })
}

fn command(name: &str, user: &str, options: Value) -> Value {
    json!({
        "id": "i3",
        "type": 2,
        "token": "t",
        "guild_id": "g1",
        "channel_id": "c1",
        "member": { "user": { "id": user, "username": "someone" } },
        "data": { "name": name, "options": options },
    })
}

fn is_ephemeral(body: &Value, text: &str) -> bool {
    body["type"] == 4
        && body["data"]["flags"] == 64
        && body["data"]["content"]
            .as_str()
            .is_some_and(|content| content.contains(text))
}

#[tokio::test]
async fn test_health_check() {
    let app = app(StateDocument::default(), false);
    let (status, body) = app
        .call(Request::get("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unsigned_and_forged_requests_are_rejected() {
    let app = app(StateDocument::default(), false);

    let unsigned = Request::post("/interactions")
        .body(Body::from(json!({ "id": "1", "type": 1 }).to_string()))
        .unwrap();
    assert_eq!(app.call(unsigned).await.0, StatusCode::UNAUTHORIZED);

    let mut forged = app.signed(&json!({ "id": "1", "type": 1 }));
    *forged.body_mut() = Body::from(json!({ "id": "2", "type": 1 }).to_string());
    assert_eq!(app.call(forged).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ping_is_answered_with_pong() {
    let app = app(StateDocument::default(), false);
    let (status, body) = app.interact(json!({ "id": "1", "type": 1 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "type": 1 }));
}

#[tokio::test]
async fn test_board_button_without_session() {
    let app = app(StateDocument::default(), false);
    let (status, body) = app.interact(component("board", "u1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(is_ephemeral(&body, "no active cascade"));
}

#[tokio::test]
async fn test_board_button_opens_modal() {
    let app = app(active_document(), false);
    let (_, body) = app.interact(component("board", "u1")).await;
    assert_eq!(body["type"], 9);
    assert_eq!(body["data"]["custom_id"], "ign_modal");
    assert_eq!(body["data"]["title"], "Join the Global LFG");
}

#[tokio::test]
async fn test_join_updates_board_and_prefills_modal() {
    let app = app(active_document(), false);

    let (status, body) = app.interact(modal_submit("u1", "Tenno", "eu")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], 7);
    let description = body["data"]["embeds"][0]["description"].as_str().unwrap();
    assert!(description.contains("• Tenno [EU]"));

    let document = app.store.load().await.unwrap();
    assert_eq!(document.squads.len(), 1);

    let (_, body) = app.interact(component("board", "u1")).await;
    assert_eq!(body["data"]["title"], "Update Info");
}

#[tokio::test]
async fn test_invalid_region_mutates_nothing() {
    let app = app(active_document(), false);
    let (_, body) = app.interact(modal_submit("u1", "Tenno", "MARS")).await;
    assert!(is_ephemeral(&body, "Invalid region"));
    assert!(app.store.load().await.unwrap().squads.is_empty());
    assert_eq!(app.store.save_count(), 0);
}

#[tokio::test]
async fn test_leave_without_squad() {
    let app = app(active_document(), false);
    let (_, body) = app.interact(component("leave", "u1")).await;
    assert!(is_ephemeral(&body, "aren't currently in any squads"));
}

#[tokio::test]
async fn test_setup_registers_channel() {
    let app = app(StateDocument::default(), false);
    let options = json!([
        { "name": "channel", "type": 7, "value": "c42" },
        { "name": "role", "type": 8, "value": "r7" },
    ]);
    let (_, body) = app.interact(command("setup", "u1", options)).await;
    assert!(is_ephemeral(&body, "<#c42>"));

    let document = app.store.load().await.unwrap();
    let registration = &document.servers[&GuildId::from("g1")];
    assert_eq!(registration.channel_id, ChannelId::from("c42"));
}

#[tokio::test]
async fn test_whitelist_is_owner_only_and_gates_interactions() {
    let app = app(active_document(), true);
    let add = json!([{
        "name": "add",
        "type": 1,
        "options": [{ "name": "guild", "type": 3, "value": "g1" }],
    }]);

    // Gate applies before the command is looked at.
    let (_, body) = app.interact(command("whitelist", "u1", add.clone())).await;
    assert!(is_ephemeral(&body, "not authorized"));
    let (_, body) = app.interact(component("board", "u1")).await;
    assert!(is_ephemeral(&body, "not authorized"));

    let (_, body) = app.interact(command("whitelist", OWNER, add)).await;
    assert!(is_ephemeral(&body, "added to the whitelist"));

    let (_, body) = app.interact(component("board", "u1")).await;
    assert_eq!(body["type"], 9);
}
