#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    routing::post,
};
use chrono::FixedOffset;
use serde_json::{Value, json};
use tower::ServiceExt;

use lojinha_api::bot_client::BotClient;
use lojinha_api::middleware::BOT_TOKEN_HEADER;
use lojinha_api::{AppState, AppStateInner, Settings};
use lojinha_db::Database;
use lojinha_economy::messages::MessageCooldowns;
use lojinha_economy::phone;

pub const ADMIN_NUMBER: &str = "5511900000001";
pub const BOT_TOKEN: &str = "bot-secret";

/// What the stub bot received.
#[derive(Clone, Default)]
pub struct BotInbox {
    pub auth_codes: Arc<Mutex<Vec<Value>>>,
    pub messages: Arc<Mutex<Vec<Value>>>,
}

async fn stub_send_auth_code(State(inbox): State<BotInbox>, Json(body): Json<Value>) -> Json<Value> {
    inbox.auth_codes.lock().unwrap().push(body);
    Json(json!({ "success": true }))
}

async fn stub_send_message(State(inbox): State<BotInbox>, Json(body): Json<Value>) -> Json<Value> {
    inbox.messages.lock().unwrap().push(body);
    Json(json!({ "success": true }))
}

/// Serve a fake bot on an ephemeral port and return its base URL.
async fn spawn_stub_bot(inbox: BotInbox) -> String {
    let app = Router::new()
        .route("/send-auth-code", post(stub_send_auth_code))
        .route("/send-message", post(stub_send_message))
        .with_state(inbox);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub struct TestApp {
    pub state: AppState,
    pub app: Router,
    pub inbox: BotInbox,
}

impl TestApp {
    pub async fn new() -> Self {
        let inbox = BotInbox::default();
        let bot_url = spawn_stub_bot(inbox.clone()).await;
        Self::with_bot_url(&bot_url, inbox)
    }

    /// Point the bot client at a port nothing listens on.
    pub fn without_bot() -> Self {
        Self::with_bot_url("http://127.0.0.1:9", BotInbox::default())
    }

    fn with_bot_url(bot_url: &str, inbox: BotInbox) -> Self {
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: "test-secret".into(),
            bot: BotClient::new(bot_url).unwrap(),
            settings: Settings {
                bot_token: Some(BOT_TOKEN.into()),
                admin_numbers: HashSet::from([ADMIN_NUMBER.to_string()]),
                utc_offset: FixedOffset::west_opt(3 * 3600).unwrap(),
                log_auth_codes: false,
            },
            cooldowns: MessageCooldowns::new(),
        });
        let app = lojinha_api::router(state.clone());
        Self { state, app, inbox }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(with_body(builder, body)).await
    }

    pub async fn bot_call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(BOT_TOKEN_HEADER, BOT_TOKEN);
        self.send(with_body(builder, body)).await
    }

    /// The most recent code the stub bot received for `number`, in any format.
    pub fn last_code_for(&self, number: &str) -> Option<String> {
        let normalized = phone::normalize_number(number).ok()?;
        let bot_number = phone::number_for_bot(&normalized);
        self.inbox
            .auth_codes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|body| body["whatsappNumber"] == bot_number)
            .and_then(|body| body["code"].as_str().map(str::to_string))
    }

    /// Run the whole code flow and return `(token, user)`.
    pub async fn login(&self, number: &str) -> (String, Value) {
        let (status, body) = self
            .call(
                "POST",
                "/auth/request-code",
                None,
                Some(json!({ "whatsapp_number": number })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["sent"], true);

        let code = self.last_code_for(number).expect("stub bot got no code");
        let (status, body) = self
            .call(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "whatsapp_number": number, "code": code })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (body["token"].as_str().unwrap().to_string(), body["user"].clone())
    }

    /// Give coins through the admin endpoint.
    pub async fn grant(&self, admin_token: &str, user_id: &str, amount: i64) -> Value {
        let (status, body) = self
            .call(
                "POST",
                &format!("/admin/users/{user_id}/coins"),
                Some(admin_token),
                Some(json!({ "amount": amount })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    pub async fn create_product(&self, admin_token: &str, product: Value) -> Value {
        let (status, body) = self
            .call("POST", "/admin/products", Some(admin_token), Some(product))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

fn with_body(builder: axum::http::request::Builder, body: Option<Value>) -> Request<Body> {
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
