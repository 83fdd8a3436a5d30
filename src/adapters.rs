use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use crate::ports;
use crate::ports::push::SendError;
use crate::push;
use crate::types::push::{Subscription, VapidConfig};

#[derive(Clone)]
pub struct WebPushSender {
    vapid: VapidConfig,
    client: Arc<web_push::WebPushClient>,
}

impl WebPushSender {
    pub fn new(vapid: VapidConfig) -> Result<Self, web_push::WebPushError> {
        let client = web_push::WebPushClient::new()?;
        Ok(Self {
            vapid,
            client: Arc::new(client),
        })
    }

    async fn send_web_push(
        &self,
        subscription: &Subscription,
        message: &str,
    ) -> Result<(), web_push::WebPushError> {
        let subscription_info = web_push::SubscriptionInfo::new(
            subscription.endpoint.clone(),
            subscription.keys.p256dh.clone(),
            subscription.keys.auth.clone(),
        );
        let mut builder = web_push::WebPushMessageBuilder::new(&subscription_info)?;
        builder.set_payload(web_push::ContentEncoding::Aes128Gcm, message.as_bytes());
        let mut signature_builder = web_push::VapidSignatureBuilder::from_base64(
            &self.vapid.private_key,
            web_push::URL_SAFE_NO_PAD,
            &subscription_info,
        )?;
        signature_builder.add_claim("sub", self.vapid.subject.as_str());
        builder.set_vapid_signature(signature_builder.build()?);
        self.client.send(builder.build()?).await?;
        Ok(())
    }
}

impl ports::push::PushSender for WebPushSender {
    type Error = web_push::WebPushError;
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<(), SendError<Self::Error>>> + Send + 'a>>
    where
        Self: 'a;

    fn send<'a>(&'a self, subscription: &'a Subscription, message: &'a str) -> Self::Fut<'a> {
        Box::pin(async move {
            self.send_web_push(subscription, message)
                .await
                .map_err(|err| match err {
                    web_push::WebPushError::EndpointNotFound
                    | web_push::WebPushError::EndpointNotValid => SendError::EndpointGone,
                    other => SendError::Transport(other),
                })
        })
    }
}

#[derive(Debug)]
pub enum ApiError {
    Status(StatusCode),
    Transport(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Status(status) => write!(f, "server responded with {status}"),
            ApiError::Transport(detail) => write!(f, "request failed: {detail}"),
        }
    }
}

/// Loopback `ServerApi` that drives the crate's own router in-process. Each
/// call clones the router and runs one request through it, so the client
/// code exercises the real HTTP surface without a network.
#[derive(Clone)]
pub struct LocalServerApi {
    router: axum::Router,
}

impl LocalServerApi {
    pub fn new(router: axum::Router) -> Self {
        Self { router }
    }

    async fn request(&self, request: Request<Body>) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok((status, body.to_vec()))
    }
}

impl ports::api::ServerApi for LocalServerApi {
    type Error = ApiError;
    type KeyFut<'a>
        = Pin<Box<dyn Future<Output = Result<String, ApiError>> + Send + 'a>>
    where
        Self: 'a;
    type RegisterFut<'a>
        = Pin<Box<dyn Future<Output = Result<(), ApiError>> + Send + 'a>>
    where
        Self: 'a;
    type CheckFut<'a>
        = Pin<Box<dyn Future<Output = Result<bool, ApiError>> + Send + 'a>>
    where
        Self: 'a;

    fn vapid_public_key<'a>(&'a self) -> Self::KeyFut<'a> {
        Box::pin(async move {
            let request = Request::builder()
                .uri("/vapid-public-key")
                .body(Body::empty())
                .map_err(|err| ApiError::Transport(err.to_string()))?;
            let (status, body) = self.request(request).await?;
            if !status.is_success() {
                return Err(ApiError::Status(status));
            }

            #[derive(serde::Deserialize)]
            struct KeyResponse {
                #[serde(rename = "vapidPublicKey")]
                vapid_public_key: String,
            }
            let response: KeyResponse = serde_json::from_slice(&body)
                .map_err(|err| ApiError::Transport(err.to_string()))?;
            Ok(response.vapid_public_key)
        })
    }

    fn register<'a>(
        &'a self,
        client_id: &'a str,
        subscription: &'a Subscription,
    ) -> Self::RegisterFut<'a> {
        Box::pin(async move {
            let body = serde_json::json!({
                "clientId": client_id,
                "subscription": subscription,
            });
            let request = Request::builder()
                .method("POST")
                .uri("/subscribe")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .map_err(|err| ApiError::Transport(err.to_string()))?;
            let (status, _body) = self.request(request).await?;
            if !status.is_success() {
                return Err(ApiError::Status(status));
            }
            Ok(())
        })
    }

    fn is_subscribed<'a>(&'a self, client_id: &'a str) -> Self::CheckFut<'a> {
        Box::pin(async move {
            let request = Request::builder()
                .uri(format!("/check-subscription?clientId={client_id}"))
                .body(Body::empty())
                .map_err(|err| ApiError::Transport(err.to_string()))?;
            let (status, body) = self.request(request).await?;
            if !status.is_success() {
                return Err(ApiError::Status(status));
            }

            #[derive(serde::Deserialize)]
            struct CheckResponse {
                #[serde(rename = "isSubscribed")]
                is_subscribed: bool,
            }
            let response: CheckResponse = serde_json::from_slice(&body)
                .map_err(|err| ApiError::Transport(err.to_string()))?;
            Ok(response.is_subscribed)
        })
    }
}

/// In-memory `KeyValueStore`, the default for tests and embedded simulation.
#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ports::store::KeyValueStore for MemoryKeyValueStore {
    type Error = std::io::Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let values = self.values.lock().expect("key-value store lock");
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let mut values = self.values.lock().expect("key-value store lock");
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed `KeyValueStore`: one TOML table, rewritten atomically on
/// every set. Fits the read-then-conditionally-write access pattern of the
/// identity provider; not meant for hot paths.
#[derive(Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> std::io::Result<toml::Table> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents.parse::<toml::Table>().map_err(std::io::Error::other),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(toml::Table::new()),
            Err(err) => Err(err),
        }
    }
}

impl ports::store::KeyValueStore for FileKeyValueStore {
    type Error = std::io::Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let table = self.load()?;
        Ok(table
            .get(key)
            .and_then(|value| value.as_str())
            .map(|value| value.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let mut table = self.load()?;
        table.insert(key.to_string(), toml::Value::String(value.to_string()));
        let contents = toml::to_string(&table).map_err(std::io::Error::other)?;
        push::store::atomic_write(&self.path, &contents)
    }
}
