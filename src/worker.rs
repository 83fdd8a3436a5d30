use serde_json::Value;
use tokio::task::JoinHandle;

pub const DEFAULT_TITLE: &str = "Push Notification";
pub const DEFAULT_BODY: &str = "This is a push notification from the server.";
pub const DEFAULT_ICON: &str = "pwa-512x512.png";

fn default_data() -> Value {
    serde_json::json!({ "testData": "hardcoded" })
}

/// Fully resolved notification content, every field populated after the
/// per-field fallback pass over the delivered payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub data: Value,
}

/// Capabilities of the worker execution context, injected so the processor
/// runs against a fake host in tests.
pub trait WorkerHost: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type ShowFut<'a>: Future<Output = Result<(), Self::Error>> + Send + 'a
    where
        Self: 'a;
    type OpenFut<'a>: Future<Output = Result<(), Self::Error>> + Send + 'a
    where
        Self: 'a;

    fn skip_waiting(&self);
    fn claim_clients(&self);
    fn show_notification<'a>(&'a self, notification: &'a Notification) -> Self::ShowFut<'a>;
    fn close_notification(&self, title: &str);
    fn open_window<'a>(&'a self, url: &'a str) -> Self::OpenFut<'a>;
}

/// Platform-managed worker lifecycle phases, entered once per worker
/// version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    Installing,
    Installed,
    Activating,
    Activated,
}

#[derive(Debug)]
pub struct PushEventError(String);

impl std::fmt::Display for PushEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "push event failed: {}", self.0)
    }
}

/// The waitUntil contract: the runtime must await this handle before it
/// considers the triggering event resolved, keeping the worker alive for the
/// full decode and show-notification path.
pub struct PushEventHandle {
    handle: JoinHandle<Result<(), PushEventError>>,
}

impl PushEventHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Result<(), PushEventError> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) => Err(PushEventError(format!("event task aborted: {err}"))),
        }
    }
}

/// Processes push events independently of any open page. Every delivered
/// push results in a visible notification; an invisible push would violate
/// platform policy and risk revocation of delivery capability.
pub struct PushWorker<H: WorkerHost> {
    host: H,
    phase: WorkerPhase,
}

impl<H: WorkerHost> PushWorker<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            phase: WorkerPhase::Installing,
        }
    }

    pub fn phase(&self) -> WorkerPhase {
        self.phase
    }

    /// Skips the waiting period so a new worker version takes effect without
    /// a page reload; a mid-session takeover is the accepted trade-off.
    pub fn install(&mut self) {
        self.host.skip_waiting();
        self.phase = WorkerPhase::Installed;
    }

    /// Claims existing open clients immediately on activation, for the same
    /// reason.
    pub fn activate(&mut self) {
        self.phase = WorkerPhase::Activating;
        self.host.claim_clients();
        self.phase = WorkerPhase::Activated;
    }

    /// Handles one delivered push. Decode and show both run under the
    /// returned handle's lifetime; if showing fails the handle resolves with
    /// the error and the platform may redeliver or drop the event.
    pub fn handle_push(&self, payload: Option<&[u8]>) -> PushEventHandle {
        let host = self.host.clone();
        let payload = payload.map(|bytes| bytes.to_vec());
        let handle = tokio::spawn(async move {
            let notification = decode_payload(payload.as_deref());
            host.show_notification(&notification)
                .await
                .map_err(|err| PushEventError(err.to_string()))
        });
        PushEventHandle { handle }
    }

    /// A click dismisses the notification and opens the application's
    /// primary view.
    pub fn handle_notification_click(&self, notification: &Notification) -> PushEventHandle {
        self.host.close_notification(&notification.title);
        let host = self.host.clone();
        let handle = tokio::spawn(async move {
            host.open_window("/")
                .await
                .map_err(|err| PushEventError(err.to_string()))
        });
        PushEventHandle { handle }
    }

    /// Closing without interaction is observed only.
    pub fn handle_notification_close(&self, notification: &Notification) {
        println!("notification closed: {}", notification.title);
    }
}

/// Decodes a delivered payload with per-field fallbacks: a missing, null,
/// empty, or unparseable field defaults individually rather than discarding
/// the rest of the payload.
fn decode_payload(payload: Option<&[u8]>) -> Notification {
    let parsed: Value = match payload {
        Some(bytes) => serde_json::from_slice(bytes).unwrap_or(Value::Null),
        None => Value::Null,
    };

    Notification {
        title: text_field(parsed.get("title"), DEFAULT_TITLE),
        body: text_field(parsed.get("body"), DEFAULT_BODY),
        icon: text_field(parsed.get("icon"), DEFAULT_ICON),
        data: match parsed.get("data") {
            Some(value) if !value.is_null() => value.clone(),
            _ => default_data(),
        },
    }
}

fn text_field(value: Option<&Value>, default: &str) -> String {
    match value.and_then(Value::as_str) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum HostEvent {
        SkipWaiting,
        ClaimClients,
        Shown(Notification),
        Closed(String),
        Opened(String),
    }

    #[derive(Clone, Default)]
    struct TestHost {
        fail_show: bool,
        events: Arc<Mutex<Vec<HostEvent>>>,
    }

    impl TestHost {
        fn events(&self) -> Vec<HostEvent> {
            self.events.lock().expect("events lock").clone()
        }

        fn shown(&self) -> Vec<Notification> {
            self.events()
                .into_iter()
                .filter_map(|event| match event {
                    HostEvent::Shown(notification) => Some(notification),
                    _ => None,
                })
                .collect()
        }
    }

    impl WorkerHost for TestHost {
        type Error = String;
        type ShowFut<'a>
            = std::future::Ready<Result<(), String>>
        where
            Self: 'a;
        type OpenFut<'a>
            = std::future::Ready<Result<(), String>>
        where
            Self: 'a;

        fn skip_waiting(&self) {
            self.events
                .lock()
                .expect("events lock")
                .push(HostEvent::SkipWaiting);
        }

        fn claim_clients(&self) {
            self.events
                .lock()
                .expect("events lock")
                .push(HostEvent::ClaimClients);
        }

        fn show_notification<'a>(&'a self, notification: &'a Notification) -> Self::ShowFut<'a> {
            if self.fail_show {
                return std::future::ready(Err("display unavailable".to_string()));
            }
            self.events
                .lock()
                .expect("events lock")
                .push(HostEvent::Shown(notification.clone()));
            std::future::ready(Ok(()))
        }

        fn close_notification(&self, title: &str) {
            self.events
                .lock()
                .expect("events lock")
                .push(HostEvent::Closed(title.to_string()));
        }

        fn open_window<'a>(&'a self, url: &'a str) -> Self::OpenFut<'a> {
            self.events
                .lock()
                .expect("events lock")
                .push(HostEvent::Opened(url.to_string()));
            std::future::ready(Ok(()))
        }
    }

    #[test]
    fn lifecycle__should_skip_waiting_and_claim_clients() {
        // Given
        let host = TestHost::default();
        let mut worker = PushWorker::new(host.clone());
        assert_eq!(worker.phase(), WorkerPhase::Installing);

        // When
        worker.install();
        worker.activate();

        // Then
        assert_eq!(worker.phase(), WorkerPhase::Activated);
        assert_eq!(
            host.events(),
            vec![HostEvent::SkipWaiting, HostEvent::ClaimClients]
        );
    }

    #[tokio::test]
    async fn handle_push__should_show_payload_fields_with_defaults_for_missing() {
        // Given
        let host = TestHost::default();
        let worker = PushWorker::new(host.clone());
        let payload = br#"{"title":"Hello","body":"World"}"#;

        // When
        worker
            .handle_push(Some(payload))
            .wait()
            .await
            .expect("push event");

        // Then
        let shown = host.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Hello");
        assert_eq!(shown[0].body, "World");
        assert_eq!(shown[0].icon, DEFAULT_ICON);
        assert_eq!(shown[0].data, default_data());
    }

    #[tokio::test]
    async fn handle_push__should_show_all_defaults_for_absent_payload() {
        // Given
        let host = TestHost::default();
        let worker = PushWorker::new(host.clone());

        // When
        worker.handle_push(None).wait().await.expect("push event");

        // Then
        let shown = host.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, DEFAULT_TITLE);
        assert_eq!(shown[0].body, DEFAULT_BODY);
        assert_eq!(shown[0].icon, DEFAULT_ICON);
        assert_eq!(shown[0].data, default_data());
    }

    #[tokio::test]
    async fn handle_push__should_fall_back_to_defaults_for_unparseable_payload() {
        // Given
        let host = TestHost::default();
        let worker = PushWorker::new(host.clone());

        // When
        worker
            .handle_push(Some(b"not json"))
            .wait()
            .await
            .expect("push event");

        // Then
        let shown = host.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn handle_push__should_default_empty_and_null_fields_individually() {
        // Given
        let host = TestHost::default();
        let worker = PushWorker::new(host.clone());
        let payload = br#"{"title":"","body":null,"icon":"custom.png","data":{"k":"v"}}"#;

        // When
        worker
            .handle_push(Some(payload))
            .wait()
            .await
            .expect("push event");

        // Then
        let shown = host.shown();
        assert_eq!(shown[0].title, DEFAULT_TITLE);
        assert_eq!(shown[0].body, DEFAULT_BODY);
        assert_eq!(shown[0].icon, "custom.png");
        assert_eq!(shown[0].data, serde_json::json!({"k": "v"}));
    }

    #[tokio::test]
    async fn handle_push__should_resolve_handle_with_error_when_show_fails() {
        // Given
        let host = TestHost {
            fail_show: true,
            ..Default::default()
        };
        let worker = PushWorker::new(host.clone());

        // When
        let result = worker.handle_push(None).wait().await;

        // Then
        assert!(result.is_err());
        assert!(host.shown().is_empty());
    }

    #[derive(Clone)]
    struct GatedHost {
        gate: Arc<tokio::sync::Notify>,
        inner: TestHost,
    }

    impl WorkerHost for GatedHost {
        type Error = String;
        type ShowFut<'a>
            = std::pin::Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>
        where
            Self: 'a;
        type OpenFut<'a>
            = std::future::Ready<Result<(), String>>
        where
            Self: 'a;

        fn skip_waiting(&self) {
            self.inner.skip_waiting();
        }

        fn claim_clients(&self) {
            self.inner.claim_clients();
        }

        fn show_notification<'a>(&'a self, notification: &'a Notification) -> Self::ShowFut<'a> {
            Box::pin(async move {
                self.gate.notified().await;
                self.inner.show_notification(notification).await
            })
        }

        fn close_notification(&self, title: &str) {
            self.inner.close_notification(title);
        }

        fn open_window<'a>(&'a self, url: &'a str) -> Self::OpenFut<'a> {
            self.inner.open_window(url)
        }
    }

    #[tokio::test]
    async fn push_event_handle__should_report_finished_only_after_show_completes() {
        // Given a host whose show blocks until released
        let gate = Arc::new(tokio::sync::Notify::new());
        let host = GatedHost {
            gate: Arc::clone(&gate),
            inner: TestHost::default(),
        };
        let worker = PushWorker::new(host.clone());

        // When
        let handle = worker.handle_push(None);

        // Then the event is still pending while the show is blocked
        assert!(!handle.is_finished());

        gate.notify_one();
        handle.wait().await.expect("push event");
        assert_eq!(host.inner.shown().len(), 1);
    }

    #[tokio::test]
    async fn handle_notification_click__should_close_and_open_primary_view() {
        // Given
        let host = TestHost::default();
        let worker = PushWorker::new(host.clone());
        let notification = decode_payload(None);

        // When
        worker
            .handle_notification_click(&notification)
            .wait()
            .await
            .expect("click event");

        // Then
        let events = host.events();
        assert_eq!(events[0], HostEvent::Closed(DEFAULT_TITLE.to_string()));
        assert_eq!(events[1], HostEvent::Opened("/".to_string()));
    }
}
