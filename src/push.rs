use crate::ports::push::{PushSender, SendError};
use crate::types::push::NotificationPayload;

pub mod store;
mod vapid;

pub use store::{StoreError, SubscriptionStore};
pub(crate) use vapid::{VapidConfigStatus, load_vapid_config};
pub use vapid::{VapidCredentials, generate_vapid_credentials};

#[derive(Debug)]
pub enum DispatchError {
    NotSubscribed,
    SubscriptionExpired,
    DeliveryFailed(String),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::NotSubscribed => f.write_str("client has no subscription"),
            DispatchError::SubscriptionExpired => {
                f.write_str("subscription expired and was removed")
            }
            DispatchError::DeliveryFailed(detail) => write!(f, "delivery failed: {detail}"),
        }
    }
}

/// Sends `payload` to the client's registered endpoint. When the push
/// service reports the endpoint gone, the stale record is dropped so that a
/// subsequent subscription check reports false. Delivery is fire-and-forget
/// beyond the transport result; there is no read acknowledgment.
pub async fn dispatch<S: PushSender>(
    sender: &S,
    store: &SubscriptionStore,
    client_id: &str,
    payload: &NotificationPayload,
) -> Result<(), DispatchError> {
    let record = store.get(client_id).ok_or(DispatchError::NotSubscribed)?;
    let message = serde_json::to_string(payload)
        .map_err(|err| DispatchError::DeliveryFailed(err.to_string()))?;

    match sender.send(&record.subscription, &message).await {
        Ok(()) => Ok(()),
        Err(SendError::EndpointGone) => {
            eprintln!("push delivery error: endpoint gone, dropping subscription (client {client_id})");
            store.remove(client_id);
            Err(DispatchError::SubscriptionExpired)
        }
        Err(SendError::Transport(err)) => {
            eprintln!("push delivery error: {err} (client {client_id})");
            Err(DispatchError::DeliveryFailed(err.to_string()))
        }
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
pub(crate) mod tests {
    use super::*;
    use crate::types::push::{Subscription, SubscriptionKeys};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::Mutex;

    #[derive(Debug)]
    pub(crate) struct TestSendError;

    impl std::fmt::Display for TestSendError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("test send error")
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum TestOutcome {
        Delivered,
        Gone,
        Failed,
    }

    #[derive(Clone)]
    pub(crate) struct TestSender {
        pub(crate) outcome: TestOutcome,
        pub(crate) sent: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl TestSender {
        pub(crate) fn new(outcome: TestOutcome) -> Self {
            Self {
                outcome,
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl PushSender for TestSender {
        type Error = TestSendError;
        type Fut<'a>
            = Pin<Box<dyn Future<Output = Result<(), SendError<Self::Error>>> + Send + 'a>>
        where
            Self: 'a;

        fn send<'a>(&'a self, subscription: &'a Subscription, message: &'a str) -> Self::Fut<'a> {
            let sent = Arc::clone(&self.sent);
            let endpoint = subscription.endpoint.clone();
            let message = message.to_string();
            let outcome = self.outcome;
            Box::pin(async move {
                match outcome {
                    TestOutcome::Delivered => {
                        sent.lock().expect("sent lock").push((endpoint, message));
                        Ok(())
                    }
                    TestOutcome::Gone => Err(SendError::EndpointGone),
                    TestOutcome::Failed => Err(SendError::Transport(TestSendError)),
                }
            })
        }
    }

    pub(crate) fn subscription(endpoint: &str) -> Subscription {
        Subscription {
            endpoint: endpoint.to_string(),
            keys: SubscriptionKeys {
                p256dh: "p256".to_string(),
                auth: "auth".to_string(),
            },
        }
    }

    fn payload(title: &str, body: &str) -> NotificationPayload {
        NotificationPayload {
            title: title.to_string(),
            body: body.to_string(),
            icon: None,
            data: None,
        }
    }

    #[tokio::test]
    async fn dispatch__should_send_json_payload_to_registered_endpoint() {
        // Given
        let store = SubscriptionStore::in_memory();
        store
            .insert("client-1", subscription("https://push.example/123"))
            .expect("insert");
        let sender = TestSender::new(TestOutcome::Delivered);

        // When
        dispatch(&sender, &store, "client-1", &payload("Hello", "World"))
            .await
            .expect("dispatch");

        // Then
        let sent = sender.sent.lock().expect("sent lock").clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "https://push.example/123");
        assert_eq!(sent[0].1, r#"{"title":"Hello","body":"World"}"#);
    }

    #[tokio::test]
    async fn dispatch__should_fail_not_subscribed_without_contacting_endpoint() {
        // Given
        let store = SubscriptionStore::in_memory();
        let sender = TestSender::new(TestOutcome::Delivered);

        // When
        let result = dispatch(&sender, &store, "unknown", &payload("Hello", "World")).await;

        // Then
        assert!(matches!(result, Err(DispatchError::NotSubscribed)));
        assert!(sender.sent.lock().expect("sent lock").is_empty());
    }

    #[tokio::test]
    async fn dispatch__should_drop_record_when_endpoint_gone() {
        // Given
        let store = SubscriptionStore::in_memory();
        store
            .insert("client-1", subscription("https://push.example/123"))
            .expect("insert");
        let sender = TestSender::new(TestOutcome::Gone);

        // When
        let result = dispatch(&sender, &store, "client-1", &payload("Hello", "World")).await;

        // Then
        assert!(matches!(result, Err(DispatchError::SubscriptionExpired)));
        assert!(!store.contains("client-1"));
    }

    #[tokio::test]
    async fn dispatch__should_keep_record_on_transport_failure() {
        // Given
        let store = SubscriptionStore::in_memory();
        store
            .insert("client-1", subscription("https://push.example/123"))
            .expect("insert");
        let sender = TestSender::new(TestOutcome::Failed);

        // When
        let result = dispatch(&sender, &store, "client-1", &payload("Hello", "World")).await;

        // Then
        assert!(matches!(result, Err(DispatchError::DeliveryFailed(_))));
        assert!(store.contains("client-1"));
    }
}
