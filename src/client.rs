use crate::ports::api::ServerApi;
use crate::ports::platform::{Permission, PushPlatform};
use crate::ports::store::KeyValueStore;
use crate::types::push::Subscription;

pub mod identity;
pub mod query;
pub mod registrar;

pub use identity::get_or_create_client_id;
pub use query::{QueryError, SubscriptionQuery};
pub use registrar::{SubscribeError, subscribe};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The browser-side composition: identity, registrar, and state query over
/// an injected platform, server API, and local store. One instance per
/// installation; the client id is resolved once at construction.
#[derive(Clone)]
pub struct PushClient<P, A> {
    platform: P,
    api: A,
    query: SubscriptionQuery<A>,
    client_id: String,
    subscribing: Arc<AtomicBool>,
}

impl<P, A> PushClient<P, A>
where
    P: PushPlatform,
    A: ServerApi,
{
    pub fn new<S: KeyValueStore>(store: &S, platform: P, api: A) -> Result<Self, S::Error> {
        let client_id = identity::get_or_create_client_id(store)?;
        let query = SubscriptionQuery::new(api.clone());
        Ok(Self {
            platform,
            api,
            query,
            client_id,
            subscribing: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn permission(&self) -> Permission {
        self.platform.permission()
    }

    pub async fn request_permission(&self) -> Permission {
        self.platform.request_permission().await
    }

    /// Registers the background worker. Part of application startup, and a
    /// precondition for `subscribe`.
    pub async fn register_worker(&self) -> Result<(), P::Error> {
        self.platform.register_worker().await
    }

    /// Advisory busy flag; callers use it to avoid duplicate in-flight
    /// registrations. It does not enforce mutual exclusion.
    pub fn is_subscribing(&self) -> bool {
        self.subscribing.load(Ordering::SeqCst)
    }

    /// Runs the registration flow and invalidates the cached subscription
    /// state on success so the next query reflects the new server record.
    pub async fn subscribe(&self) -> Result<Subscription, SubscribeError> {
        self.subscribing.store(true, Ordering::SeqCst);
        let result = registrar::subscribe(&self.platform, &self.api, &self.client_id).await;
        if result.is_ok() {
            self.query.invalidate();
        }
        self.subscribing.store(false, Ordering::SeqCst);
        result
    }

    pub async fn is_subscribed(&self) -> Result<Option<bool>, QueryError> {
        self.query.is_subscribed(&self.client_id).await
    }
}
