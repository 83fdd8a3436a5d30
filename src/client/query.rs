use crate::ports::api::ServerApi;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Logical cache key, mirroring the single query this client ever caches.
pub(crate) const SUBSCRIPTION_CACHE_KEY: &str = "subscription";

#[derive(Debug)]
pub struct QueryError(String);

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "subscription query failed: {}", self.0)
    }
}

/// Read path for the server's view of the client's subscription state. The
/// result always reflects the server, never a local assumption, since the
/// platform may have silently revoked the subscription. Cached under a fixed
/// key until `invalidate` is called, which a successful subscribe must do.
#[derive(Clone)]
pub struct SubscriptionQuery<A> {
    api: A,
    cache: Arc<Mutex<HashMap<&'static str, bool>>>,
}

impl<A: ServerApi> SubscriptionQuery<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns `None` when `client_id` is empty: the query is disabled and
    /// nothing is fetched.
    pub async fn is_subscribed(&self, client_id: &str) -> Result<Option<bool>, QueryError> {
        if client_id.is_empty() {
            return Ok(None);
        }

        let cached = {
            let cache = self.cache.lock().expect("subscription cache lock");
            cache.get(SUBSCRIPTION_CACHE_KEY).copied()
        };
        if let Some(subscribed) = cached {
            return Ok(Some(subscribed));
        }

        let subscribed = self
            .api
            .is_subscribed(client_id)
            .await
            .map_err(|err| QueryError(err.to_string()))?;
        let mut cache = self.cache.lock().expect("subscription cache lock");
        cache.insert(SUBSCRIPTION_CACHE_KEY, subscribed);
        Ok(Some(subscribed))
    }

    pub fn invalidate(&self) {
        let mut cache = self.cache.lock().expect("subscription cache lock");
        cache.remove(SUBSCRIPTION_CACHE_KEY);
    }
}
