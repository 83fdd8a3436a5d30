use crate::ports::api::ServerApi;
use crate::ports::platform::{Permission, PushPlatform, Refusal, SubscribeOptions};
use crate::types::push::Subscription;

#[derive(Debug)]
pub enum SubscribeError {
    UnsupportedPlatform,
    PermissionError,
    KeyFetchError(String),
    WorkerNotRegistered,
    PlatformError(String),
    ServerRejected(String),
}

impl std::fmt::Display for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscribeError::UnsupportedPlatform => {
                f.write_str("push notifications are not supported on this platform")
            }
            SubscribeError::PermissionError => f.write_str("push permission not granted"),
            SubscribeError::KeyFetchError(detail) => {
                write!(f, "failed to fetch server public key: {detail}")
            }
            SubscribeError::WorkerNotRegistered => f.write_str("no background worker registered"),
            SubscribeError::PlatformError(detail) => write!(f, "platform error: {detail}"),
            SubscribeError::ServerRejected(detail) => {
                write!(f, "server rejected registration: {detail}")
            }
        }
    }
}

/// Obtains a push subscription from the platform and registers it with the
/// server. Permission must already be granted; a denied or undecided
/// permission fails before the platform subscribe API is touched. On success
/// the server record for `client_id` is created or replaced, and callers
/// must invalidate any cached subscription-state query.
pub async fn subscribe<P, A>(
    platform: &P,
    api: &A,
    client_id: &str,
) -> Result<Subscription, SubscribeError>
where
    P: PushPlatform,
    A: ServerApi,
{
    if !platform.push_supported() {
        return Err(SubscribeError::UnsupportedPlatform);
    }
    if platform.permission() != Permission::Granted {
        return Err(SubscribeError::PermissionError);
    }

    let application_server_key = api
        .vapid_public_key()
        .await
        .map_err(|err| SubscribeError::KeyFetchError(err.to_string()))?;

    // Worker registration happens at application startup; here it is only a
    // precondition.
    if !platform.worker_registered() {
        return Err(SubscribeError::WorkerNotRegistered);
    }

    let options = SubscribeOptions {
        user_visible_only: true,
        application_server_key,
    };
    let subscription = platform
        .subscribe(&options)
        .await
        .map_err(|refusal| match refusal {
            Refusal::PermissionDenied => SubscribeError::PermissionError,
            Refusal::Platform(err) => SubscribeError::PlatformError(err.to_string()),
        })?;

    api.register(client_id, &subscription)
        .await
        .map_err(|err| SubscribeError::ServerRejected(err.to_string()))?;

    Ok(subscription)
}
