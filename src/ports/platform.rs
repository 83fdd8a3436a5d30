use crate::types::push::Subscription;

/// Notification permission tri-state, owned by the platform and read-only to
/// the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Default,
    Granted,
    Denied,
}

/// Options passed to the platform subscribe call. Delivered-payload
/// visibility is always requested; silent push is a policy violation.
#[derive(Debug, Clone)]
pub struct SubscribeOptions {
    pub user_visible_only: bool,
    pub application_server_key: String,
}

/// Why the platform refused to hand out a subscription.
#[derive(Debug)]
pub enum Refusal<E> {
    PermissionDenied,
    Platform(E),
}

impl<E: std::fmt::Display> std::fmt::Display for Refusal<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Refusal::PermissionDenied => f.write_str("push permission denied"),
            Refusal::Platform(err) => write!(f, "platform error: {err}"),
        }
    }
}

/// Browser push capability surface, injected so the registrar and tests can
/// substitute a fake platform for the real browser singletons.
pub trait PushPlatform: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type PermissionFut<'a>: Future<Output = Permission> + Send + 'a
    where
        Self: 'a;
    type RegisterFut<'a>: Future<Output = Result<(), Self::Error>> + Send + 'a
    where
        Self: 'a;
    type SubscribeFut<'a>: Future<Output = Result<Subscription, Refusal<Self::Error>>> + Send + 'a
    where
        Self: 'a;

    fn push_supported(&self) -> bool;
    fn permission(&self) -> Permission;
    fn request_permission<'a>(&'a self) -> Self::PermissionFut<'a>;
    fn register_worker<'a>(&'a self) -> Self::RegisterFut<'a>;
    fn worker_registered(&self) -> bool;
    fn subscribe<'a>(&'a self, options: &'a SubscribeOptions) -> Self::SubscribeFut<'a>;
}
