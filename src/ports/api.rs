use crate::types::push::Subscription;

/// The HTTP-client boundary between the browser-side code and the server.
pub trait ServerApi: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type KeyFut<'a>: Future<Output = Result<String, Self::Error>> + Send + 'a
    where
        Self: 'a;
    type RegisterFut<'a>: Future<Output = Result<(), Self::Error>> + Send + 'a
    where
        Self: 'a;
    type CheckFut<'a>: Future<Output = Result<bool, Self::Error>> + Send + 'a
    where
        Self: 'a;

    fn vapid_public_key<'a>(&'a self) -> Self::KeyFut<'a>;
    fn register<'a>(
        &'a self,
        client_id: &'a str,
        subscription: &'a Subscription,
    ) -> Self::RegisterFut<'a>;
    fn is_subscribed<'a>(&'a self, client_id: &'a str) -> Self::CheckFut<'a>;
}
