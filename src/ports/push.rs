use crate::types::push::Subscription;

/// Delivery failure as seen by the dispatch service. `EndpointGone` is the
/// push service reporting the endpoint as permanently gone (HTTP 404/410),
/// which obligates the caller to drop the stale subscription record.
#[derive(Debug)]
pub enum SendError<E> {
    EndpointGone,
    Transport(E),
}

impl<E: std::fmt::Display> std::fmt::Display for SendError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendError::EndpointGone => f.write_str("push endpoint gone"),
            SendError::Transport(err) => write!(f, "push transport error: {err}"),
        }
    }
}

pub trait PushSender: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type Fut<'a>: Future<Output = Result<(), SendError<Self::Error>>> + Send + 'a
    where
        Self: 'a;

    fn send<'a>(&'a self, subscription: &'a Subscription, message: &'a str) -> Self::Fut<'a>;
}
