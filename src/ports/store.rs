/// localStorage-like string store. Synchronous on purpose: the client side
/// runs on a single cooperative event loop and the store is a thin wrapper.
pub trait KeyValueStore: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}
