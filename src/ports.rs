pub mod api;
pub mod platform;
pub mod push;
pub mod store;

pub use api::ServerApi;
pub use platform::{Permission, PushPlatform, Refusal, SubscribeOptions};
pub use push::{PushSender, SendError};
pub use store::KeyValueStore;
