use crate::config::AppConfig;
use crate::push;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: push::SubscriptionStore,
}
