pub mod adapters;
pub mod app;
pub mod client;
pub mod config;
pub mod ports;
pub mod push;
pub mod state;
pub mod types;
pub mod worker;

pub use app::{app, serve};
pub use push::{VapidCredentials, generate_vapid_credentials};
