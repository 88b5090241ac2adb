// src/infrastructure/mod.rs
pub mod card_file;
pub mod config;
pub mod connect;
pub mod media;
pub mod transport;

pub use config::Config;
pub use connect::AnkiConnectClient;
pub use transport::{HttpTransport, Transport};
