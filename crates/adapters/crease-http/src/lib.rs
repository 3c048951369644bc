pub mod client;
pub mod config;

pub use client::HttpMatchStore;
pub use config::HttpStoreConfig;
