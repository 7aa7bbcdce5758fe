pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod stream;
