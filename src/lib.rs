pub mod client;
pub mod cmd;
pub mod codec;
pub mod commands;
pub mod connection;
pub mod frame;
pub mod logging;
pub mod reply;

pub use client::{Client, Config, ServerError};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
