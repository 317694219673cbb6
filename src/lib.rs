pub mod admin;
pub mod bucket;
pub mod config;
pub mod content;
pub mod error;
pub mod identity;
pub mod server;
