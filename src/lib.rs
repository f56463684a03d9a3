pub mod app;
pub mod config;
pub mod forward;
pub mod models;
pub mod platform;
pub mod prompt;
pub mod recon;
