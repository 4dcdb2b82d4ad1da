//! Startup helpers shared by the gateway binary

mod config;

pub use config::load_config;
