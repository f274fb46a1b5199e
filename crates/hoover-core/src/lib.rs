//! Shared configuration, error, and data types for the Hoover document-search bot.

pub mod config;
pub mod error;
pub mod types;

pub use config::HooverConfig;
pub use error::{HooverError, Result};
pub use types::*;
