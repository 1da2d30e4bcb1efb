//! # csvr Common Library
//!
//! Shared code for the CSV reporter client crates:
//! - Configuration loading (TOML + environment)
//! - Logging initialisation
//! - Event types and the broadcast EventBus
//! - Observable values and memoised derivations
//! - Timestamp formatting for job labels

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod observable;
pub mod time;

pub use error::{Error, Result};
pub use observable::{Computed, ValueExpression};
