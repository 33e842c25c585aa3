//! Shared types for the mediqueue realtime push service and its callers.

pub mod error;
pub mod events;
pub mod models;

pub use error::*;
pub use events::*;
pub use models::*;
