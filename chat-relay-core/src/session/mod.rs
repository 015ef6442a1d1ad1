//! Session management for conversation history
//!
//! Sessions live in memory for the lifetime of the serving process. There
//! is no eviction and no persistence.

pub mod manager;
pub mod store;

pub use manager::SessionStore;
pub use store::{ChatTurn, Role, Session};
