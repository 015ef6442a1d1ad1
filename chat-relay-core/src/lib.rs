//! Core types for chat-relay
//!
//! This crate provides configuration, logging, the in-memory session store
//! and the model catalog shared by the provider, server and CLI crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod session;

pub use error::{Error, Result};
