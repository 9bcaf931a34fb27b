//! Runtime infrastructure - tokio runtime bridge for async chain access

pub mod bridge;
pub mod worker;

pub use bridge::{RuntimeBridge, WalletCommand, WalletError, WalletEvent};
