//! Ethereum infrastructure - alloy client and contract bindings

pub mod client;
pub mod contracts;

pub use client::{AlloyClient, ChainClient};
