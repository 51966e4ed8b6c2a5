//! Wallet outbound adapters.
//!
//! A thin JSON-RPC implementation of the `WalletProvider` port.

mod dto;
mod json_rpc_provider;

pub use json_rpc_provider::{JsonRpcWalletProvider, WalletTimings};
