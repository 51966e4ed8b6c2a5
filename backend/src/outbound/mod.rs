//! Outbound adapters implementing the driven ports.
//!
//! - **memory**: process-local store used without a database and in tests
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **wallet**: Ethereum JSON-RPC wallet provider
//!
//! Adapters translate between domain types and infrastructure formats and
//! hold no workflow rules.

pub mod memory;
pub mod persistence;
pub mod wallet;
