//! Port for the wallet that signs and broadcasts payments.

use async_trait::async_trait;

use crate::domain::{TransactionReceipt, TransferRequest, TxHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised by wallet provider adapters.
    pub enum WalletError {
        /// The wallet endpoint could not be reached.
        Unavailable { message: String } =>
            "wallet provider unavailable: {message}",
        /// The wallet or node refused the request.
        Rejected { message: String } =>
            "wallet rejected the request: {message}",
        /// The transaction was mined but execution failed.
        Reverted { tx_hash: String } =>
            "transaction {tx_hash} reverted",
        /// No receipt arrived before the confirmation deadline.
        Timeout { tx_hash: String } =>
            "timed out waiting for transaction {tx_hash}",
        /// The wallet answered with something that could not be decoded.
        Transport { message: String } =>
            "wallet transport error: {message}",
    }
}

/// Port for estimating, sending and confirming native transfers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Estimate gas units for `request`.
    async fn estimate_gas(&self, request: &TransferRequest) -> Result<u64, WalletError>;

    /// Sign and broadcast `request` with the given gas limit.
    async fn send_transaction(
        &self,
        request: &TransferRequest,
        gas_limit: u64,
    ) -> Result<TxHash, WalletError>;

    /// Wait until `tx_hash` is mined and return its receipt.
    async fn wait_for_confirmation(
        &self,
        tx_hash: &TxHash,
    ) -> Result<TransactionReceipt, WalletError>;
}
