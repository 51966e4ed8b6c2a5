//! JSON-RPC envelopes and Ethereum payload DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::{TransactionReceipt, TxHash};

#[derive(Debug, Serialize)]
pub(super) struct RpcRequest<'a, P> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: u64,
    pub(super) method: &'a str,
    pub(super) params: P,
}

impl<'a, P> RpcRequest<'a, P> {
    pub(super) fn new(id: u64, method: &'a str, params: P) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RpcResponse<T> {
    pub(super) result: Option<T>,
    pub(super) error: Option<RpcErrorDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RpcErrorDto {
    pub(super) code: i64,
    pub(super) message: String,
}

/// Transaction object accepted by `eth_estimateGas` and `eth_sendTransaction`.
#[derive(Debug, Serialize)]
pub(super) struct TransactionDto<'a> {
    pub(super) from: &'a str,
    pub(super) to: &'a str,
    pub(super) value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) gas: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReceiptDto {
    pub(super) transaction_hash: String,
    /// `0x1` on success, `0x0` when execution reverted.
    pub(super) status: Option<String>,
}

impl ReceiptDto {
    pub(super) fn into_receipt(self) -> Result<TransactionReceipt, String> {
        let tx_hash = TxHash::new(&self.transaction_hash)
            .map_err(|_| format!("invalid transaction hash {}", self.transaction_hash))?;
        let success = match self.status.as_deref() {
            Some(status) => decode_quantity(status)? == 1,
            None => return Err(format!("receipt for {tx_hash} has no status")),
        };
        Ok(TransactionReceipt { tx_hash, success })
    }
}

/// Encode an integer as a JSON-RPC hex quantity.
pub(super) fn encode_quantity(value: u128) -> String {
    format!("{value:#x}")
}

/// Decode a JSON-RPC hex quantity such as `0x5208`.
pub(super) fn decode_quantity(raw: &str) -> Result<u64, String> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| format!("quantity {raw} lacks 0x prefix"))?;
    if digits.is_empty() {
        return Err(format!("quantity {raw} has no digits"));
    }
    u64::from_str_radix(digits, 16).map_err(|err| format!("quantity {raw}: {err}"))
}
