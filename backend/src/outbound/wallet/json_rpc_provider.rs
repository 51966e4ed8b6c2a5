//! Reqwest-backed wallet provider speaking Ethereum JSON-RPC.
//!
//! The provider sends from one unlocked account on the configured node and
//! polls `eth_getTransactionReceipt` until the transaction is mined or the
//! confirmation deadline passes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::{Instant, sleep};
use tracing::debug;

use super::dto::{
    ReceiptDto, RpcErrorDto, RpcRequest, RpcResponse, TransactionDto, decode_quantity,
    encode_quantity,
};
use crate::domain::ports::{WalletError, WalletProvider};
use crate::domain::{TransactionReceipt, TransferRequest, TxHash, WalletAddress};

/// EIP-1193 code for a request the account holder declined.
const USER_REJECTED_CODE: i64 = 4001;

/// Timing knobs for the JSON-RPC wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletTimings {
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Delay between receipt polls.
    pub poll_interval: Duration,
    /// How long to wait for a receipt before giving up.
    pub confirmation_timeout: Duration,
}

impl Default for WalletTimings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            confirmation_timeout: Duration::from_secs(120),
        }
    }
}

/// Wallet provider that talks to a JSON-RPC node.
pub struct JsonRpcWalletProvider {
    client: Client,
    endpoint: Url,
    from: WalletAddress,
    timings: WalletTimings,
    next_id: AtomicU64,
}

impl JsonRpcWalletProvider {
    /// Build a provider paying from `from` through `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        from: WalletAddress,
        timings: WalletTimings,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timings.request_timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            from,
            timings,
            next_id: AtomicU64::new(1),
        })
    }

    fn transaction<'a>(
        &'a self,
        request: &'a TransferRequest,
        gas: Option<u64>,
    ) -> TransactionDto<'a> {
        TransactionDto {
            from: self.from.as_str(),
            to: request.to.as_str(),
            value: encode_quantity(request.value_base_units()),
            gas: gas.map(|g| encode_quantity(u128::from(g))),
        }
    }

    async fn call<P, T>(&self, method: &str, params: P) -> Result<Option<T>, WalletError>
    where
        P: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let builder = self
            .client
            .post(self.endpoint.clone())
            .json(&RpcRequest::new(id, method, params));
        let response = builder.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let decoded: RpcResponse<T> = serde_json::from_slice(&body).map_err(|err| {
            WalletError::transport(format!("invalid {method} response: {err}"))
        })?;
        if let Some(error) = decoded.error {
            return Err(map_rpc_error(error));
        }
        debug!(method, id, "wallet call succeeded");
        Ok(decoded.result)
    }

    async fn required<P, T>(&self, method: &str, params: P) -> Result<T, WalletError>
    where
        P: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        self.call(method, params)
            .await?
            .ok_or_else(|| WalletError::transport(format!("{method} returned no result")))
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWalletProvider {
    async fn estimate_gas(&self, request: &TransferRequest) -> Result<u64, WalletError> {
        let quantity: String = self
            .required("eth_estimateGas", [self.transaction(request, None)])
            .await?;
        decode_quantity(&quantity).map_err(WalletError::transport)
    }

    async fn send_transaction(
        &self,
        request: &TransferRequest,
        gas_limit: u64,
    ) -> Result<TxHash, WalletError> {
        let hash: String = self
            .required(
                "eth_sendTransaction",
                [self.transaction(request, Some(gas_limit))],
            )
            .await?;
        TxHash::new(&hash)
            .map_err(|_| WalletError::transport(format!("invalid transaction hash {hash}")))
    }

    async fn wait_for_confirmation(
        &self,
        tx_hash: &TxHash,
    ) -> Result<TransactionReceipt, WalletError> {
        let deadline = Instant::now() + self.timings.confirmation_timeout;
        loop {
            let receipt: Option<ReceiptDto> = self
                .call("eth_getTransactionReceipt", [tx_hash.as_str()])
                .await?;
            if let Some(receipt) = receipt {
                return receipt.into_receipt().map_err(WalletError::transport);
            }
            if Instant::now() + self.timings.poll_interval > deadline {
                return Err(WalletError::timeout(tx_hash.to_string()));
            }
            sleep(self.timings.poll_interval).await;
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> WalletError {
    if error.is_timeout() || error.is_connect() {
        WalletError::unavailable(error.to_string())
    } else {
        WalletError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> WalletError {
    let preview = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(160)
        .collect::<String>();
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        WalletError::unavailable(message)
    } else {
        WalletError::transport(message)
    }
}

fn map_rpc_error(error: RpcErrorDto) -> WalletError {
    match error.code {
        USER_REJECTED_CODE => WalletError::rejected(format!("user rejected: {}", error.message)),
        _ => WalletError::rejected(format!("{} (code {})", error.message, error.code)),
    }
}
