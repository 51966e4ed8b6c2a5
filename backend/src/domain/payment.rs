//! On-chain payment primitives used by the financier workflow.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Application, ApplicationStatus, EduAmount, WalletAddress};

const TX_HASH_HEX_LEN: usize = 64;

/// Percentage applied on top of the node's gas estimate.
pub const GAS_BUFFER_PERCENT: u64 = 120;

/// Native-currency transfer submitted through the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Recipient account.
    pub to: WalletAddress,
    /// Amount to send.
    pub value: EduAmount,
}

impl TransferRequest {
    /// Value in wallet base units.
    #[must_use]
    pub fn value_base_units(&self) -> u128 {
        self.value.base_units()
    }
}

/// Error returned when a transaction hash is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transaction hash must be 0x followed by 64 hex digits")]
pub struct TxHashError;

/// Transaction hash returned by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    /// Validate and normalise a transaction hash.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TxHashError> {
        let raw = raw.as_ref();
        let digits = raw.strip_prefix("0x").ok_or(TxHashError)?;
        if digits.len() != TX_HASH_HEX_LEN || hex::decode(digits).is_err() {
            return Err(TxHashError);
        }
        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    /// Borrow the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for TxHash {
    type Error = TxHashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TxHash> for String {
    fn from(value: TxHash) -> Self {
        value.0
    }
}

/// Mined transaction outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Hash of the mined transaction.
    pub tx_hash: TxHash,
    /// Whether execution succeeded (`false` means reverted).
    pub success: bool,
}

/// Apply the 20% safety margin to a gas estimate, rounding up.
///
/// # Examples
/// ```
/// use scholarships::domain::apply_gas_buffer;
///
/// assert_eq!(apply_gas_buffer(100_000), 120_000);
/// assert_eq!(apply_gas_buffer(1), 2);
/// ```
#[must_use]
pub fn apply_gas_buffer(estimate: u64) -> u64 {
    let buffered = u128::from(estimate) * u128::from(GAS_BUFFER_PERCENT);
    let limit = buffered.div_ceil(100);
    u64::try_from(limit).unwrap_or(u64::MAX)
}

/// Choose the application to pay for a scholarship.
///
/// Takes the approved applications when any exist, otherwise the first
/// application of any status. Input order is respected, so callers pass
/// applications sorted by creation.
#[must_use]
pub fn select_payee<'a>(
    approved: &'a [Application],
    any_status: &'a [Application],
) -> Option<&'a Application> {
    approved
        .iter()
        .find(|app| app.status == ApplicationStatus::Approved)
        .or_else(|| any_status.first())
}
