//! Wallet addresses as used by applicants, recipients, and the government
//! officer.

use std::fmt;

use k256::ecdsa::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

const ADDRESS_HEX_LEN: usize = 40;
/// Bytes of the Keccak-256 public key hash that are dropped.
const ADDRESS_HASH_OFFSET: usize = 12;

/// Validation errors returned by [`WalletAddress::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletAddressError {
    /// The value was blank.
    #[error("wallet address must not be empty")]
    Empty,
    /// Missing `0x` prefix.
    #[error("wallet address must start with 0x")]
    MissingPrefix,
    /// Wrong number of hex digits.
    #[error("wallet address must contain exactly 40 hex digits")]
    InvalidLength,
    /// Non-hex characters after the prefix.
    #[error("wallet address must be hexadecimal")]
    InvalidHex,
}

/// Hex account address, normalised to lower case.
///
/// Equality ignores the checksum casing of the input, so
/// `0xAbC...` and `0xabc...` name the same wallet.
///
/// # Examples
/// ```
/// use scholarships::domain::WalletAddress;
///
/// let a = WalletAddress::new("0x52908400098527886E0F7030069857D2E4169EE7").expect("valid");
/// let b = WalletAddress::new("0x52908400098527886e0f7030069857d2e4169ee7").expect("valid");
/// assert_eq!(a, b);
/// assert_eq!(a.abbreviated(), "0x5290...9ee7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Validate and normalise an address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, WalletAddressError> {
        let raw = raw.as_ref();
        if raw.trim().is_empty() {
            return Err(WalletAddressError::Empty);
        }
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or(WalletAddressError::MissingPrefix)?;
        if digits.len() != ADDRESS_HEX_LEN {
            return Err(WalletAddressError::InvalidLength);
        }
        hex::decode(digits).map_err(|_| WalletAddressError::InvalidHex)?;
        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    /// Account address controlled by `key`.
    ///
    /// The last 20 bytes of the Keccak-256 hash of the uncompressed public
    /// key, without its `0x04` tag byte.
    #[must_use]
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let hash = Keccak256::digest(point.as_bytes().get(1..).unwrap_or_default());
        let account = hash.get(ADDRESS_HASH_OFFSET..).unwrap_or_default();
        Self(format!("0x{}", hex::encode(account)))
    }

    /// Borrow the normalised address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Short form `0x1234...abcd` used in dashboard tables.
    #[must_use]
    pub fn abbreviated(&self) -> String {
        let head = self.0.get(..6).unwrap_or_default();
        let tail = self.0.get(self.0.len().saturating_sub(4)..).unwrap_or_default();
        format!("{head}...{tail}")
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = WalletAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}
