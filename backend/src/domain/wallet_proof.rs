//! Proof that a browser controls the wallet it claims.
//!
//! The server issues a [`WalletChallenge`] bound to one address. The wallet
//! signs the challenge text with `personal_sign` (EIP-191), and the session
//! only adopts the address once the recovered signer matches it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use super::WalletAddress;

/// Seconds a challenge stays valid after it is issued.
pub const CHALLENGE_TTL_SECS: i64 = 300;

const SIGNATURE_HEX_LEN: usize = 130;
const NONCE_BYTES: usize = 16;
const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Reasons a wallet proof is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletProofError {
    /// The signature is not 65 hex-encoded bytes with a valid recovery byte.
    #[error("signature must be 0x followed by 130 hex digits")]
    MalformedSignature,
    /// The challenge was signed too late.
    #[error("sign-in challenge expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
    /// No public key can be recovered from the signature.
    #[error("signature does not recover to a public key")]
    Unrecoverable,
    /// The signature was produced by another wallet.
    #[error("signature was not produced by {expected}")]
    SignerMismatch { expected: WalletAddress },
}

/// Hash that `personal_sign` signs for `message`.
#[must_use]
pub fn personal_message_hash(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

/// One-time sign-in challenge bound to a wallet address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletChallenge {
    /// Wallet expected to sign.
    pub address: WalletAddress,
    /// Random hex nonce making each challenge unique.
    pub nonce: String,
    /// When the challenge was handed out.
    pub issued_at: DateTime<Utc>,
}

impl WalletChallenge {
    /// Issue a fresh challenge for `address`.
    #[must_use]
    pub fn issue(address: WalletAddress, now: DateTime<Utc>) -> Self {
        Self {
            address,
            nonce: hex::encode(rand::random::<[u8; NONCE_BYTES]>()),
            issued_at: now,
        }
    }

    /// Text the wallet is asked to sign.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Sign in to Scholarships\n\nWallet: {}\nNonce: {}\nIssued at: {}",
            self.address,
            self.nonce,
            self.issued_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }

    /// Instant after which signatures are refused.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(CHALLENGE_TTL_SECS)
    }

    /// Check that `signature` signs this challenge with the challenged wallet.
    pub fn verify(
        &self,
        signature: &WalletSignature,
        now: DateTime<Utc>,
    ) -> Result<WalletAddress, WalletProofError> {
        let expired_at = self.expires_at();
        if now > expired_at {
            return Err(WalletProofError::Expired { expired_at });
        }
        let key = signature.recover(&personal_message_hash(&self.message()))?;
        let signer = WalletAddress::from_verifying_key(&key);
        if signer != self.address {
            return Err(WalletProofError::SignerMismatch {
                expected: self.address.clone(),
            });
        }
        Ok(signer)
    }
}

/// Recoverable secp256k1 signature in the `r || s || v` layout wallets emit.
#[derive(Clone, PartialEq, Eq)]
pub struct WalletSignature {
    signature: Signature,
    recovery_id: RecoveryId,
}

impl WalletSignature {
    /// Build from raw parts, as produced by a signing key.
    #[must_use]
    pub const fn from_parts(signature: Signature, recovery_id: RecoveryId) -> Self {
        Self {
            signature,
            recovery_id,
        }
    }

    /// Hex encoding with the legacy `27`/`28` recovery byte.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut bytes = self.signature.to_bytes().to_vec();
        bytes.push(self.recovery_id.to_byte() + 27);
        format!("0x{}", hex::encode(bytes))
    }

    fn recover(&self, prehash: &[u8]) -> Result<VerifyingKey, WalletProofError> {
        // Wallets may emit high-s signatures; flip to the low-s twin.
        let (signature, recovery_id) = self.signature.normalize_s().map_or(
            (self.signature, self.recovery_id),
            |normalised| {
                let flipped = RecoveryId::new(
                    !self.recovery_id.is_y_odd(),
                    self.recovery_id.is_x_reduced(),
                );
                (normalised, flipped)
            },
        );
        VerifyingKey::recover_from_prehash(prehash, &signature, recovery_id)
            .map_err(|_| WalletProofError::Unrecoverable)
    }
}

impl fmt::Debug for WalletSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WalletSignature").field(&self.to_hex()).finish()
    }
}

impl FromStr for WalletSignature {
    type Err = WalletProofError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let digits = raw
            .trim()
            .strip_prefix("0x")
            .ok_or(WalletProofError::MalformedSignature)?;
        if digits.len() != SIGNATURE_HEX_LEN {
            return Err(WalletProofError::MalformedSignature);
        }
        let bytes = hex::decode(digits).map_err(|_| WalletProofError::MalformedSignature)?;
        let (&v, rs) = bytes
            .split_last()
            .ok_or(WalletProofError::MalformedSignature)?;
        let recovery_id = RecoveryId::from_byte(if v >= 27 { v - 27 } else { v })
            .filter(|id| !id.is_x_reduced())
            .ok_or(WalletProofError::MalformedSignature)?;
        let signature =
            Signature::from_slice(rs).map_err(|_| WalletProofError::MalformedSignature)?;
        Ok(Self::from_parts(signature, recovery_id))
    }
}

#[cfg(test)]
mod tests {
    use k256::ecdsa::SigningKey;
    use rstest::rstest;

    use super::*;
    use crate::domain::test_support::{epoch, sign_message, signing_key};

    #[rstest]
    fn derives_the_account_address_of_a_key() {
        let key = SigningKey::from_slice(
            &hex::decode("4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318")
                .expect("hex key"),
        )
        .expect("valid key");
        assert_eq!(
            WalletAddress::from_verifying_key(key.verifying_key()).as_str(),
            "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23"
        );
    }

    #[rstest]
    fn signed_challenge_yields_the_wallet() {
        let key = signing_key(7);
        let address = WalletAddress::from_verifying_key(key.verifying_key());
        let challenge = WalletChallenge::issue(address.clone(), epoch());
        let signature = sign_message(&key, &challenge.message())
            .parse::<WalletSignature>()
            .expect("well-formed signature");

        assert_eq!(challenge.verify(&signature, epoch()), Ok(address));
    }

    #[rstest]
    fn signature_from_another_wallet_is_refused() {
        let claimed = WalletAddress::from_verifying_key(signing_key(1).verifying_key());
        let challenge = WalletChallenge::issue(claimed.clone(), epoch());
        let forged = sign_message(&signing_key(2), &challenge.message())
            .parse::<WalletSignature>()
            .expect("well-formed signature");

        assert_eq!(
            challenge.verify(&forged, epoch()),
            Err(WalletProofError::SignerMismatch { expected: claimed })
        );
    }

    #[rstest]
    fn signature_over_an_older_challenge_is_refused() {
        let key = signing_key(3);
        let address = WalletAddress::from_verifying_key(key.verifying_key());
        let stale = WalletChallenge::issue(address.clone(), epoch());
        let fresh = WalletChallenge::issue(address, epoch());
        let signature = sign_message(&key, &stale.message())
            .parse::<WalletSignature>()
            .expect("well-formed signature");

        assert!(matches!(
            fresh.verify(&signature, epoch()),
            Err(WalletProofError::SignerMismatch { .. })
        ));
    }

    #[rstest]
    fn late_signature_is_refused() {
        let key = signing_key(4);
        let challenge =
            WalletChallenge::issue(WalletAddress::from_verifying_key(key.verifying_key()), epoch());
        let signature = sign_message(&key, &challenge.message())
            .parse::<WalletSignature>()
            .expect("well-formed signature");
        let late = challenge.expires_at() + Duration::seconds(1);

        assert_eq!(
            challenge.verify(&signature, late),
            Err(WalletProofError::Expired {
                expired_at: challenge.expires_at()
            })
        );
    }

    #[rstest]
    #[case::empty(String::new())]
    #[case::missing_prefix("deadbeef".to_owned())]
    #[case::short("0x1234".to_owned())]
    #[case::not_hex(format!("0x{}1b", "zz".repeat(64)))]
    #[case::zero_scalars(format!("0x{}1b", "00".repeat(64)))]
    #[case::bad_recovery_byte(format!("0x{}05", "11".repeat(64)))]
    fn malformed_signatures_are_rejected(#[case] raw: String) {
        assert_eq!(
            raw.parse::<WalletSignature>(),
            Err(WalletProofError::MalformedSignature)
        );
    }

    #[rstest]
    fn hex_form_round_trips_with_legacy_recovery_byte() {
        let raw = sign_message(&signing_key(5), "hello");
        assert!(raw.ends_with("1b") || raw.ends_with("1c"));
        let parsed = raw.parse::<WalletSignature>().expect("well-formed signature");
        assert_eq!(parsed.to_hex(), raw);
    }

    #[rstest]
    fn challenges_carry_distinct_nonces() {
        let address = WalletAddress::from_verifying_key(signing_key(6).verifying_key());
        let first = WalletChallenge::issue(address.clone(), epoch());
        let second = WalletChallenge::issue(address, epoch());
        assert_ne!(first.nonce, second.nonce);
        assert!(first.message().contains(&first.nonce));
        assert!(first.message().contains("Issued at: 2024-03-01T09:00:00Z"));
    }
}
