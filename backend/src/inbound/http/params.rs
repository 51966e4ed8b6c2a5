//! Path parameter parsing shared by the scholarship handlers.

use serde_json::json;

use crate::domain::{Error, ScholarshipId, WalletAddress, WalletSignature};

/// Parse a scholarship id from a path segment.
pub fn scholarship_id(raw: &str) -> Result<ScholarshipId, Error> {
    raw.parse().map_err(|_| {
        Error::invalid_request(format!("scholarship id must be a UUID, got {raw}"))
            .with_details(json!({ "field": "id" }))
    })
}

/// Parse a wallet address from a request field.
pub fn wallet_address(field: &str, raw: &str) -> Result<WalletAddress, Error> {
    WalletAddress::new(raw).map_err(|err| {
        Error::invalid_request(format!("invalid wallet address: {err}"))
            .with_details(json!({ "field": field }))
    })
}

/// Parse a `personal_sign` signature from a request field.
pub fn wallet_signature(field: &str, raw: &str) -> Result<WalletSignature, Error> {
    raw.parse().map_err(|err| {
        Error::invalid_request(format!("invalid signature: {err}"))
            .with_details(json!({ "field": field }))
    })
}
