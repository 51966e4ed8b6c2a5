//! Wallet connection endpoints.
//!
//! Connecting is a two-step handshake. The browser asks for a challenge
//! bound to its address, signs the returned message with `personal_sign`
//! and posts the signature back. Only a signature recovering to the
//! challenged address connects the session.
//!
//! ```text
//! POST /api/v1/wallet/challenge {"address":"0x5290...9ee7"}
//! POST /api/v1/wallet/connect {"address":"0x5290...9ee7","signature":"0x..."}
//! POST /api/v1/wallet/disconnect
//! GET  /api/v1/wallet
//! ```

use actix_web::{get, post, web};
use tracing::{info, warn};

use crate::domain::{Error, WalletAddress, WalletChallenge, WalletProofError};
use crate::inbound::http::{ApiResult, params};
use crate::inbound::http::dto::{
    ChallengeBody, ChallengeRequest, ConnectWalletRequest, WalletStatusBody,
};
use crate::inbound::http::session::WalletSession;
use crate::inbound::http::state::HttpState;

fn status_body(state: &HttpState, address: Option<WalletAddress>) -> WalletStatusBody {
    WalletStatusBody {
        connected: address.is_some(),
        is_government: address.as_ref().is_some_and(|a| state.is_government(a)),
        short_address: address.as_ref().map(WalletAddress::abbreviated),
        address: address.map(String::from),
    }
}

fn proof_error(error: &WalletProofError) -> Error {
    match *error {
        WalletProofError::MalformedSignature => Error::invalid_request(error.to_string()),
        WalletProofError::Expired { .. } => {
            Error::unauthorized("Sign-in challenge expired; request a new one")
        }
        WalletProofError::Unrecoverable | WalletProofError::SignerMismatch { .. } => {
            Error::unauthorized("Signature does not prove ownership of this wallet")
        }
    }
}

/// Issue a sign-in challenge for a wallet.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/challenge",
    request_body = ChallengeRequest,
    responses(
        (status = 200, description = "Challenge issued", body = ChallengeBody,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Malformed address", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "requestWalletChallenge"
)]
#[post("/wallet/challenge")]
pub async fn request_challenge(
    state: web::Data<HttpState>,
    session: WalletSession,
    payload: web::Json<ChallengeRequest>,
) -> ApiResult<web::Json<ChallengeBody>> {
    let address = params::wallet_address("address", &payload.address)?;
    let challenge = WalletChallenge::issue(address, state.clock.utc());
    session.issue_challenge(&challenge)?;
    Ok(web::Json(ChallengeBody::from(&challenge)))
}

/// Connect a wallet to the session by answering its challenge.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/connect",
    request_body = ConnectWalletRequest,
    responses(
        (status = 200, description = "Wallet connected", body = WalletStatusBody,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Malformed address or signature", body = Error),
        (status = 401, description = "No matching challenge or invalid signature", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "connectWallet"
)]
#[post("/wallet/connect")]
pub async fn connect_wallet(
    state: web::Data<HttpState>,
    session: WalletSession,
    payload: web::Json<ConnectWalletRequest>,
) -> ApiResult<web::Json<WalletStatusBody>> {
    let address = params::wallet_address("address", &payload.address)?;
    let signature = params::wallet_signature("signature", &payload.signature)?;
    let challenge = session
        .take_challenge()?
        .filter(|challenge| challenge.address == address)
        .ok_or_else(|| Error::unauthorized("Request a sign-in challenge for this wallet first"))?;
    let proven = challenge
        .verify(&signature, state.clock.utc())
        .map_err(|error| {
            warn!(address = %address, %error, "wallet proof rejected");
            proof_error(&error)
        })?;
    session.connect(&proven)?;
    info!(address = %proven, "wallet connected");
    Ok(web::Json(status_body(&state, Some(proven))))
}

/// Disconnect the session wallet.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/disconnect",
    responses((status = 200, description = "Wallet disconnected", body = WalletStatusBody)),
    tags = ["wallet"],
    operation_id = "disconnectWallet"
)]
#[post("/wallet/disconnect")]
pub async fn disconnect_wallet(
    state: web::Data<HttpState>,
    session: WalletSession,
) -> web::Json<WalletStatusBody> {
    session.disconnect();
    web::Json(status_body(&state, None))
}

/// Report the connected wallet.
#[utoipa::path(
    get,
    path = "/api/v1/wallet",
    responses((status = 200, description = "Wallet status", body = WalletStatusBody)),
    tags = ["wallet"],
    operation_id = "walletStatus"
)]
#[get("/wallet")]
pub async fn wallet_status(
    state: web::Data<HttpState>,
    session: WalletSession,
) -> ApiResult<web::Json<WalletStatusBody>> {
    Ok(web::Json(status_body(&state, session.address()?)))
}

#[cfg(test)]
#[path = "wallet_tests.rs"]
mod tests;
