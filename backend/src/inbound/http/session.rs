//! Connected-wallet session helpers.
//!
//! The connected wallet address lives in the cookie session, next to the
//! pending sign-in challenge while one is outstanding. Handlers take a
//! [`WalletSession`] and never touch `actix_session` directly.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, WalletAddress, WalletChallenge};

pub(crate) const WALLET_ADDRESS_KEY: &str = "wallet_address";
pub(crate) const WALLET_CHALLENGE_KEY: &str = "wallet_challenge";

/// Wallet-aware view over the Actix session.
#[derive(Clone)]
pub struct WalletSession(Session);

impl WalletSession {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store `challenge` as the only one this session may answer.
    pub fn issue_challenge(&self, challenge: &WalletChallenge) -> Result<(), Error> {
        self.0
            .insert(WALLET_CHALLENGE_KEY, challenge)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Remove and return the pending challenge. Each challenge answers once.
    pub fn take_challenge(&self) -> Result<Option<WalletChallenge>, Error> {
        let challenge = self
            .0
            .get::<WalletChallenge>(WALLET_CHALLENGE_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        self.0.remove(WALLET_CHALLENGE_KEY);
        Ok(challenge)
    }

    /// Remember `address` as the connected wallet and rotate the session id.
    pub fn connect(&self, address: &WalletAddress) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(WALLET_ADDRESS_KEY, address.as_str())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Forget the connected wallet.
    pub fn disconnect(&self) {
        self.0.purge();
    }

    /// The connected wallet, if any. A tampered value reads as disconnected.
    pub fn address(&self) -> Result<Option<WalletAddress>, Error> {
        let raw = self
            .0
            .get::<String>(WALLET_ADDRESS_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| match WalletAddress::new(&raw) {
            Ok(address) => Some(address),
            Err(error) => {
                warn!(%error, "invalid wallet address in session cookie");
                None
            }
        }))
    }

    /// The connected wallet or `401 Unauthorized`.
    pub fn require_address(&self) -> Result<WalletAddress, Error> {
        self.address()?
            .ok_or_else(|| Error::unauthorized("Please connect your wallet first"))
    }
}

impl FromRequest for WalletSession {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(WalletSession::new) })
    }
}
