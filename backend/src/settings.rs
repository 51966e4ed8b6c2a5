//! Service configuration loaded via OrthoConfig.
//!
//! Every key can come from the command line, a config file or a
//! `SCHOLARSHIPS_*` environment variable. Optional keys fall back to the
//! defaults exposed by the accessor methods.

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{WALLET_CACHE_CAPACITY, WalletAddress};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_GOVERNMENT_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONFIRMATION_POLL_INTERVAL_MS: u64 = 1_000;
const DEFAULT_WALLET_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid {key} '{value}': {message}")]
    Address {
        key: &'static str,
        value: String,
        message: String,
    },
    #[error("invalid wallet_rpc_url '{value}': {message}")]
    RpcUrl { value: String, message: String },
    #[error("wallet_from_address is required when wallet_rpc_url is set")]
    MissingFromAddress,
}

/// JSON-RPC wallet endpoint and the account that pays scholarships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletEndpoint {
    pub url: Url,
    pub from: WalletAddress,
}

/// Configuration values for the scholarship service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SCHOLARSHIPS")]
pub struct ScholarshipSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the service keeps data in memory.
    pub database_url: Option<String>,
    /// Wallet JSON-RPC endpoint. Without one funding is unavailable.
    pub wallet_rpc_url: Option<String>,
    /// Account the wallet endpoint signs payments for.
    pub wallet_from_address: Option<String>,
    /// Government officer wallet.
    pub government_address: Option<String>,
    /// Comma-separated wallets allowed to fund. Unset lets any wallet fund.
    pub financier_addresses: Option<String>,
    pub confirmation_timeout_secs: Option<u64>,
    pub confirmation_poll_interval_ms: Option<u64>,
    pub wallet_request_timeout_secs: Option<u64>,
    /// Wallets each dashboard keeps cached lookups for.
    pub wallet_cache_capacity: Option<usize>,
    /// Record applications locally when the store fails unexpectedly.
    #[ortho_config(default = false)]
    pub optimistic_apply: bool,
    pub session_key_file: Option<PathBuf>,
    /// Allow a generated session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_session_key: bool,
    /// Mark session cookies `Secure`. Defaults to on.
    pub cookie_secure: Option<bool>,
}

fn parse_address(key: &'static str, raw: &str) -> Result<WalletAddress, SettingsError> {
    WalletAddress::new(raw).map_err(|err| SettingsError::Address {
        key,
        value: raw.to_owned(),
        message: err.to_string(),
    })
}

impl ScholarshipSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    pub fn government_address(&self) -> Result<WalletAddress, SettingsError> {
        parse_address(
            "government_address",
            self.government_address
                .as_deref()
                .unwrap_or(DEFAULT_GOVERNMENT_ADDRESS),
        )
    }

    /// Wallets allowed to fund scholarships; empty when unrestricted.
    pub fn financier_addresses(&self) -> Result<Vec<WalletAddress>, SettingsError> {
        self.financier_addresses
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| parse_address("financier_addresses", raw))
            .collect()
    }

    /// The wallet endpoint, or `None` when no RPC URL is configured.
    pub fn wallet_endpoint(&self) -> Result<Option<WalletEndpoint>, SettingsError> {
        let Some(raw) = self.wallet_rpc_url.as_deref().filter(|u| !u.trim().is_empty()) else {
            return Ok(None);
        };
        let url = Url::parse(raw).map_err(|err| SettingsError::RpcUrl {
            value: raw.to_owned(),
            message: err.to_string(),
        })?;
        let from = self
            .wallet_from_address
            .as_deref()
            .ok_or(SettingsError::MissingFromAddress)
            .and_then(|raw| parse_address("wallet_from_address", raw))?;
        Ok(Some(WalletEndpoint { url, from }))
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(
            self.confirmation_timeout_secs
                .unwrap_or(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
        )
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.confirmation_poll_interval_ms
                .unwrap_or(DEFAULT_CONFIRMATION_POLL_INTERVAL_MS),
        )
    }

    pub fn wallet_request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.wallet_request_timeout_secs
                .unwrap_or(DEFAULT_WALLET_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Cache bound per service. Zero or unset falls back to the default.
    pub fn wallet_cache_capacity(&self) -> NonZeroUsize {
        self.wallet_cache_capacity
            .and_then(NonZeroUsize::new)
            .unwrap_or(WALLET_CACHE_CAPACITY)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }
}
