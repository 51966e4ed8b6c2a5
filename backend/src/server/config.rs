//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use crate::domain::ports::WalletProvider;
use crate::domain::{ApplyPolicy, WALLET_CACHE_CAPACITY, WalletAddress};
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) government: WalletAddress,
    pub(crate) financiers: Vec<WalletAddress>,
    pub(crate) apply_policy: ApplyPolicy,
    pub(crate) cache_capacity: NonZeroUsize,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) wallet: Option<Arc<dyn WalletProvider>>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration with in-memory storage and no
    /// wallet provider.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        government: WalletAddress,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            government,
            financiers: Vec::new(),
            apply_policy: ApplyPolicy::default(),
            cache_capacity: WALLET_CACHE_CAPACITY,
            db_pool: None,
            wallet: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the wallet provider used for funding.
    #[must_use]
    pub fn with_wallet(mut self, wallet: Arc<dyn WalletProvider>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    #[must_use]
    pub fn with_apply_policy(mut self, policy: ApplyPolicy) -> Self {
        self.apply_policy = policy;
        self
    }

    /// Restrict funding to these wallets and the government account.
    #[must_use]
    pub fn with_financiers(mut self, financiers: Vec<WalletAddress>) -> Self {
        self.financiers = financiers;
        self
    }

    /// Bound the per-wallet caches kept by the dashboard services.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
