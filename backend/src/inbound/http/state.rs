//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised with mocks and no I/O.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    FinancierFunding, GovernmentReview, ScholarshipCatalog, StudentDashboard,
};
use crate::domain::{Error, WalletAddress};

/// Driving ports used by the HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub catalog: Arc<dyn ScholarshipCatalog>,
    pub student: Arc<dyn StudentDashboard>,
    pub government: Arc<dyn GovernmentReview>,
    pub financier: Arc<dyn FinancierFunding>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub catalog: Arc<dyn ScholarshipCatalog>,
    pub student: Arc<dyn StudentDashboard>,
    pub government: Arc<dyn GovernmentReview>,
    pub financier: Arc<dyn FinancierFunding>,
    /// Time source for sign-in challenges.
    pub clock: Arc<dyn Clock>,
    government_address: WalletAddress,
    financiers: Vec<WalletAddress>,
}

impl HttpState {
    pub fn new(ports: HttpStatePorts, government_address: WalletAddress) -> Self {
        let HttpStatePorts {
            catalog,
            student,
            government,
            financier,
        } = ports;
        Self {
            catalog,
            student,
            government,
            financier,
            clock: Arc::new(DefaultClock),
            government_address,
            financiers: Vec::new(),
        }
    }

    /// Replace the challenge clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Restrict funding to `financiers` and the government account.
    ///
    /// An empty list lets any connected wallet fund.
    #[must_use]
    pub fn with_financiers(mut self, financiers: Vec<WalletAddress>) -> Self {
        self.financiers = financiers;
        self
    }

    /// Address allowed to create and review scholarships.
    pub fn government_address(&self) -> &WalletAddress {
        &self.government_address
    }

    pub fn is_government(&self, address: &WalletAddress) -> bool {
        *address == self.government_address
    }

    /// `403 Forbidden` unless `address` is the government account.
    pub fn require_government(&self, address: &WalletAddress) -> Result<(), Error> {
        if self.is_government(address) {
            Ok(())
        } else {
            Err(Error::forbidden(
                "Only the government account can review scholarships",
            ))
        }
    }

    /// `403 Forbidden` unless `address` may fund scholarships.
    pub fn require_financier(&self, address: &WalletAddress) -> Result<(), Error> {
        if self.financiers.is_empty()
            || self.is_government(address)
            || self.financiers.contains(address)
        {
            Ok(())
        } else {
            Err(Error::forbidden(
                "Only registered financiers can fund scholarships",
            ))
        }
    }
}
