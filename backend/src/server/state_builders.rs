//! Builders wiring repositories, the wallet and domain services into HTTP
//! state.

use std::num::NonZeroUsize;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use crate::domain::ports::{ApplicationRepository, ScholarshipRepository, WalletProvider};
use crate::domain::{
    ApplyPolicy, CatalogService, FinancierDashboardService, GovernmentDashboardService,
    ScholarshipBoard, StudentDashboardService, WALLET_CACHE_CAPACITY, WalletAddress,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::persistence::{DieselApplicationRepository, DieselScholarshipRepository};

use super::ServerConfig;

/// Collaborators shared by every dashboard service.
#[derive(Clone)]
pub struct ServiceOptions {
    pub government: WalletAddress,
    pub apply_policy: ApplyPolicy,
    pub wallet: Option<Arc<dyn WalletProvider>>,
    pub clock: Arc<dyn Clock>,
    pub cache_capacity: NonZeroUsize,
}

impl ServiceOptions {
    /// Options using the system clock.
    pub fn new(
        government: WalletAddress,
        apply_policy: ApplyPolicy,
        wallet: Option<Arc<dyn WalletProvider>>,
    ) -> Self {
        Self {
            government,
            apply_policy,
            wallet,
            clock: Arc::new(DefaultClock),
            cache_capacity: WALLET_CACHE_CAPACITY,
        }
    }

    /// Bound the per-wallet caches of the catalog and student services.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

/// Build every driving port over one shared scholarship board.
pub fn build_ports<S, A>(
    scholarship_repo: Arc<S>,
    application_repo: Arc<A>,
    options: ServiceOptions,
) -> HttpStatePorts
where
    S: ScholarshipRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let ServiceOptions {
        government,
        apply_policy,
        wallet,
        clock,
        cache_capacity,
    } = options;
    let board = Arc::new(ScholarshipBoard::new(
        scholarship_repo,
        Arc::clone(&application_repo),
        Arc::clone(&clock),
    ));
    HttpStatePorts {
        catalog: Arc::new(
            CatalogService::new(
                Arc::clone(&board),
                Arc::clone(&application_repo),
                clock,
                government,
            )
            .with_policy(apply_policy)
            .with_cache_capacity(cache_capacity),
        ),
        student: Arc::new(
            StudentDashboardService::new(Arc::clone(&board), Arc::clone(&application_repo))
                .with_cache_capacity(cache_capacity),
        ),
        government: Arc::new(GovernmentDashboardService::new(
            Arc::clone(&board),
            Arc::clone(&application_repo),
        )),
        financier: Arc::new(FinancierDashboardService::new(
            board,
            application_repo,
            wallet,
        )),
    }
}

/// Build HTTP state from the server configuration.
///
/// Uses Diesel repositories when a pool is configured, otherwise one
/// in-memory store backs both repository ports.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    let options = ServiceOptions::new(
        config.government.clone(),
        config.apply_policy,
        config.wallet.clone(),
    )
    .with_cache_capacity(config.cache_capacity);
    let ports = match &config.db_pool {
        Some(pool) => build_ports(
            Arc::new(DieselScholarshipRepository::new(pool.clone())),
            Arc::new(DieselApplicationRepository::new(pool.clone())),
            options,
        ),
        None => {
            info!("no database configured; scholarships are kept in memory");
            let store = Arc::new(InMemoryStore::new());
            build_ports(Arc::clone(&store), store, options)
        }
    };
    HttpState::new(ports, config.government.clone()).with_financiers(config.financiers.clone())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ScholarshipDraft;
    use crate::domain::ports::{BrowseRequest, CatalogTab, CreateScholarshipRequest};

    fn officer() -> WalletAddress {
        WalletAddress::new(format!("0x{}", "90".repeat(20))).expect("valid address")
    }

    #[rstest]
    #[tokio::test]
    async fn services_share_one_board() {
        let store = Arc::new(InMemoryStore::new());
        let ports = build_ports(
            Arc::clone(&store),
            store,
            ServiceOptions::new(officer(), ApplyPolicy::Strict, None),
        );

        ports
            .catalog
            .create(CreateScholarshipRequest {
                address: Some(officer()),
                draft: ScholarshipDraft {
                    title: "Arts Grant".to_owned(),
                    description: String::new(),
                    amount: "0.5".parse().expect("valid amount"),
                },
            })
            .await
            .expect("create succeeds");

        let catalog = ports
            .catalog
            .browse(BrowseRequest {
                tab: CatalogTab::All,
                ..BrowseRequest::default()
            })
            .await
            .expect("browse succeeds");
        let government = ports.government.overview().await.expect("overview");
        assert_eq!(catalog.entries.len(), 1);
        assert_eq!(government.total, 1);
    }
}
