//! Scholarship catalog and apply workflow.
//!
//! The service keeps a bounded per-wallet cache of scholarships already
//! applied for. A cached id short-circuits `apply` without touching the
//! repository. The cache is reloaded from the repository whenever the wallet
//! browses, and the least recently seen wallets are evicted once it is full.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::board::ScholarshipBoard;
use super::ports::{
    ActionBadge, ApplicationRepository, ApplicationRepositoryError, ApplyOutcome, ApplyRequest,
    BrowseRequest, CatalogEntry, CatalogView, CreateScholarshipRequest, CreateScholarshipResponse,
    ScholarshipCatalog, ScholarshipRepository,
};
use super::{
    ApplicationId, Error, ErrorCode, NewApplication, Notification, ScholarshipId, WalletAddress,
    WalletCache,
};

const ALREADY_APPLIED_TITLE: &str = "Already applied";
const ALREADY_APPLIED_DESCRIPTION: &str = "You have already applied for this scholarship";

/// How `apply` treats unexpected repository failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplyPolicy {
    /// Surface the failure and leave the cache untouched.
    #[default]
    Strict,
    /// Record the application locally and report it as processed.
    Optimistic,
}

fn wallet_not_connected() -> Error {
    Notification::destructive("Wallet not connected", "Please connect your wallet first")
        .into_error(ErrorCode::Unauthorized)
}

/// Catalog service backed by the shared board.
pub struct CatalogService<S, A> {
    board: Arc<ScholarshipBoard<S, A>>,
    application_repo: Arc<A>,
    clock: Arc<dyn Clock>,
    government: WalletAddress,
    policy: ApplyPolicy,
    applied: WalletCache<HashSet<ScholarshipId>>,
}

impl<S, A> CatalogService<S, A> {
    /// Create the service.
    pub fn new(
        board: Arc<ScholarshipBoard<S, A>>,
        application_repo: Arc<A>,
        clock: Arc<dyn Clock>,
        government: WalletAddress,
    ) -> Self {
        Self {
            board,
            application_repo,
            clock,
            government,
            policy: ApplyPolicy::default(),
            applied: WalletCache::default(),
        }
    }

    /// Override the failure policy for `apply`.
    #[must_use]
    pub fn with_policy(mut self, policy: ApplyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound the applied-scholarship cache to `capacity` wallets.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.applied = WalletCache::new(capacity);
        self
    }

    fn applied_for(&self, address: &WalletAddress) -> HashSet<ScholarshipId> {
        self.applied.get(address).unwrap_or_default()
    }

    fn has_applied(&self, address: &WalletAddress, scholarship_id: &ScholarshipId) -> bool {
        self.applied
            .inspect(address, |ids| ids.contains(scholarship_id))
            .unwrap_or(false)
    }

    fn mark_applied(&self, address: &WalletAddress, scholarship_id: ScholarshipId) {
        self.applied.update(address, |ids| {
            ids.insert(scholarship_id);
        });
    }

    fn replace_applied(&self, address: &WalletAddress, ids: HashSet<ScholarshipId>) {
        self.applied.insert(address, ids);
    }
}

impl<S, A> CatalogService<S, A>
where
    S: ScholarshipRepository,
    A: ApplicationRepository,
{
    async fn reload_applied(&self, address: &WalletAddress) {
        match self.application_repo.list_for_applicant(address).await {
            Ok(applications) => {
                let ids = applications.iter().map(|app| app.scholarship_id).collect();
                self.replace_applied(address, ids);
            }
            Err(err) => {
                warn!(applicant = %address, error = %err, "failed to load applied scholarships");
            }
        }
    }

    async fn refresh_board(&self) {
        if let Err(err) = self.board.fetch_scholarships().await {
            warn!(error = %err, "application stored but the board could not be refreshed");
        }
    }

    fn unexpected_failure(
        &self,
        address: &WalletAddress,
        scholarship_id: ScholarshipId,
        err: ApplicationRepositoryError,
    ) -> Result<Notification, Error> {
        if let ApplicationRepositoryError::NotFound { .. } = err {
            return Err(Notification::destructive("Scholarship not found", err.to_string())
                .into_error(ErrorCode::NotFound));
        }
        match self.policy {
            ApplyPolicy::Strict => {
                warn!(
                    applicant = %address,
                    scholarship_id = %scholarship_id,
                    error = %err,
                    "application failed"
                );
                Err(Notification::destructive(
                    "Error applying for scholarship",
                    "The application could not be recorded; please try again",
                )
                .into_error(ErrorCode::ServiceUnavailable))
            }
            ApplyPolicy::Optimistic => {
                warn!(
                    applicant = %address,
                    scholarship_id = %scholarship_id,
                    error = %err,
                    "application failed; recording it locally"
                );
                self.mark_applied(address, scholarship_id);
                Ok(Notification::success(
                    "Application processed",
                    "Your application has been recorded",
                ))
            }
        }
    }
}

#[async_trait]
impl<S, A> ScholarshipCatalog for CatalogService<S, A>
where
    S: ScholarshipRepository,
    A: ApplicationRepository,
{
    async fn browse(&self, request: BrowseRequest) -> Result<CatalogView, Error> {
        let BrowseRequest {
            address,
            search,
            tab,
        } = request;
        if let Some(address) = address.as_ref() {
            self.reload_applied(address).await;
        }
        let applied = address
            .as_ref()
            .map(|a| self.applied_for(a))
            .unwrap_or_default();
        let search = search.unwrap_or_default();

        let entries = self
            .board
            .scholarships()
            .await
            .into_iter()
            .filter(|s| tab.includes(s.status) && s.matches_search(&search))
            .map(|s| CatalogEntry {
                badge: ActionBadge::for_status(s.status, applied.contains(&s.id)),
                scholarship: s,
            })
            .collect();

        Ok(CatalogView {
            entries,
            can_create: address.as_ref() == Some(&self.government),
            loading: self.board.loading(),
        })
    }

    async fn apply(&self, request: ApplyRequest) -> Result<Notification, Error> {
        let ApplyRequest {
            address,
            scholarship_id,
        } = request;
        let address = address.ok_or_else(wallet_not_connected)?;
        if self.has_applied(&address, &scholarship_id) {
            return Err(
                Notification::destructive(ALREADY_APPLIED_TITLE, ALREADY_APPLIED_DESCRIPTION)
                    .into_error(ErrorCode::Conflict),
            );
        }

        let submission = NewApplication {
            id: ApplicationId::random(),
            scholarship_id,
            applicant_address: address.clone(),
            created_at: self.clock.utc(),
        };
        match self.application_repo.submit(&submission).await {
            Ok(ApplyOutcome::Created(application)) => {
                info!(
                    applicant = %address,
                    scholarship_id = %scholarship_id,
                    application_id = %application.id,
                    "application submitted"
                );
                self.mark_applied(&address, scholarship_id);
                self.refresh_board().await;
                Ok(Notification::success(
                    "Application submitted",
                    "You have successfully applied for this scholarship",
                ))
            }
            Ok(ApplyOutcome::AlreadyApplied) => {
                self.mark_applied(&address, scholarship_id);
                Ok(Notification::success(
                    ALREADY_APPLIED_TITLE,
                    ALREADY_APPLIED_DESCRIPTION,
                ))
            }
            Ok(ApplyOutcome::Refused { reason }) => Err(Notification::destructive(
                "Application refused",
                reason,
            )
            .into_error(ErrorCode::InvalidRequest)),
            Err(err) => self.unexpected_failure(&address, scholarship_id, err),
        }
    }

    async fn create(
        &self,
        request: CreateScholarshipRequest,
    ) -> Result<CreateScholarshipResponse, Error> {
        let address = request.address.ok_or_else(wallet_not_connected)?;
        if address != self.government {
            return Err(Notification::destructive(
                "Not permitted",
                "Only the government account can create scholarships",
            )
            .into_error(ErrorCode::Forbidden));
        }
        let scholarship = self
            .board
            .create_scholarship(request.draft)
            .await
            .map_err(|err| {
                let code = err.code();
                Notification::destructive("Error creating scholarship", err.message())
                    .into_error(code)
            })?;
        let notification = Notification::success(
            "Scholarship created",
            format!("{} is open for applications", scholarship.title),
        );
        Ok(CreateScholarshipResponse {
            scholarship,
            notification,
        })
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
