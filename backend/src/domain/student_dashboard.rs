//! Student dashboard service.
//!
//! Projects the connected student's applied and received scholarships from
//! the shared board plus the student's applications. When the application
//! lookup fails the last successful lookup for that address is reused and the
//! view is flagged stale. Last lookups are kept for a bounded number of
//! wallets.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::board::ScholarshipBoard;
use super::ports::{
    ApplicationRepository, ReceivedBadge, ReceivedScholarship, ScholarshipRepository,
    StudentDashboard, StudentOverview,
};
use super::{
    Application, Error, Scholarship, ScholarshipId, ScholarshipStatus, WalletAddress, WalletCache,
};

/// Student dashboard backed by the shared board.
pub struct StudentDashboardService<S, A> {
    board: Arc<ScholarshipBoard<S, A>>,
    application_repo: Arc<A>,
    last_seen: WalletCache<Vec<Application>>,
}

impl<S, A> StudentDashboardService<S, A> {
    /// Create the service.
    pub fn new(board: Arc<ScholarshipBoard<S, A>>, application_repo: Arc<A>) -> Self {
        Self {
            board,
            application_repo,
            last_seen: WalletCache::default(),
        }
    }

    /// Bound the last-lookup cache to `capacity` wallets.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.last_seen = WalletCache::new(capacity);
        self
    }

    fn remember(&self, address: &WalletAddress, applications: Vec<Application>) {
        self.last_seen.insert(address, applications);
    }

    fn recall(&self, address: &WalletAddress) -> Vec<Application> {
        self.last_seen.get(address).unwrap_or_default()
    }
}

fn project(scholarships: &[Scholarship], applications: &[Application]) -> StudentOverview {
    let applied_ids: HashSet<ScholarshipId> =
        applications.iter().map(|app| app.scholarship_id).collect();
    let received_ids: HashSet<ScholarshipId> = applications
        .iter()
        .filter(|app| app.is_approved())
        .map(|app| app.scholarship_id)
        .collect();

    StudentOverview {
        applied: scholarships
            .iter()
            .filter(|s| applied_ids.contains(&s.id))
            .cloned()
            .collect(),
        received: scholarships
            .iter()
            .filter(|s| received_ids.contains(&s.id))
            .map(|s| ReceivedScholarship {
                badge: ReceivedBadge::for_status(s.status),
                scholarship: s.clone(),
            })
            .collect(),
        total_available: scholarships
            .iter()
            .filter(|s| s.status == ScholarshipStatus::Pending)
            .count(),
        loading: false,
        stale: false,
    }
}

impl<S, A> StudentDashboardService<S, A>
where
    S: ScholarshipRepository,
    A: ApplicationRepository,
{
    async fn load(&self, address: &WalletAddress) -> StudentOverview {
        let (applications, stale) = match self.application_repo.list_for_applicant(address).await
        {
            Ok(applications) => {
                self.remember(address, applications.clone());
                (applications, false)
            }
            Err(err) => {
                warn!(
                    applicant = %address,
                    error = %err,
                    "failed to fetch applications; showing last known view"
                );
                (self.recall(address), true)
            }
        };

        let scholarships = self.board.scholarships().await;
        let mut overview = project(&scholarships, &applications);
        overview.stale = stale;
        overview.loading = self.board.loading();
        overview
    }
}

#[async_trait]
impl<S, A> StudentDashboard for StudentDashboardService<S, A>
where
    S: ScholarshipRepository,
    A: ApplicationRepository,
{
    async fn overview(&self, address: &WalletAddress) -> Result<StudentOverview, Error> {
        Ok(self.load(address).await)
    }

    async fn refresh(&self, address: &WalletAddress) -> Result<StudentOverview, Error> {
        if let Err(err) = self.board.fetch_scholarships().await {
            warn!(applicant = %address, error = %err, "scholarship refresh failed");
        }
        Ok(self.load(address).await)
    }
}

#[cfg(test)]
#[path = "student_dashboard_tests.rs"]
mod tests;
