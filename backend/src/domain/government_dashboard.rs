//! Government review dashboard service.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::warn;

use super::application::sort_by_creation;
use super::board::{ScholarshipBoard, map_application_error};
use super::ports::{
    ApplicationRepository, ApproveApplicantRequest, GovernmentOverview, GovernmentReview,
    ScholarshipRepository,
};
use super::{
    Application, ApplicationStatus, Error, Notification, ScholarshipId, ScholarshipStatus,
};

#[derive(Debug, Default)]
struct Selection {
    scholarship_id: Option<ScholarshipId>,
    applicants: Vec<Application>,
}

/// Government dashboard backed by the shared board.
pub struct GovernmentDashboardService<S, A> {
    board: Arc<ScholarshipBoard<S, A>>,
    application_repo: Arc<A>,
    selection: Mutex<Selection>,
}

impl<S, A> GovernmentDashboardService<S, A> {
    /// Create the service.
    pub fn new(board: Arc<ScholarshipBoard<S, A>>, application_repo: Arc<A>) -> Self {
        Self {
            board,
            application_repo,
            selection: Mutex::new(Selection::default()),
        }
    }

    fn with_selection<T>(&self, f: impl FnOnce(&mut Selection) -> T) -> T {
        let mut guard = self.selection.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<S, A> GovernmentDashboardService<S, A>
where
    S: ScholarshipRepository,
    A: ApplicationRepository,
{
    async fn project(&self) -> GovernmentOverview {
        let scholarships = self.board.scholarships().await;
        let (selected, applicants) =
            self.with_selection(|sel| (sel.scholarship_id, sel.applicants.clone()));
        GovernmentOverview {
            total: scholarships.len(),
            approved: scholarships
                .iter()
                .filter(|s| {
                    matches!(
                        s.status,
                        ScholarshipStatus::Approved | ScholarshipStatus::Completed
                    )
                })
                .count(),
            pending: scholarships
                .into_iter()
                .filter(|s| s.status == ScholarshipStatus::Pending && s.has_applicants())
                .collect(),
            selected,
            applicants,
            loading: self.board.loading(),
        }
    }
}

#[async_trait]
impl<S, A> GovernmentReview for GovernmentDashboardService<S, A>
where
    S: ScholarshipRepository,
    A: ApplicationRepository,
{
    async fn overview(&self) -> Result<GovernmentOverview, Error> {
        Ok(self.project().await)
    }

    async fn toggle_applicants(
        &self,
        scholarship_id: ScholarshipId,
    ) -> Result<GovernmentOverview, Error> {
        let collapsing = self.with_selection(|sel| {
            if sel.scholarship_id == Some(scholarship_id) {
                *sel = Selection::default();
                true
            } else {
                false
            }
        });
        if collapsing {
            return Ok(self.project().await);
        }

        match self.application_repo.list_all().await {
            Ok(all) => {
                let mut applicants: Vec<Application> = all
                    .into_iter()
                    .filter(|app| {
                        app.scholarship_id == scholarship_id
                            && app.status == ApplicationStatus::Pending
                    })
                    .collect();
                sort_by_creation(&mut applicants);
                self.with_selection(|sel| {
                    sel.scholarship_id = Some(scholarship_id);
                    sel.applicants = applicants;
                });
                Ok(self.project().await)
            }
            Err(err) => {
                warn!(
                    scholarship_id = %scholarship_id,
                    error = %err,
                    "failed to fetch applicants"
                );
                self.with_selection(|sel| sel.applicants.clear());
                let cause = map_application_error(err);
                Err(Notification::destructive("Error loading applicants", cause.message())
                    .into_error(cause.code()))
            }
        }
    }

    async fn approve(&self, request: ApproveApplicantRequest) -> Result<Notification, Error> {
        let ApproveApplicantRequest {
            scholarship_id,
            applicant_address,
        } = request;
        self.board
            .approve_scholarship(scholarship_id, &applicant_address)
            .await
            .map_err(|err| {
                let code = err.code();
                Notification::destructive("Error approving applicant", err.message())
                    .into_error(code)
            })?;
        Ok(Notification::success(
            "Scholarship approved",
            format!("{} was approved as the recipient", applicant_address.abbreviated()),
        ))
    }
}

#[cfg(test)]
#[path = "government_dashboard_tests.rs"]
mod tests;
