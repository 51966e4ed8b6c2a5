//! Shared scholarship board.
//!
//! Every dashboard reads scholarships through one [`ScholarshipBoard`]. The
//! board holds the last list fetched from the repository (newest first) and
//! a process-wide loading flag that is raised while any fetch or mutation is
//! in flight. The snapshot only changes by re-fetching; mutations write to
//! the repositories and then reload.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mockable::Clock;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::ports::{
    ApplicationRepository, ApplicationRepositoryError, ApproveOutcome, ScholarshipRepository,
    ScholarshipRepositoryError,
};
use super::{
    ApplicationId, ApplicationStatus, Error, Scholarship, ScholarshipDraft, ScholarshipId,
    ScholarshipStatus, WalletAddress,
};

pub(crate) fn map_scholarship_error(error: ScholarshipRepositoryError) -> Error {
    match error {
        ScholarshipRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("scholarship repository unavailable: {message}"))
        }
        ScholarshipRepositoryError::Query { message } => {
            Error::internal(format!("scholarship repository error: {message}"))
        }
        ScholarshipRepositoryError::NotFound { id } => {
            Error::not_found(format!("scholarship {id} not found"))
        }
    }
}

pub(crate) fn map_application_error(error: ApplicationRepositoryError) -> Error {
    match error {
        ApplicationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("application repository unavailable: {message}"))
        }
        ApplicationRepositoryError::Query { message } => {
            Error::internal(format!("application repository error: {message}"))
        }
        ApplicationRepositoryError::NotFound { id } => {
            Error::not_found(format!("application {id} not found"))
        }
    }
}

/// Count of board scholarships per status.
///
/// The four counts always sum to the number of scholarships on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusBreakdown {
    /// Pending scholarships.
    pub pending: usize,
    /// Approved scholarships.
    pub approved: usize,
    /// Completed scholarships.
    pub completed: usize,
    /// Rejected scholarships.
    pub rejected: usize,
}

impl StatusBreakdown {
    /// Tally `scholarships` by status.
    #[must_use]
    pub fn from_scholarships(scholarships: &[Scholarship]) -> Self {
        scholarships
            .iter()
            .fold(Self::default(), |mut acc, scholarship| {
                match scholarship.status {
                    ScholarshipStatus::Pending => acc.pending += 1,
                    ScholarshipStatus::Approved => acc.approved += 1,
                    ScholarshipStatus::Completed => acc.completed += 1,
                    ScholarshipStatus::Rejected => acc.rejected += 1,
                }
                acc
            })
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.pending + self.approved + self.completed + self.rejected
    }
}

#[derive(Debug, Default)]
struct BoardSnapshot {
    scholarships: Vec<Scholarship>,
    loaded: bool,
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn raise(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Shared scholarship list plus the approve, fund and create mutations.
pub struct ScholarshipBoard<S, A> {
    scholarship_repo: Arc<S>,
    application_repo: Arc<A>,
    clock: Arc<dyn Clock>,
    snapshot: RwLock<BoardSnapshot>,
    in_flight: AtomicUsize,
}

impl<S, A> ScholarshipBoard<S, A> {
    /// Create an empty board. The first read triggers a fetch.
    pub fn new(scholarship_repo: Arc<S>, application_repo: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scholarship_repo,
            application_repo,
            clock,
            snapshot: RwLock::new(BoardSnapshot::default()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Whether a fetch or mutation is in flight.
    pub fn loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

impl<S, A> ScholarshipBoard<S, A>
where
    S: ScholarshipRepository,
    A: ApplicationRepository,
{
    /// Reload the list from the repository, newest first.
    ///
    /// On failure the previous snapshot is kept and the error returned.
    pub async fn fetch_scholarships(&self) -> Result<(), Error> {
        let _loading = LoadingGuard::raise(&self.in_flight);
        let mut scholarships = match self.scholarship_repo.list().await {
            Ok(scholarships) => scholarships,
            Err(err) => {
                warn!(error = %err, "failed to fetch scholarships; keeping previous list");
                return Err(map_scholarship_error(err));
            }
        };
        scholarships.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let mut snapshot = self.snapshot.write().await;
        snapshot.scholarships = scholarships;
        snapshot.loaded = true;
        Ok(())
    }

    async fn ensure_loaded(&self) {
        if self.snapshot.read().await.loaded {
            return;
        }
        if let Err(err) = self.fetch_scholarships().await {
            debug!(error = %err, "initial board load failed; serving an empty board");
        }
    }

    async fn reload_after_mutation(&self) {
        if let Err(err) = self.fetch_scholarships().await {
            warn!(error = %err, "mutation stored but the board could not be refreshed");
        }
    }

    /// Current scholarships, newest first.
    pub async fn scholarships(&self) -> Vec<Scholarship> {
        self.ensure_loaded().await;
        self.snapshot.read().await.scholarships.clone()
    }

    /// Scholarships whose status is pending.
    pub async fn pending_scholarships(&self) -> Vec<Scholarship> {
        self.scholarships()
            .await
            .into_iter()
            .filter(|scholarship| scholarship.status == ScholarshipStatus::Pending)
            .collect()
    }

    /// Look up a scholarship on the board.
    pub async fn find(&self, id: &ScholarshipId) -> Option<Scholarship> {
        self.ensure_loaded().await;
        self.snapshot
            .read()
            .await
            .scholarships
            .iter()
            .find(|scholarship| scholarship.id == *id)
            .cloned()
    }

    /// Per-status counts of the current board.
    pub async fn status_breakdown(&self) -> StatusBreakdown {
        StatusBreakdown::from_scholarships(&self.scholarships().await)
    }

    /// Approve `applicant` for a pending scholarship.
    ///
    /// The applicant must hold a pending application for it. The repository
    /// approves the application and moves the scholarship to approved with
    /// the applicant as recipient in one step, so two concurrent approvals
    /// cannot both succeed.
    pub async fn approve_scholarship(
        &self,
        scholarship_id: ScholarshipId,
        applicant: &WalletAddress,
    ) -> Result<(), Error> {
        {
            let _loading = LoadingGuard::raise(&self.in_flight);
            let outcome = self
                .application_repo
                .approve(&scholarship_id, applicant)
                .await
                .map_err(|err| match err {
                    ApplicationRepositoryError::NotFound { .. } => {
                        Error::not_found(format!("scholarship {scholarship_id} not found"))
                    }
                    other => map_application_error(other),
                })?;
            match outcome {
                ApproveOutcome::Approved(application) => info!(
                    scholarship_id = %scholarship_id,
                    application_id = %application.id,
                    applicant = %applicant,
                    "scholarship approved"
                ),
                ApproveOutcome::NotPending { status } => {
                    return Err(Error::conflict(format!(
                        "scholarship {scholarship_id} is {status} and cannot be approved"
                    )));
                }
                ApproveOutcome::NoPendingApplication => {
                    return Err(Error::not_found(format!(
                        "no pending application from {} for this scholarship",
                        applicant.abbreviated()
                    )));
                }
            }
        }
        self.reload_after_mutation().await;
        Ok(())
    }

    /// Mark an approved scholarship completed for `application_id`.
    ///
    /// The recipient becomes the application's applicant and the application
    /// is approved if it was not already.
    pub async fn fund_scholarship(
        &self,
        scholarship_id: ScholarshipId,
        application_id: ApplicationId,
    ) -> Result<(), Error> {
        {
            let _loading = LoadingGuard::raise(&self.in_flight);
            let scholarship = self.load_scholarship(&scholarship_id).await?;
            if scholarship.status != ScholarshipStatus::Approved {
                return Err(Error::conflict(format!(
                    "scholarship {scholarship_id} is {} and cannot be funded",
                    scholarship.status
                )));
            }

            let application = self
                .application_repo
                .find_by_id(&application_id)
                .await
                .map_err(map_application_error)?
                .ok_or_else(|| Error::not_found(format!("application {application_id} not found")))?;
            if application.scholarship_id != scholarship_id {
                return Err(Error::invalid_request(
                    "application does not belong to this scholarship",
                ));
            }

            if !application.is_approved() {
                self.application_repo
                    .set_status(&application.id, ApplicationStatus::Approved)
                    .await
                    .map_err(map_application_error)?;
            }
            self.scholarship_repo
                .update_status(
                    &scholarship_id,
                    ScholarshipStatus::Completed,
                    Some(application.applicant_address.clone()),
                )
                .await
                .map_err(map_scholarship_error)?;
            info!(
                scholarship_id = %scholarship_id,
                applicant = %application.applicant_address,
                "scholarship marked funded"
            );
        }
        self.reload_after_mutation().await;
        Ok(())
    }

    /// Store a new pending scholarship stamped with the injected clock.
    pub async fn create_scholarship(&self, draft: ScholarshipDraft) -> Result<Scholarship, Error> {
        let scholarship = {
            let _loading = LoadingGuard::raise(&self.in_flight);
            let scholarship = draft
                .into_scholarship(ScholarshipId::random(), self.clock.utc())
                .map_err(|err| Error::invalid_request(err.to_string()))?;
            self.scholarship_repo
                .insert(&scholarship)
                .await
                .map_err(map_scholarship_error)?;
            info!(scholarship_id = %scholarship.id, "scholarship created");
            scholarship
        };
        self.reload_after_mutation().await;
        Ok(scholarship)
    }

    async fn load_scholarship(&self, id: &ScholarshipId) -> Result<Scholarship, Error> {
        self.scholarship_repo
            .find_by_id(id)
            .await
            .map_err(map_scholarship_error)?
            .ok_or_else(|| Error::not_found(format!("scholarship {id} not found")))
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod tests;
