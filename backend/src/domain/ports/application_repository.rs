//! Port for scholarship application persistence.

use async_trait::async_trait;

use crate::domain::{
    Application, ApplicationId, ApplicationStatus, NewApplication, ScholarshipId,
    ScholarshipStatus, WalletAddress,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by application repository adapters.
    pub enum ApplicationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "application repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "application repository query failed: {message}",
        /// The application targeted by a mutation does not exist.
        NotFound { id: String } =>
            "application {id} not found",
    }
}

/// Filter for application lookups scoped to one scholarship.
///
/// Results are ordered by creation time ascending, then by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationQuery {
    /// Scholarship whose applications are returned.
    pub scholarship_id: ScholarshipId,
    /// Optional status filter.
    pub status: Option<ApplicationStatus>,
    /// Optional cap on the number of rows.
    pub limit: Option<usize>,
}

impl ApplicationQuery {
    /// Every application for `scholarship_id`.
    #[must_use]
    pub fn for_scholarship(scholarship_id: ScholarshipId) -> Self {
        Self {
            scholarship_id,
            status: None,
            limit: None,
        }
    }

    /// Restrict to a status.
    #[must_use]
    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Cap the number of results.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `application` satisfies the scholarship and status filters.
    #[must_use]
    pub fn matches(&self, application: &Application) -> bool {
        application.scholarship_id == self.scholarship_id
            && self
                .status
                .is_none_or(|status| application.status == status)
    }
}

/// Refusal reason reported for scholarships past the pending stage.
pub const CLOSED_SCHOLARSHIP_REASON: &str = "scholarship is no longer accepting applications";

/// Result of submitting an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new pending application was stored.
    Created(Application),
    /// The applicant already holds an application for this scholarship.
    AlreadyApplied,
    /// The scholarship no longer accepts applications.
    Refused {
        /// Reason reported to the applicant.
        reason: String,
    },
}

/// Result of approving an applicant for a scholarship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApproveOutcome {
    /// The application was approved and the scholarship now names the
    /// applicant as recipient.
    Approved(Application),
    /// The scholarship had already left the pending stage.
    NotPending {
        /// Status observed under the lock.
        status: ScholarshipStatus,
    },
    /// The applicant holds no pending application for the scholarship.
    NoPendingApplication,
}

/// Port for reading and writing applications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// List every application.
    async fn list_all(&self) -> Result<Vec<Application>, ApplicationRepositoryError>;

    /// List the applications submitted by `address`.
    async fn list_for_applicant(
        &self,
        address: &WalletAddress,
    ) -> Result<Vec<Application>, ApplicationRepositoryError>;

    /// List applications for one scholarship in creation order.
    async fn find(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Vec<Application>, ApplicationRepositoryError>;

    /// Find an application by id.
    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, ApplicationRepositoryError>;

    /// Submit an application, appending the applicant to the scholarship.
    ///
    /// Adapters enforce one application per scholarship and applicant and
    /// refuse scholarships that are no longer pending.
    async fn submit(
        &self,
        application: &NewApplication,
    ) -> Result<ApplyOutcome, ApplicationRepositoryError>;

    /// Approve `applicant` for a pending scholarship.
    ///
    /// Adapters hold the scholarship exclusively while they check that it is
    /// pending, approve the applicant's pending application and set the
    /// scholarship approved with the applicant as recipient, so at most one
    /// concurrent approval succeeds. A missing scholarship is `NotFound`.
    async fn approve(
        &self,
        scholarship_id: &ScholarshipId,
        applicant: &WalletAddress,
    ) -> Result<ApproveOutcome, ApplicationRepositoryError>;

    /// Update an application's review status.
    async fn set_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), ApplicationRepositoryError>;
}
