//! Driving port for the government review dashboard.

use async_trait::async_trait;

use crate::domain::{Application, Error, Notification, Scholarship, ScholarshipId, WalletAddress};

/// Government dashboard projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GovernmentOverview {
    /// Pending scholarships with at least one applicant.
    pub pending: Vec<Scholarship>,
    /// Total scholarships on the board.
    pub total: usize,
    /// Approved plus completed scholarships.
    pub approved: usize,
    /// Scholarship whose applicants are expanded.
    pub selected: Option<ScholarshipId>,
    /// Pending applications for the selected scholarship.
    pub applicants: Vec<Application>,
    /// Whether the shared board is mid-update.
    pub loading: bool,
}

/// Approve request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveApplicantRequest {
    /// Scholarship under review.
    pub scholarship_id: ScholarshipId,
    /// Applicant to award.
    pub applicant_address: WalletAddress,
}

/// Port exposing the government review dashboard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GovernmentReview: Send + Sync {
    /// Project the dashboard.
    async fn overview(&self) -> Result<GovernmentOverview, Error>;

    /// Expand or collapse the applicant list for a scholarship.
    async fn toggle_applicants(
        &self,
        scholarship_id: ScholarshipId,
    ) -> Result<GovernmentOverview, Error>;

    /// Approve one applicant for a pending scholarship.
    async fn approve(&self, request: ApproveApplicantRequest) -> Result<Notification, Error>;
}
