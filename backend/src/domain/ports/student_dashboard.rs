//! Driving port for the student dashboard.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Scholarship, ScholarshipStatus, WalletAddress};

/// Badge on a received scholarship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceivedBadge {
    /// Paid on-chain.
    Funded,
    /// Approved and awaiting payment.
    Approved,
}

impl ReceivedBadge {
    /// Badge for a scholarship the student was approved for.
    #[must_use]
    pub fn for_status(status: ScholarshipStatus) -> Self {
        if status == ScholarshipStatus::Completed {
            Self::Funded
        } else {
            Self::Approved
        }
    }
}

/// Scholarship the student was approved for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedScholarship {
    /// Scholarship record.
    pub scholarship: Scholarship,
    /// Funding badge.
    pub badge: ReceivedBadge,
}

/// Student dashboard projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentOverview {
    /// Scholarships the student applied for.
    pub applied: Vec<Scholarship>,
    /// Scholarships with an approved application.
    pub received: Vec<ReceivedScholarship>,
    /// Number of pending scholarships open to applications.
    pub total_available: usize,
    /// Whether the shared board is mid-update.
    pub loading: bool,
    /// Whether the applications shown come from an earlier load.
    pub stale: bool,
}

/// Port exposing the student dashboard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentDashboard: Send + Sync {
    /// Project the dashboard for `address`.
    async fn overview(&self, address: &WalletAddress) -> Result<StudentOverview, Error>;

    /// Reload scholarships and then applications, keeping prior state on
    /// failure.
    async fn refresh(&self, address: &WalletAddress) -> Result<StudentOverview, Error>;
}
