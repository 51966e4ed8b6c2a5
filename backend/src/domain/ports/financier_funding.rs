//! Driving port for the financier funding dashboard.

use async_trait::async_trait;

use crate::domain::{EduAmount, Error, Notification, Scholarship, ScholarshipId, TxHash};

/// Financier dashboard projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinancierOverview {
    /// Approved scholarships awaiting payment.
    pub awaiting: Vec<Scholarship>,
    /// Completed scholarships.
    pub history: Vec<Scholarship>,
    /// Number of completed scholarships.
    pub funded_count: usize,
    /// Sum of completed amounts.
    pub total_funded: EduAmount,
    /// Scholarship currently being paid, if any.
    pub funding_in_progress: Option<ScholarshipId>,
    /// Whether the shared board is mid-update.
    pub loading: bool,
}

/// Successful funding outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingReceipt {
    /// Scholarship now completed.
    pub scholarship_id: ScholarshipId,
    /// Confirmed payment transaction.
    pub tx_hash: TxHash,
    /// Confirmation shown to the financier.
    pub notification: Notification,
}

/// Port exposing the financier dashboard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FinancierFunding: Send + Sync {
    /// Project the dashboard.
    async fn overview(&self) -> Result<FinancierOverview, Error>;

    /// Pay an approved scholarship on-chain and mark it completed.
    async fn fund(&self, scholarship_id: ScholarshipId) -> Result<FundingReceipt, Error>;
}
