//! Driving port for browsing, applying to and creating scholarships.

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Error, Notification, Scholarship, ScholarshipDraft, ScholarshipId, ScholarshipStatus,
    WalletAddress,
};

/// Catalog tab selecting which scholarships are listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogTab {
    /// Pending scholarships only.
    #[default]
    Active,
    /// Every scholarship.
    All,
    /// Completed scholarships only.
    Completed,
}

impl CatalogTab {
    /// Whether a scholarship with `status` belongs on this tab.
    #[must_use]
    pub fn includes(&self, status: ScholarshipStatus) -> bool {
        match self {
            Self::Active => status == ScholarshipStatus::Pending,
            Self::All => true,
            Self::Completed => status == ScholarshipStatus::Completed,
        }
    }
}

impl FromStr for CatalogTab {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "all" => Ok(Self::All),
            "completed" => Ok(Self::Completed),
            other => Err(Error::invalid_request(format!(
                "tab must be active, all or completed, got {other}"
            ))),
        }
    }
}

/// Action shown next to a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionBadge {
    /// The connected wallet may apply.
    Apply,
    /// The connected wallet already applied.
    ApplicationSubmitted,
    /// Approved and waiting for the financier.
    AwaitingFunding,
    /// Paid on-chain.
    Funded,
    /// Closed without an award.
    Rejected,
}

impl ActionBadge {
    /// Derive the badge from a scholarship status and applied flag.
    #[must_use]
    pub fn for_status(status: ScholarshipStatus, applied: bool) -> Self {
        match status {
            ScholarshipStatus::Pending if applied => Self::ApplicationSubmitted,
            ScholarshipStatus::Pending => Self::Apply,
            ScholarshipStatus::Approved => Self::AwaitingFunding,
            ScholarshipStatus::Completed => Self::Funded,
            ScholarshipStatus::Rejected => Self::Rejected,
        }
    }
}

/// Catalog filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseRequest {
    /// Connected wallet, if any.
    pub address: Option<WalletAddress>,
    /// Free-text search over title and description.
    pub search: Option<String>,
    /// Tab selection.
    pub tab: CatalogTab,
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Scholarship shown.
    pub scholarship: Scholarship,
    /// Action available to the connected wallet.
    pub badge: ActionBadge,
}

/// Catalog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogView {
    /// Matching scholarships.
    pub entries: Vec<CatalogEntry>,
    /// Whether the connected wallet may create scholarships.
    pub can_create: bool,
    /// Whether the shared board is mid-update.
    pub loading: bool,
}

/// Apply request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest {
    /// Connected wallet, if any.
    pub address: Option<WalletAddress>,
    /// Scholarship applied for.
    pub scholarship_id: ScholarshipId,
}

/// Create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateScholarshipRequest {
    /// Connected wallet, if any.
    pub address: Option<WalletAddress>,
    /// Scholarship details.
    pub draft: ScholarshipDraft,
}

/// Create response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateScholarshipResponse {
    /// Stored scholarship.
    pub scholarship: Scholarship,
    /// Confirmation shown to the officer.
    pub notification: Notification,
}

/// Port exposing the scholarship catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScholarshipCatalog: Send + Sync {
    /// List scholarships for the selected tab and search text.
    async fn browse(&self, request: BrowseRequest) -> Result<CatalogView, Error>;

    /// Apply for a scholarship with the connected wallet.
    async fn apply(&self, request: ApplyRequest) -> Result<Notification, Error>;

    /// Create a scholarship as the government officer.
    async fn create(
        &self,
        request: CreateScholarshipRequest,
    ) -> Result<CreateScholarshipResponse, Error>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ScholarshipStatus::Pending, true, ActionBadge::ApplicationSubmitted)]
    #[case(ScholarshipStatus::Pending, false, ActionBadge::Apply)]
    #[case(ScholarshipStatus::Approved, true, ActionBadge::AwaitingFunding)]
    #[case(ScholarshipStatus::Completed, false, ActionBadge::Funded)]
    #[case(ScholarshipStatus::Rejected, true, ActionBadge::Rejected)]
    fn badge_follows_status(
        #[case] status: ScholarshipStatus,
        #[case] applied: bool,
        #[case] expected: ActionBadge,
    ) {
        assert_eq!(ActionBadge::for_status(status, applied), expected);
    }

    #[rstest]
    #[case(CatalogTab::Active, ScholarshipStatus::Pending, true)]
    #[case(CatalogTab::Active, ScholarshipStatus::Approved, false)]
    #[case(CatalogTab::All, ScholarshipStatus::Rejected, true)]
    #[case(CatalogTab::Completed, ScholarshipStatus::Completed, true)]
    #[case(CatalogTab::Completed, ScholarshipStatus::Pending, false)]
    fn tabs_filter_by_status(
        #[case] tab: CatalogTab,
        #[case] status: ScholarshipStatus,
        #[case] expected: bool,
    ) {
        assert_eq!(tab.includes(status), expected);
    }

    #[rstest]
    fn unknown_tab_is_invalid_request() {
        let err = "archived".parse::<CatalogTab>().expect_err("unknown tab");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }
}
