//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`WalletProvider`]) are implemented by
//! outbound adapters. Driving ports ([`ScholarshipCatalog`],
//! [`StudentDashboard`], [`GovernmentReview`], [`FinancierFunding`]) are
//! implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod application_repository;
mod financier_funding;
mod government_review;
mod scholarship_catalog;
mod scholarship_repository;
mod student_dashboard;
mod wallet_provider;

#[cfg(test)]
pub use application_repository::MockApplicationRepository;
pub use application_repository::{
    ApplicationQuery, ApplicationRepository, ApplicationRepositoryError, ApplyOutcome,
    ApproveOutcome, CLOSED_SCHOLARSHIP_REASON,
};
#[cfg(test)]
pub use financier_funding::MockFinancierFunding;
pub use financier_funding::{FinancierFunding, FinancierOverview, FundingReceipt};
#[cfg(test)]
pub use government_review::MockGovernmentReview;
pub use government_review::{ApproveApplicantRequest, GovernmentOverview, GovernmentReview};
#[cfg(test)]
pub use scholarship_catalog::MockScholarshipCatalog;
pub use scholarship_catalog::{
    ActionBadge, ApplyRequest, BrowseRequest, CatalogEntry, CatalogTab, CatalogView,
    CreateScholarshipRequest, CreateScholarshipResponse, ScholarshipCatalog,
};
#[cfg(test)]
pub use scholarship_repository::MockScholarshipRepository;
pub use scholarship_repository::{ScholarshipRepository, ScholarshipRepositoryError};
#[cfg(test)]
pub use student_dashboard::MockStudentDashboard;
pub use student_dashboard::{
    ReceivedBadge, ReceivedScholarship, StudentDashboard, StudentOverview,
};
#[cfg(test)]
pub use wallet_provider::MockWalletProvider;
pub use wallet_provider::{WalletError, WalletProvider};
