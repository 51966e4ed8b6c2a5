//! Student applications for scholarships.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ScholarshipId, WalletAddress};

/// Stable application identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(Uuid);

impl ApplicationId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Borrow the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Review status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Awaiting government review.
    Pending,
    /// Chosen as the scholarship's recipient.
    Approved,
}

impl ApplicationStatus {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an application status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status: {0}")]
pub struct UnknownApplicationStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownApplicationStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            other => Err(UnknownApplicationStatus(other.to_owned())),
        }
    }
}

/// A student's request to be considered for a scholarship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Identifier.
    pub id: ApplicationId,
    /// Scholarship applied for.
    pub scholarship_id: ScholarshipId,
    /// Wallet that will receive the payment if approved.
    pub applicant_address: WalletAddress,
    /// Review status.
    pub status: ApplicationStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl Application {
    /// Whether the application has been approved.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == ApplicationStatus::Approved
    }
}

/// Input for submitting an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    /// Identifier to use if the application is created.
    pub id: ApplicationId,
    /// Scholarship applied for.
    pub scholarship_id: ScholarshipId,
    /// Applicant wallet.
    pub applicant_address: WalletAddress,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewApplication {
    /// Materialise the pending application this input describes.
    #[must_use]
    pub fn into_application(self) -> Application {
        Application {
            id: self.id,
            scholarship_id: self.scholarship_id,
            applicant_address: self.applicant_address,
            status: ApplicationStatus::Pending,
            created_at: self.created_at,
        }
    }
}

/// Orders applications by creation time and then id so "first" is stable.
pub fn sort_by_creation(applications: &mut [Application]) {
    applications.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}
