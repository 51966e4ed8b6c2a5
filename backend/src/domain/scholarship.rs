//! Scholarship records and their lifecycle status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EduAmount, WalletAddress};

/// Label shown when a scholarship has no recipient yet.
pub const UNASSIGNED_RECIPIENT: &str = "Not assigned";

/// Stable scholarship identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScholarshipId(Uuid);

impl ScholarshipId {
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

impl fmt::Display for ScholarshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ScholarshipId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle status of a scholarship.
///
/// `Pending` → `Approved` (one applicant chosen) → `Completed` (paid
/// on-chain). `Rejected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScholarshipStatus {
    /// Open for applications and awaiting government review.
    Pending,
    /// An applicant was approved; awaiting payment.
    Approved,
    /// Payment confirmed on-chain.
    Completed,
    /// Closed without an award.
    Rejected,
}

impl ScholarshipStatus {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ScholarshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scholarship status: {0}")]
pub struct UnknownScholarshipStatus(pub String);

impl FromStr for ScholarshipStatus {
    type Err = UnknownScholarshipStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownScholarshipStatus(other.to_owned())),
        }
    }
}

/// Validation errors for [`ScholarshipDraft`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScholarshipValidationError {
    /// Title was blank.
    #[error("scholarship title must not be empty")]
    EmptyTitle,
    /// Amount was zero.
    #[error("scholarship amount must be greater than zero")]
    ZeroAmount,
}

/// Input for creating a scholarship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScholarshipDraft {
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Award amount.
    pub amount: EduAmount,
}

impl ScholarshipDraft {
    /// Validate the draft and build a pending scholarship.
    pub fn into_scholarship(
        self,
        id: ScholarshipId,
        created_at: DateTime<Utc>,
    ) -> Result<Scholarship, ScholarshipValidationError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(ScholarshipValidationError::EmptyTitle);
        }
        if self.amount.is_zero() {
            return Err(ScholarshipValidationError::ZeroAmount);
        }
        Ok(Scholarship {
            id,
            title,
            description: self.description.trim().to_owned(),
            amount: self.amount,
            status: ScholarshipStatus::Pending,
            recipient: None,
            created_at,
            applicants: Vec::new(),
        })
    }
}

/// A fundable award record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scholarship {
    /// Identifier.
    pub id: ScholarshipId,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Award amount.
    pub amount: EduAmount,
    /// Lifecycle status.
    pub status: ScholarshipStatus,
    /// Approved applicant, once chosen.
    pub recipient: Option<WalletAddress>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Addresses that applied, in application order.
    pub applicants: Vec<WalletAddress>,
}

impl Scholarship {
    /// Whether at least one applicant has applied.
    #[must_use]
    pub fn has_applicants(&self) -> bool {
        !self.applicants.is_empty()
    }

    /// Case-insensitive match against title or description.
    ///
    /// An empty or blank term matches everything.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }

    /// Abbreviated recipient, or [`UNASSIGNED_RECIPIENT`].
    #[must_use]
    pub fn recipient_label(&self) -> String {
        self.recipient
            .as_ref()
            .map_or_else(|| UNASSIGNED_RECIPIENT.to_owned(), WalletAddress::abbreviated)
    }
}
