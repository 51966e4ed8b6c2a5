//! JSON bodies exchanged by the scholarship endpoints.
//!
//! Domain views convert into these camelCase bodies at the edge so the
//! domain stays free of OpenAPI and wire-format concerns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    ActionBadge, CatalogEntry, CatalogTab, CatalogView, CreateScholarshipResponse,
    FinancierOverview, FundingReceipt, GovernmentOverview, ReceivedBadge, ReceivedScholarship,
    StudentOverview,
};
use crate::domain::{
    Application, ApplicationStatus, Notification, NotificationTone, Scholarship,
    ScholarshipStatus, WalletChallenge,
};

/// Body for `POST /api/v1/wallet/challenge`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    #[schema(example = "0x52908400098527886e0f7030069857d2e4169ee7")]
    pub address: String,
}

/// Sign-in challenge the wallet must sign with `personal_sign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeBody {
    pub address: String,
    pub nonce: String,
    /// Exact text to sign.
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&WalletChallenge> for ChallengeBody {
    fn from(challenge: &WalletChallenge) -> Self {
        Self {
            address: challenge.address.to_string(),
            nonce: challenge.nonce.clone(),
            message: challenge.message(),
            expires_at: challenge.expires_at(),
        }
    }
}

/// Body for `POST /api/v1/wallet/connect`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectWalletRequest {
    #[schema(example = "0x52908400098527886e0f7030069857d2e4169ee7")]
    pub address: String,
    /// `personal_sign` signature over the issued challenge message.
    #[schema(example = "0x3f2a...1b")]
    pub signature: String,
}

/// Connected wallet status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatusBody {
    pub connected: bool,
    pub address: Option<String>,
    /// First six and last four characters, e.g. `0x5290...9ee7`.
    pub short_address: Option<String>,
    pub is_government: bool,
}

/// Query string for `GET /api/v1/scholarships`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BrowseQuery {
    /// Case-insensitive match on title or description.
    pub search: Option<String>,
    /// `active` (default), `all` or `completed`.
    pub tab: Option<String>,
}

impl BrowseQuery {
    pub fn tab(&self) -> Result<CatalogTab, crate::domain::Error> {
        self.tab
            .as_deref()
            .map_or(Ok(CatalogTab::default()), str::parse)
    }
}

/// Body for `POST /api/v1/scholarships`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateScholarshipBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Decimal EDU amount, up to 18 fractional digits.
    #[schema(example = "0.5")]
    pub amount: String,
}

/// Body for the approve endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveApplicantBody {
    pub applicant_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBody {
    pub title: String,
    pub description: String,
    /// `default` or `destructive`.
    pub tone: String,
}

impl From<Notification> for NotificationBody {
    fn from(value: Notification) -> Self {
        let tone = match value.tone {
            NotificationTone::Default => "default",
            NotificationTone::Destructive => "destructive",
        };
        Self {
            title: value.title,
            description: value.description,
            tone: tone.to_owned(),
        }
    }
}

/// Envelope for mutations that only report a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub notification: NotificationBody,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        Self {
            notification: value.into(),
        }
    }
}

fn scholarship_status(status: ScholarshipStatus) -> String {
    status.as_str().to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipBody {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Exact decimal EDU amount.
    pub amount: String,
    /// Amount rounded to three decimals for display.
    pub amount_display: String,
    /// `pending`, `approved`, `completed` or `rejected`.
    pub status: String,
    pub recipient: Option<String>,
    /// Recipient address or `Not assigned`.
    pub recipient_label: String,
    pub applicants: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Scholarship> for ScholarshipBody {
    fn from(value: Scholarship) -> Self {
        Self {
            id: *value.id.as_uuid(),
            amount: value.amount.to_string(),
            amount_display: value.amount.to_fixed(3),
            status: scholarship_status(value.status),
            recipient_label: value.recipient_label(),
            recipient: value.recipient.map(String::from),
            applicants: value.applicants.into_iter().map(String::from).collect(),
            title: value.title,
            description: value.description,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationBody {
    pub id: Uuid,
    pub scholarship_id: Uuid,
    pub applicant_address: String,
    pub applicant_short: String,
    /// `pending` or `approved`.
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Application> for ApplicationBody {
    fn from(value: Application) -> Self {
        let status = match value.status {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
        };
        Self {
            id: *value.id.as_uuid(),
            scholarship_id: *value.scholarship_id.as_uuid(),
            applicant_short: value.applicant_address.abbreviated(),
            applicant_address: value.applicant_address.into(),
            status: status.to_owned(),
            created_at: value.created_at,
        }
    }
}

fn bodies<T, B: From<T>>(items: Vec<T>) -> Vec<B> {
    items.into_iter().map(B::from).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryBody {
    pub scholarship: ScholarshipBody,
    /// `apply`, `application_submitted`, `awaiting_funding`, `funded` or
    /// `rejected`.
    pub badge: String,
}

impl From<CatalogEntry> for CatalogEntryBody {
    fn from(value: CatalogEntry) -> Self {
        let badge = match value.badge {
            ActionBadge::Apply => "apply",
            ActionBadge::ApplicationSubmitted => "application_submitted",
            ActionBadge::AwaitingFunding => "awaiting_funding",
            ActionBadge::Funded => "funded",
            ActionBadge::Rejected => "rejected",
        };
        Self {
            scholarship: value.scholarship.into(),
            badge: badge.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBody {
    pub entries: Vec<CatalogEntryBody>,
    pub can_create: bool,
    pub loading: bool,
}

impl From<CatalogView> for CatalogBody {
    fn from(value: CatalogView) -> Self {
        Self {
            entries: bodies(value.entries),
            can_create: value.can_create,
            loading: value.loading,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedScholarshipBody {
    pub scholarship: ScholarshipBody,
    pub notification: NotificationBody,
}

impl From<CreateScholarshipResponse> for CreatedScholarshipBody {
    fn from(value: CreateScholarshipResponse) -> Self {
        Self {
            scholarship: value.scholarship.into(),
            notification: value.notification.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedScholarshipBody {
    pub scholarship: ScholarshipBody,
    /// `funded` or `approved`.
    pub badge: String,
}

impl From<ReceivedScholarship> for ReceivedScholarshipBody {
    fn from(value: ReceivedScholarship) -> Self {
        let badge = match value.badge {
            ReceivedBadge::Funded => "funded",
            ReceivedBadge::Approved => "approved",
        };
        Self {
            scholarship: value.scholarship.into(),
            badge: badge.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentOverviewBody {
    pub applied: Vec<ScholarshipBody>,
    pub received: Vec<ReceivedScholarshipBody>,
    pub total_available: usize,
    pub loading: bool,
    pub stale: bool,
}

impl From<StudentOverview> for StudentOverviewBody {
    fn from(value: StudentOverview) -> Self {
        Self {
            applied: bodies(value.applied),
            received: bodies(value.received),
            total_available: value.total_available,
            loading: value.loading,
            stale: value.stale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GovernmentOverviewBody {
    pub pending: Vec<ScholarshipBody>,
    pub total: usize,
    pub approved: usize,
    pub selected: Option<Uuid>,
    pub applicants: Vec<ApplicationBody>,
    pub loading: bool,
}

impl From<GovernmentOverview> for GovernmentOverviewBody {
    fn from(value: GovernmentOverview) -> Self {
        Self {
            pending: bodies(value.pending),
            total: value.total,
            approved: value.approved,
            selected: value.selected.map(|id| *id.as_uuid()),
            applicants: bodies(value.applicants),
            loading: value.loading,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancierOverviewBody {
    pub awaiting: Vec<ScholarshipBody>,
    pub history: Vec<ScholarshipBody>,
    pub funded_count: usize,
    pub total_funded: String,
    pub total_funded_display: String,
    pub funding_in_progress: Option<Uuid>,
    pub loading: bool,
}

impl From<FinancierOverview> for FinancierOverviewBody {
    fn from(value: FinancierOverview) -> Self {
        Self {
            awaiting: bodies(value.awaiting),
            history: bodies(value.history),
            funded_count: value.funded_count,
            total_funded: value.total_funded.to_string(),
            total_funded_display: value.total_funded.to_fixed(3),
            funding_in_progress: value.funding_in_progress.map(|id| *id.as_uuid()),
            loading: value.loading,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FundingReceiptBody {
    pub scholarship_id: Uuid,
    pub tx_hash: String,
    pub notification: NotificationBody,
}

impl From<FundingReceipt> for FundingReceiptBody {
    fn from(value: FundingReceipt) -> Self {
        Self {
            scholarship_id: *value.scholarship_id.as_uuid(),
            tx_hash: value.tx_hash.into(),
            notification: value.notification.into(),
        }
    }
}
