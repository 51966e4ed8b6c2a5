//! Domain primitives, services and ports.
//!
//! Purpose: hold the scholarship workflow rules independent of transport
//! and storage. Services implement the driving ports in [`ports`] and talk
//! to the outside world only through the driven ports declared there.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Scholarship / Application: lifecycle records.
//! - ScholarshipBoard: shared scholarship list used by every dashboard.
//! - WalletChallenge / WalletSignature: signed proof of wallet ownership.
//! - CatalogService, StudentDashboardService, GovernmentDashboardService,
//!   FinancierDashboardService: driving port implementations.

mod amount;
mod application;
pub mod board;
mod catalog;
pub mod error;
mod financier_dashboard;
mod government_dashboard;
mod notification;
mod payment;
pub mod ports;
mod scholarship;
mod student_dashboard;
mod trace_id;
mod wallet_address;
mod wallet_cache;
mod wallet_proof;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::amount::{AmountParseError, EDU_DECIMALS, EduAmount};
pub use self::application::{
    Application, ApplicationId, ApplicationStatus, NewApplication, UnknownApplicationStatus,
    sort_by_creation,
};
pub use self::board::{ScholarshipBoard, StatusBreakdown};
pub use self::catalog::{ApplyPolicy, CatalogService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::financier_dashboard::{
    FUNDING_BUSY_MESSAGE, FUNDING_ERROR_TITLE, FinancierDashboardService, NO_APPLICATION_MESSAGE,
    WALLET_MISSING_MESSAGE,
};
pub use self::government_dashboard::GovernmentDashboardService;
pub use self::notification::{Notification, NotificationTone};
pub use self::payment::{
    GAS_BUFFER_PERCENT, TransactionReceipt, TransferRequest, TxHash, TxHashError,
    apply_gas_buffer, select_payee,
};
pub use self::scholarship::{
    Scholarship, ScholarshipDraft, ScholarshipId, ScholarshipStatus, ScholarshipValidationError,
    UNASSIGNED_RECIPIENT, UnknownScholarshipStatus,
};
pub use self::student_dashboard::StudentDashboardService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::wallet_address::{WalletAddress, WalletAddressError};
pub use self::wallet_cache::{WALLET_CACHE_CAPACITY, WalletCache};
pub use self::wallet_proof::{
    CHALLENGE_TTL_SECS, WalletChallenge, WalletProofError, WalletSignature,
    personal_message_hash,
};

