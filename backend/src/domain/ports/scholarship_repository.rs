//! Port for scholarship persistence.

use async_trait::async_trait;

use crate::domain::{Scholarship, ScholarshipId, ScholarshipStatus, WalletAddress};

use super::define_port_error;

define_port_error! {
    /// Errors raised by scholarship repository adapters.
    pub enum ScholarshipRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "scholarship repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "scholarship repository query failed: {message}",
        /// The scholarship targeted by a mutation does not exist.
        NotFound { id: String } =>
            "scholarship {id} not found",
    }
}

/// Port for reading and updating scholarship records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScholarshipRepository: Send + Sync {
    /// List every scholarship, newest first.
    async fn list(&self) -> Result<Vec<Scholarship>, ScholarshipRepositoryError>;

    /// Find a scholarship by id.
    async fn find_by_id(
        &self,
        id: &ScholarshipId,
    ) -> Result<Option<Scholarship>, ScholarshipRepositoryError>;

    /// Persist a new scholarship.
    async fn insert(&self, scholarship: &Scholarship) -> Result<(), ScholarshipRepositoryError>;

    /// Set the lifecycle status and recipient of an existing scholarship.
    async fn update_status(
        &self,
        id: &ScholarshipId,
        status: ScholarshipStatus,
        recipient: Option<WalletAddress>,
    ) -> Result<(), ScholarshipRepositoryError>;
}
