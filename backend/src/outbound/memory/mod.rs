//! In-memory scholarship and application store.
//!
//! Implements both repository ports over a single lock so `submit` and
//! `approve` check the scholarship and write both records in one step. Used when no database URL is configured and by behavioural tests.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::ports::{
    ApplicationQuery, ApplicationRepository, ApplicationRepositoryError, ApplyOutcome,
    ApproveOutcome, CLOSED_SCHOLARSHIP_REASON, ScholarshipRepository, ScholarshipRepositoryError,
};
use crate::domain::{
    Application, ApplicationId, ApplicationStatus, NewApplication, Scholarship, ScholarshipId,
    ScholarshipStatus, WalletAddress, sort_by_creation,
};

#[derive(Debug, Default)]
struct MemoryState {
    scholarships: Vec<Scholarship>,
    applications: Vec<Application>,
}

/// Process-local store implementing [`ScholarshipRepository`] and
/// [`ApplicationRepository`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with scholarships.
    pub fn with_scholarships(scholarships: impl IntoIterator<Item = Scholarship>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                scholarships: scholarships.into_iter().collect(),
                applications: Vec::new(),
            }),
        }
    }
}

#[async_trait]
impl ScholarshipRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Scholarship>, ScholarshipRepositoryError> {
        let mut scholarships = self.state.lock().await.scholarships.clone();
        scholarships.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(scholarships)
    }

    async fn find_by_id(
        &self,
        id: &ScholarshipId,
    ) -> Result<Option<Scholarship>, ScholarshipRepositoryError> {
        Ok(self
            .state
            .lock()
            .await
            .scholarships
            .iter()
            .find(|s| s.id == *id)
            .cloned())
    }

    async fn insert(&self, scholarship: &Scholarship) -> Result<(), ScholarshipRepositoryError> {
        let mut state = self.state.lock().await;
        if state.scholarships.iter().any(|s| s.id == scholarship.id) {
            return Err(ScholarshipRepositoryError::query(format!(
                "scholarship {} already exists",
                scholarship.id
            )));
        }
        state.scholarships.push(scholarship.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        id: &ScholarshipId,
        status: ScholarshipStatus,
        recipient: Option<WalletAddress>,
    ) -> Result<(), ScholarshipRepositoryError> {
        let mut state = self.state.lock().await;
        let scholarship = state
            .scholarships
            .iter_mut()
            .find(|s| s.id == *id)
            .ok_or_else(|| ScholarshipRepositoryError::not_found(id.to_string()))?;
        scholarship.status = status;
        scholarship.recipient = recipient;
        Ok(())
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let mut applications = self.state.lock().await.applications.clone();
        sort_by_creation(&mut applications);
        Ok(applications)
    }

    async fn list_for_applicant(
        &self,
        address: &WalletAddress,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let mut applications: Vec<Application> = self
            .state
            .lock()
            .await
            .applications
            .iter()
            .filter(|app| app.applicant_address == *address)
            .cloned()
            .collect();
        sort_by_creation(&mut applications);
        Ok(applications)
    }

    async fn find(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let mut applications: Vec<Application> = self
            .state
            .lock()
            .await
            .applications
            .iter()
            .filter(|app| query.matches(app))
            .cloned()
            .collect();
        sort_by_creation(&mut applications);
        if let Some(limit) = query.limit {
            applications.truncate(limit);
        }
        Ok(applications)
    }

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, ApplicationRepositoryError> {
        Ok(self
            .state
            .lock()
            .await
            .applications
            .iter()
            .find(|app| app.id == *id)
            .cloned())
    }

    async fn submit(
        &self,
        application: &NewApplication,
    ) -> Result<ApplyOutcome, ApplicationRepositoryError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let scholarship = state
            .scholarships
            .iter_mut()
            .find(|s| s.id == application.scholarship_id)
            .ok_or_else(|| {
                ApplicationRepositoryError::not_found(application.scholarship_id.to_string())
            })?;
        if scholarship.status != ScholarshipStatus::Pending {
            return Ok(ApplyOutcome::Refused {
                reason: CLOSED_SCHOLARSHIP_REASON.to_owned(),
            });
        }
        let duplicate = state.applications.iter().any(|app| {
            app.scholarship_id == application.scholarship_id
                && app.applicant_address == application.applicant_address
        });
        if duplicate {
            return Ok(ApplyOutcome::AlreadyApplied);
        }

        let created = application.clone().into_application();
        scholarship
            .applicants
            .push(created.applicant_address.clone());
        state.applications.push(created.clone());
        Ok(ApplyOutcome::Created(created))
    }

    async fn approve(
        &self,
        scholarship_id: &ScholarshipId,
        applicant: &WalletAddress,
    ) -> Result<ApproveOutcome, ApplicationRepositoryError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let scholarship = state
            .scholarships
            .iter_mut()
            .find(|s| s.id == *scholarship_id)
            .ok_or_else(|| ApplicationRepositoryError::not_found(scholarship_id.to_string()))?;
        if scholarship.status != ScholarshipStatus::Pending {
            return Ok(ApproveOutcome::NotPending {
                status: scholarship.status,
            });
        }
        let Some(application) = state.applications.iter_mut().find(|app| {
            app.scholarship_id == *scholarship_id
                && app.applicant_address == *applicant
                && app.status == ApplicationStatus::Pending
        }) else {
            return Ok(ApproveOutcome::NoPendingApplication);
        };

        application.status = ApplicationStatus::Approved;
        scholarship.status = ScholarshipStatus::Approved;
        scholarship.recipient = Some(applicant.clone());
        Ok(ApproveOutcome::Approved(application.clone()))
    }

    async fn set_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), ApplicationRepositoryError> {
        let mut state = self.state.lock().await;
        let application = state
            .applications
            .iter_mut()
            .find(|app| app.id == *id)
            .ok_or_else(|| ApplicationRepositoryError::not_found(id.to_string()))?;
        application.status = status;
        Ok(())
    }
}
