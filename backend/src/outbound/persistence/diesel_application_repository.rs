//! PostgreSQL-backed `ApplicationRepository` using Diesel.
//!
//! `submit` and `approve` lock the scholarship row for the length of their
//! transactions. The pending check and both writes therefore happen
//! atomically with respect to each other and to concurrent approvals.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    ApplicationQuery, ApplicationRepository, ApplicationRepositoryError, ApplyOutcome,
    ApproveOutcome, CLOSED_SCHOLARSHIP_REASON,
};
use crate::domain::{
    Application, ApplicationId, ApplicationStatus, NewApplication, ScholarshipId,
    ScholarshipStatus, WalletAddress,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ApplicationRow, NewApplicationRow, ScholarshipStatusUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{applications, scholarships};

/// Diesel-backed application repository.
#[derive(Clone)]
pub struct DieselApplicationRepository {
    pool: DbPool,
}

impl DieselApplicationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ApplicationRepositoryError {
    map_basic_pool_error(error, ApplicationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ApplicationRepositoryError {
    map_basic_diesel_error(
        error,
        ApplicationRepositoryError::query,
        ApplicationRepositoryError::connection,
    )
}

/// Convert a row into a domain application.
pub(super) fn row_to_application(
    row: ApplicationRow,
) -> Result<Application, ApplicationRepositoryError> {
    let applicant_address = WalletAddress::new(&row.applicant_address).map_err(|err| {
        ApplicationRepositoryError::query(format!(
            "stored address {}: {err}",
            row.applicant_address
        ))
    })?;
    let status: ApplicationStatus = row
        .status
        .parse()
        .map_err(|err| ApplicationRepositoryError::query(format!("stored status: {err}")))?;
    Ok(Application {
        id: ApplicationId::from_uuid(row.id),
        scholarship_id: ScholarshipId::from_uuid(row.scholarship_id),
        applicant_address,
        status,
        created_at: row.created_at,
    })
}

fn rows_to_applications(
    rows: Vec<ApplicationRow>,
) -> Result<Vec<Application>, ApplicationRepositoryError> {
    rows.into_iter().map(row_to_application).collect()
}

fn query_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// What the submit transaction observed.
enum Submission {
    MissingScholarship,
    Closed(String),
    Duplicate,
    Created(ApplicationRow),
}

/// What the approve transaction observed.
enum Approval {
    MissingScholarship,
    NotPending(String),
    NoPendingApplication,
    Approved(ApplicationRow),
}

#[async_trait]
impl ApplicationRepository for DieselApplicationRepository {
    async fn list_all(&self) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ApplicationRow> = applications::table
            .select(ApplicationRow::as_select())
            .order((applications::created_at.asc(), applications::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_applications(rows)
    }

    async fn list_for_applicant(
        &self,
        address: &WalletAddress,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ApplicationRow> = applications::table
            .filter(applications::applicant_address.eq(address.as_str()))
            .select(ApplicationRow::as_select())
            .order((applications::created_at.asc(), applications::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_applications(rows)
    }

    async fn find(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut statement = applications::table
            .filter(applications::scholarship_id.eq(*query.scholarship_id.as_uuid()))
            .select(ApplicationRow::as_select())
            .order((applications::created_at.asc(), applications::id.asc()))
            .into_boxed();
        if let Some(status) = query.status {
            statement = statement.filter(applications::status.eq(status.as_str()));
        }
        if let Some(limit) = query.limit {
            statement = statement.limit(query_limit(limit));
        }
        let rows: Vec<ApplicationRow> = statement
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_applications(rows)
    }

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ApplicationRow> = applications::table
            .find(id.as_uuid())
            .select(ApplicationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_application).transpose()
    }

    async fn submit(
        &self,
        application: &NewApplication,
    ) -> Result<ApplyOutcome, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let scholarship_id = *application.scholarship_id.as_uuid();
        let applicant = application.applicant_address.as_str();
        let row = NewApplicationRow {
            id: *application.id.as_uuid(),
            scholarship_id,
            applicant_address: applicant,
            status: ApplicationStatus::Pending.as_str(),
            created_at: application.created_at,
        };

        let submission = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let locked: Option<(String, Vec<String>)> = scholarships::table
                        .find(scholarship_id)
                        .select((scholarships::status, scholarships::applicants))
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some((status, mut applicants)) = locked else {
                        return Ok(Submission::MissingScholarship);
                    };
                    if status != ScholarshipStatus::Pending.as_str() {
                        return Ok(Submission::Closed(status));
                    }

                    let inserted = diesel::insert_into(applications::table)
                        .values(&row)
                        .on_conflict((applications::scholarship_id, applications::applicant_address))
                        .do_nothing()
                        .execute(conn)
                        .await?;
                    if inserted == 0 {
                        return Ok(Submission::Duplicate);
                    }

                    if !applicants.iter().any(|a| a == applicant) {
                        applicants.push(applicant.to_owned());
                        diesel::update(scholarships::table.find(scholarship_id))
                            .set(scholarships::applicants.eq(applicants))
                            .execute(conn)
                            .await?;
                    }

                    let created: ApplicationRow = applications::table
                        .find(row.id)
                        .select(ApplicationRow::as_select())
                        .first(conn)
                        .await?;
                    Ok(Submission::Created(created))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match submission {
            Submission::MissingScholarship => Err(ApplicationRepositoryError::not_found(
                application.scholarship_id.to_string(),
            )),
            Submission::Closed(status) => {
                tracing::debug!(
                    scholarship_id = %application.scholarship_id,
                    status,
                    "application refused"
                );
                Ok(ApplyOutcome::Refused {
                    reason: CLOSED_SCHOLARSHIP_REASON.to_owned(),
                })
            }
            Submission::Duplicate => Ok(ApplyOutcome::AlreadyApplied),
            Submission::Created(row) => row_to_application(row).map(ApplyOutcome::Created),
        }
    }

    async fn approve(
        &self,
        scholarship_id: &ScholarshipId,
        applicant: &WalletAddress,
    ) -> Result<ApproveOutcome, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *scholarship_id.as_uuid();
        let address = applicant.as_str();

        let approval = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let locked: Option<String> = scholarships::table
                        .find(id)
                        .select(scholarships::status)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(status) = locked else {
                        return Ok(Approval::MissingScholarship);
                    };
                    if status != ScholarshipStatus::Pending.as_str() {
                        return Ok(Approval::NotPending(status));
                    }

                    let approved: Option<ApplicationRow> = diesel::update(
                        applications::table
                            .filter(applications::scholarship_id.eq(id))
                            .filter(applications::applicant_address.eq(address))
                            .filter(applications::status.eq(ApplicationStatus::Pending.as_str())),
                    )
                    .set(applications::status.eq(ApplicationStatus::Approved.as_str()))
                    .returning(ApplicationRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;
                    let Some(row) = approved else {
                        return Ok(Approval::NoPendingApplication);
                    };

                    diesel::update(scholarships::table.find(id))
                        .set(&ScholarshipStatusUpdate {
                            status: ScholarshipStatus::Approved.as_str(),
                            recipient: Some(address),
                        })
                        .execute(conn)
                        .await?;
                    Ok(Approval::Approved(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match approval {
            Approval::MissingScholarship => Err(ApplicationRepositoryError::not_found(
                scholarship_id.to_string(),
            )),
            Approval::NotPending(stored) => stored
                .parse()
                .map(|status| ApproveOutcome::NotPending { status })
                .map_err(|err| ApplicationRepositoryError::query(format!("stored status: {err}"))),
            Approval::NoPendingApplication => Ok(ApproveOutcome::NoPendingApplication),
            Approval::Approved(row) => row_to_application(row).map(ApproveOutcome::Approved),
        }
    }

    async fn set_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(applications::table.find(id.as_uuid()))
            .set(applications::status.eq(status.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(ApplicationRepositoryError::not_found(id.to_string()));
        }
        Ok(())
    }
}
