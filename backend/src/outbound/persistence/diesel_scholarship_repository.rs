//! PostgreSQL-backed `ScholarshipRepository` using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ScholarshipRepository, ScholarshipRepositoryError};
use crate::domain::{
    EduAmount, Scholarship, ScholarshipId, ScholarshipStatus, WalletAddress,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewScholarshipRow, ScholarshipRow, ScholarshipStatusUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::scholarships;

/// Diesel-backed scholarship repository.
#[derive(Clone)]
pub struct DieselScholarshipRepository {
    pool: DbPool,
}

impl DieselScholarshipRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ScholarshipRepositoryError {
    map_basic_pool_error(error, ScholarshipRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ScholarshipRepositoryError {
    map_basic_diesel_error(
        error,
        ScholarshipRepositoryError::query,
        ScholarshipRepositoryError::connection,
    )
}

fn decode_address(raw: String) -> Result<WalletAddress, ScholarshipRepositoryError> {
    WalletAddress::new(&raw)
        .map_err(|err| ScholarshipRepositoryError::query(format!("stored address {raw}: {err}")))
}

/// Convert a row into a validated domain scholarship.
pub(super) fn row_to_scholarship(
    row: ScholarshipRow,
) -> Result<Scholarship, ScholarshipRepositoryError> {
    let ScholarshipRow {
        id,
        title,
        description,
        amount,
        status,
        recipient,
        applicants,
        created_at,
    } = row;

    let amount: EduAmount = amount
        .parse()
        .map_err(|err| ScholarshipRepositoryError::query(format!("stored amount: {err}")))?;
    let status: ScholarshipStatus = status
        .parse()
        .map_err(|err| ScholarshipRepositoryError::query(format!("stored status: {err}")))?;
    let recipient = recipient.map(decode_address).transpose()?;
    let applicants = applicants
        .into_iter()
        .map(decode_address)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Scholarship {
        id: ScholarshipId::from_uuid(id),
        title,
        description,
        amount,
        status,
        recipient,
        created_at,
        applicants,
    })
}

#[async_trait]
impl ScholarshipRepository for DieselScholarshipRepository {
    async fn list(&self) -> Result<Vec<Scholarship>, ScholarshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ScholarshipRow> = scholarships::table
            .select(ScholarshipRow::as_select())
            .order((scholarships::created_at.desc(), scholarships::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_scholarship).collect()
    }

    async fn find_by_id(
        &self,
        id: &ScholarshipId,
    ) -> Result<Option<Scholarship>, ScholarshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ScholarshipRow> = scholarships::table
            .find(id.as_uuid())
            .select(ScholarshipRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_scholarship).transpose()
    }

    async fn insert(&self, scholarship: &Scholarship) -> Result<(), ScholarshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewScholarshipRow {
            id: *scholarship.id.as_uuid(),
            title: &scholarship.title,
            description: &scholarship.description,
            amount: scholarship.amount.to_string(),
            status: scholarship.status.as_str(),
            recipient: scholarship.recipient.as_ref().map(WalletAddress::as_str),
            applicants: scholarship
                .applicants
                .iter()
                .map(|a| a.as_str().to_owned())
                .collect(),
            created_at: scholarship.created_at,
        };
        diesel::insert_into(scholarships::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_status(
        &self,
        id: &ScholarshipId,
        status: ScholarshipStatus,
        recipient: Option<WalletAddress>,
    ) -> Result<(), ScholarshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = ScholarshipStatusUpdate {
            status: status.as_str(),
            recipient: recipient.as_ref().map(WalletAddress::as_str),
        };
        let updated = diesel::update(scholarships::table.find(id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(ScholarshipRepositoryError::not_found(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn row() -> ScholarshipRow {
        ScholarshipRow {
            id: Uuid::new_v4(),
            title: "STEM Grant".to_owned(),
            description: "Lab fees".to_owned(),
            amount: "0.125".to_owned(),
            status: "approved".to_owned(),
            recipient: Some(format!("0x{}", "AB".repeat(20))),
            applicants: vec![format!("0x{}", "ab".repeat(20))],
            created_at: Utc
                .with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    #[rstest]
    fn decodes_a_valid_row(row: ScholarshipRow) {
        let id = row.id;
        let scholarship = row_to_scholarship(row).expect("row decodes");

        assert_eq!(scholarship.id, ScholarshipId::from_uuid(id));
        assert_eq!(scholarship.status, ScholarshipStatus::Approved);
        assert_eq!(scholarship.amount.to_fixed(3), "0.125");
        assert_eq!(scholarship.recipient, scholarship.applicants.get(0).cloned());
    }

    #[rstest]
    #[case::status(|r: &mut ScholarshipRow| r.status = "archived".to_owned(), "stored status")]
    #[case::amount(|r: &mut ScholarshipRow| r.amount = "lots".to_owned(), "stored amount")]
    #[case::recipient(|r: &mut ScholarshipRow| r.recipient = Some("nobody".to_owned()), "stored address")]
    #[case::applicant(|r: &mut ScholarshipRow| r.applicants.push("0x12".to_owned()), "stored address")]
    fn rejects_corrupt_rows(
        mut row: ScholarshipRow,
        #[case] corrupt: fn(&mut ScholarshipRow),
        #[case] expected: &str,
    ) {
        corrupt(&mut row);
        let err = row_to_scholarship(row).expect_err("corrupt row");
        assert!(
            matches!(&err, ScholarshipRepositoryError::Query { message } if message.contains(expected)),
            "unexpected error: {err}"
        );
    }
}
