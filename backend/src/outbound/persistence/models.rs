//! Diesel row types for the scholarship tables.
//!
//! Rows carry raw column values. Conversion into validated domain types lives
//! in the repositories so decode failures surface as repository errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{applications, scholarships};

/// Row read from `scholarships`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = scholarships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScholarshipRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub amount: String,
    pub status: String,
    pub recipient: Option<String>,
    pub applicants: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable scholarship row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = scholarships)]
pub(crate) struct NewScholarshipRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub amount: String,
    pub status: &'a str,
    pub recipient: Option<&'a str>,
    pub applicants: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Status change applied to a scholarship.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = scholarships)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ScholarshipStatusUpdate<'a> {
    pub status: &'a str,
    pub recipient: Option<&'a str>,
}

/// Row read from `applications`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApplicationRow {
    pub id: Uuid,
    pub scholarship_id: Uuid,
    pub applicant_address: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable application row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = applications)]
pub(crate) struct NewApplicationRow<'a> {
    pub id: Uuid,
    pub scholarship_id: Uuid,
    pub applicant_address: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}
