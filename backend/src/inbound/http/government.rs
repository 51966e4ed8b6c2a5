//! Government review dashboard endpoints.
//!
//! Every route requires the session wallet to be the configured government
//! account.

use actix_web::{get, post, web};

use crate::domain::Error;
use crate::domain::ports::ApproveApplicantRequest;
use crate::inbound::http::dto::{ApproveApplicantBody, GovernmentOverviewBody, NotificationResponse};
use crate::inbound::http::session::WalletSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, params};

fn require_officer(state: &HttpState, session: &WalletSession) -> Result<(), Error> {
    let address = session.require_address()?;
    state.require_government(&address)
}

/// Pending scholarships with applicants, plus board totals.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/government",
    responses(
        (status = 200, description = "Government dashboard", body = GovernmentOverviewBody),
        (status = 401, description = "Wallet not connected", body = Error),
        (status = 403, description = "Not the government account", body = Error)
    ),
    tags = ["dashboards"],
    operation_id = "governmentDashboard"
)]
#[get("/dashboard/government")]
pub async fn government_dashboard(
    state: web::Data<HttpState>,
    session: WalletSession,
) -> ApiResult<web::Json<GovernmentOverviewBody>> {
    require_officer(&state, &session)?;
    let overview = state.government.overview().await?;
    Ok(web::Json(GovernmentOverviewBody::from(overview)))
}

/// Expand or collapse the applicant list of a scholarship.
#[utoipa::path(
    post,
    path = "/api/v1/dashboard/government/scholarships/{id}/applicants",
    params(("id" = String, Path, description = "Scholarship id")),
    responses(
        (status = 200, description = "Dashboard with the selection applied", body = GovernmentOverviewBody),
        (status = 400, description = "Malformed id", body = Error),
        (status = 403, description = "Not the government account", body = Error)
    ),
    tags = ["dashboards"],
    operation_id = "toggleApplicants"
)]
#[post("/dashboard/government/scholarships/{id}/applicants")]
pub async fn toggle_applicants(
    state: web::Data<HttpState>,
    session: WalletSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<GovernmentOverviewBody>> {
    require_officer(&state, &session)?;
    let scholarship_id = params::scholarship_id(&path)?;
    let overview = state.government.toggle_applicants(scholarship_id).await?;
    Ok(web::Json(GovernmentOverviewBody::from(overview)))
}

/// Award a pending scholarship to one applicant.
#[utoipa::path(
    post,
    path = "/api/v1/dashboard/government/scholarships/{id}/approve",
    params(("id" = String, Path, description = "Scholarship id")),
    request_body = ApproveApplicantBody,
    responses(
        (status = 200, description = "Applicant approved", body = NotificationResponse),
        (status = 400, description = "Malformed id or address", body = Error),
        (status = 403, description = "Not the government account", body = Error),
        (status = 404, description = "No matching application", body = Error),
        (status = 409, description = "Scholarship no longer pending", body = Error)
    ),
    tags = ["dashboards"],
    operation_id = "approveApplicant"
)]
#[post("/dashboard/government/scholarships/{id}/approve")]
pub async fn approve_applicant(
    state: web::Data<HttpState>,
    session: WalletSession,
    path: web::Path<String>,
    payload: web::Json<ApproveApplicantBody>,
) -> ApiResult<web::Json<NotificationResponse>> {
    require_officer(&state, &session)?;
    let scholarship_id = params::scholarship_id(&path)?;
    let applicant_address = params::wallet_address("applicantAddress", &payload.applicant_address)?;
    let notification = state
        .government
        .approve(ApproveApplicantRequest {
            scholarship_id,
            applicant_address,
        })
        .await?;
    Ok(web::Json(NotificationResponse::from(notification)))
}

#[cfg(test)]
#[path = "government_tests.rs"]
mod tests;
