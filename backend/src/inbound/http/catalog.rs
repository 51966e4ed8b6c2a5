//! Scholarship catalog endpoints.
//!
//! ```text
//! GET  /api/v1/scholarships?tab=all&search=robotics
//! POST /api/v1/scholarships {"title":"Arts Grant","amount":"0.25"}
//! POST /api/v1/scholarships/{id}/applications
//! ```

use actix_web::{get, post, web};
use serde_json::json;

use crate::domain::ports::{ApplyRequest, BrowseRequest, CreateScholarshipRequest};
use crate::domain::{EduAmount, Error, ScholarshipDraft};
use crate::inbound::http::dto::{
    BrowseQuery, CatalogBody, CreateScholarshipBody, CreatedScholarshipBody, NotificationResponse,
};
use crate::inbound::http::session::WalletSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, params};

/// List scholarships for a tab and optional search text.
#[utoipa::path(
    get,
    path = "/api/v1/scholarships",
    params(BrowseQuery),
    responses(
        (status = 200, description = "Matching scholarships", body = CatalogBody),
        (status = 400, description = "Unknown tab", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["scholarships"],
    operation_id = "browseScholarships"
)]
#[get("/scholarships")]
pub async fn browse_scholarships(
    state: web::Data<HttpState>,
    session: WalletSession,
    query: web::Query<BrowseQuery>,
) -> ApiResult<web::Json<CatalogBody>> {
    let tab = query.tab()?;
    let view = state
        .catalog
        .browse(BrowseRequest {
            address: session.address()?,
            search: query.into_inner().search,
            tab,
        })
        .await?;
    Ok(web::Json(CatalogBody::from(view)))
}

/// Create a scholarship as the government officer.
#[utoipa::path(
    post,
    path = "/api/v1/scholarships",
    request_body = CreateScholarshipBody,
    responses(
        (status = 200, description = "Scholarship created", body = CreatedScholarshipBody),
        (status = 400, description = "Invalid scholarship", body = Error),
        (status = 401, description = "Wallet not connected", body = Error),
        (status = 403, description = "Not the government account", body = Error)
    ),
    tags = ["scholarships"],
    operation_id = "createScholarship"
)]
#[post("/scholarships")]
pub async fn create_scholarship(
    state: web::Data<HttpState>,
    session: WalletSession,
    payload: web::Json<CreateScholarshipBody>,
) -> ApiResult<web::Json<CreatedScholarshipBody>> {
    let CreateScholarshipBody {
        title,
        description,
        amount,
    } = payload.into_inner();
    let amount: EduAmount = amount.trim().parse().map_err(|err| {
        Error::invalid_request(format!("invalid amount: {err}"))
            .with_details(json!({ "field": "amount", "title": "Error creating scholarship" }))
    })?;
    let response = state
        .catalog
        .create(CreateScholarshipRequest {
            address: session.address()?,
            draft: ScholarshipDraft {
                title,
                description,
                amount,
            },
        })
        .await?;
    Ok(web::Json(CreatedScholarshipBody::from(response)))
}

/// Apply for a scholarship with the connected wallet.
#[utoipa::path(
    post,
    path = "/api/v1/scholarships/{id}/applications",
    params(("id" = String, Path, description = "Scholarship id")),
    responses(
        (status = 200, description = "Application recorded", body = NotificationResponse),
        (status = 400, description = "Scholarship closed or malformed id", body = Error),
        (status = 401, description = "Wallet not connected", body = Error),
        (status = 404, description = "Scholarship not found", body = Error),
        (status = 409, description = "Already applied", body = Error)
    ),
    tags = ["scholarships"],
    operation_id = "applyForScholarship"
)]
#[post("/scholarships/{id}/applications")]
pub async fn apply_for_scholarship(
    state: web::Data<HttpState>,
    session: WalletSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<NotificationResponse>> {
    let scholarship_id = params::scholarship_id(&path)?;
    let notification = state
        .catalog
        .apply(ApplyRequest {
            address: session.address()?,
            scholarship_id,
        })
        .await?;
    Ok(web::Json(NotificationResponse::from(notification)))
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
