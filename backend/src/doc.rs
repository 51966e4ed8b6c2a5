//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every scholarship endpoint, the JSON bodies they
//! exchange and the session cookie that carries the connected wallet. The
//! document backs Swagger UI in debug builds and `openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::dto::{
    ApplicationBody, ApproveApplicantBody, CatalogBody, CatalogEntryBody, ChallengeBody,
    ChallengeRequest, ConnectWalletRequest, CreateScholarshipBody, CreatedScholarshipBody, FinancierOverviewBody, FundingReceiptBody,
    GovernmentOverviewBody, NotificationBody, NotificationResponse, ReceivedScholarshipBody,
    ScholarshipBody, StudentOverviewBody, WalletStatusBody,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/wallet/connect.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Scholarship disbursement API",
        description = "Browse, apply for, approve and fund scholarships paid in EDU.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::wallet::request_challenge,
        crate::inbound::http::wallet::connect_wallet,
        crate::inbound::http::wallet::disconnect_wallet,
        crate::inbound::http::wallet::wallet_status,
        crate::inbound::http::catalog::browse_scholarships,
        crate::inbound::http::catalog::create_scholarship,
        crate::inbound::http::catalog::apply_for_scholarship,
        crate::inbound::http::student::student_dashboard,
        crate::inbound::http::student::refresh_student_dashboard,
        crate::inbound::http::government::government_dashboard,
        crate::inbound::http::government::toggle_applicants,
        crate::inbound::http::government::approve_applicant,
        crate::inbound::http::financier::financier_dashboard,
        crate::inbound::http::financier::fund_scholarship,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        ChallengeRequest,
        ChallengeBody,
        ConnectWalletRequest,
        WalletStatusBody,
        CreateScholarshipBody,
        ApproveApplicantBody,
        NotificationBody,
        NotificationResponse,
        ScholarshipBody,
        ApplicationBody,
        CatalogEntryBody,
        CatalogBody,
        CreatedScholarshipBody,
        ReceivedScholarshipBody,
        StudentOverviewBody,
        GovernmentOverviewBody,
        FinancierOverviewBody,
        FundingReceiptBody,
    )),
    tags(
        (name = "wallet", description = "Prove, connect and disconnect the session wallet"),
        (name = "scholarships", description = "Catalog, creation and applications"),
        (name = "dashboards", description = "Student, government and financier views"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
