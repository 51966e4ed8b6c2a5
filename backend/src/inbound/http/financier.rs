//! Financier funding dashboard endpoints.

use actix_web::{get, post, web};
use tracing::info;

use crate::domain::Error;
use crate::inbound::http::dto::{FinancierOverviewBody, FundingReceiptBody};
use crate::inbound::http::session::WalletSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, params};

/// Approved scholarships awaiting payment and the funding history.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/financier",
    responses(
        (status = 200, description = "Financier dashboard", body = FinancierOverviewBody),
        (status = 401, description = "Wallet not connected", body = Error)
    ),
    tags = ["dashboards"],
    operation_id = "financierDashboard"
)]
#[get("/dashboard/financier")]
pub async fn financier_dashboard(
    state: web::Data<HttpState>,
    session: WalletSession,
) -> ApiResult<web::Json<FinancierOverviewBody>> {
    session.require_address()?;
    let overview = state.financier.overview().await?;
    Ok(web::Json(FinancierOverviewBody::from(overview)))
}

/// Pay the chosen applicant on-chain and mark the scholarship completed.
#[utoipa::path(
    post,
    path = "/api/v1/dashboard/financier/scholarships/{id}/fund",
    params(("id" = String, Path, description = "Scholarship id")),
    responses(
        (status = 200, description = "Payment confirmed", body = FundingReceiptBody),
        (status = 401, description = "Wallet not connected", body = Error),
        (status = 403, description = "Wallet is not a registered financier", body = Error),
        (status = 404, description = "No application found", body = Error),
        (status = 409, description = "Funding in progress, rejected or reverted", body = Error),
        (status = 412, description = "No wallet provider configured", body = Error),
        (status = 503, description = "Wallet or store unavailable", body = Error)
    ),
    tags = ["dashboards"],
    operation_id = "fundScholarship"
)]
#[post("/dashboard/financier/scholarships/{id}/fund")]
pub async fn fund_scholarship(
    state: web::Data<HttpState>,
    session: WalletSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<FundingReceiptBody>> {
    let financier = session.require_address()?;
    state.require_financier(&financier)?;
    let scholarship_id = params::scholarship_id(&path)?;
    let receipt = state.financier.fund(scholarship_id).await?;
    info!(
        financier = %financier,
        scholarship_id = %scholarship_id,
        tx_hash = %receipt.tx_hash,
        "scholarship funded"
    );
    Ok(web::Json(FundingReceiptBody::from(receipt)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::ports::{FinancierOverview, FundingReceipt};
    use crate::domain::test_support::{amount, scholarship};
    use crate::domain::{
        ErrorCode, FUNDING_ERROR_TITLE, Notification, ScholarshipId, ScholarshipStatus, TxHash,
        WALLET_MISSING_MESSAGE,
    };
    use crate::inbound::http::test_utils::{
        MockPorts, government_address, government_key, sign_in, student_key,
        test_session_middleware,
    };
    use crate::inbound::http::state::HttpState;
    use crate::inbound::http::wallet::{connect_wallet, request_challenge};

    macro_rules! financier_app {
        ($ports:expr) => {
            financier_app!($ports, |state| state)
        };
        ($ports:expr, $configure:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(($configure)($ports.into_state())))
                    .wrap(test_session_middleware())
                    .service(
                        web::scope("/api/v1")
                            .service(request_challenge)
                            .service(connect_wallet)
                            .service(financier_dashboard)
                            .service(fund_scholarship),
                    ),
            )
            .await
        };
    }

    fn fund_uri(id: ScholarshipId) -> String {
        format!("/api/v1/dashboard/financier/scholarships/{id}/fund")
    }

    #[rstest]
    #[actix_web::test]
    async fn overview_reports_totals() {
        let mut paid = scholarship(ScholarshipStatus::Completed, 1);
        paid.amount = amount("1.25");
        let awaiting = scholarship(ScholarshipStatus::Approved, 2);
        let in_progress = awaiting.id;
        let mut ports = MockPorts::default();
        ports.financier.expect_overview().times(1).return_once(move || {
            Ok(FinancierOverview {
                awaiting: vec![awaiting],
                history: vec![paid],
                funded_count: 1,
                total_funded: amount("1.25"),
                funding_in_progress: Some(in_progress),
                loading: false,
            })
        });
        let app = financier_app!(ports);
        let cookie = sign_in(&app, &student_key()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/dashboard/financier")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: FinancierOverviewBody = test::read_body_json(res).await;
        assert_eq!(body.total_funded_display, "1.250");
        assert_eq!(body.funding_in_progress, Some(*in_progress.as_uuid()));
    }

    #[rstest]
    #[actix_web::test]
    async fn fund_returns_transaction_hash() {
        let target = ScholarshipId::random();
        let hash = TxHash::new(format!("0x{}", "ab".repeat(32))).expect("valid hash");
        let expected = hash.to_string();
        let mut ports = MockPorts::default();
        ports
            .financier
            .expect_fund()
            .withf(move |id| *id == target)
            .times(1)
            .return_once(move |scholarship_id| {
                Ok(FundingReceipt {
                    scholarship_id,
                    tx_hash: hash,
                    notification: Notification::success(
                        "Payment successful",
                        "0.001 EDU sent to student successfully",
                    ),
                })
            });
        let app = financier_app!(ports);
        let cookie = sign_in(&app, &student_key()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&fund_uri(target))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: FundingReceiptBody = test::read_body_json(res).await;
        assert_eq!(body.tx_hash, expected);
        assert_eq!(body.notification.title, "Payment successful");
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_wallet_provider_is_precondition_failed() {
        let mut ports = MockPorts::default();
        ports.financier.expect_fund().return_once(|_| {
            Err(
                Notification::destructive(FUNDING_ERROR_TITLE, WALLET_MISSING_MESSAGE)
                    .into_error(ErrorCode::PreconditionFailed),
            )
        });
        let app = financier_app!(ports);
        let cookie = sign_in(&app, &student_key()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&fund_uri(ScholarshipId::random()))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], WALLET_MISSING_MESSAGE);
        assert_eq!(body["details"]["title"], FUNDING_ERROR_TITLE);
    }

    #[rstest]
    #[actix_web::test]
    async fn fund_requires_connected_wallet() {
        let mut ports = MockPorts::default();
        ports.financier.expect_fund().times(0);
        let app = financier_app!(ports);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&fund_uri(ScholarshipId::random()))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case::unlisted_wallet(student_key(), StatusCode::FORBIDDEN)]
    #[case::government(government_key(), StatusCode::OK)]
    #[actix_web::test]
    async fn registered_financiers_gate_funding(
        #[case] key: k256::ecdsa::SigningKey,
        #[case] expected: StatusCode,
    ) {
        let target = ScholarshipId::random();
        let allowed = expected == StatusCode::OK;
        let mut ports = MockPorts::default();
        ports
            .financier
            .expect_fund()
            .times(usize::from(allowed))
            .returning(|scholarship_id| {
                Ok(FundingReceipt {
                    scholarship_id,
                    tx_hash: TxHash::new(format!("0x{}", "cd".repeat(32))).expect("valid hash"),
                    notification: Notification::success("Payment successful", "sent"),
                })
            });
        let app = financier_app!(ports, |state: HttpState| {
            state.with_financiers(vec![government_address()])
        });
        let cookie = sign_in(&app, &key).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&fund_uri(target))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), expected);
    }
}
