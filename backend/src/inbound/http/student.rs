//! Student dashboard endpoints.

use actix_web::{get, post, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::StudentOverviewBody;
use crate::inbound::http::session::WalletSession;
use crate::inbound::http::state::HttpState;

/// Applied and received scholarships for the connected wallet.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/student",
    responses(
        (status = 200, description = "Student dashboard", body = StudentOverviewBody),
        (status = 401, description = "Wallet not connected", body = Error)
    ),
    tags = ["dashboards"],
    operation_id = "studentDashboard"
)]
#[get("/dashboard/student")]
pub async fn student_dashboard(
    state: web::Data<HttpState>,
    session: WalletSession,
) -> ApiResult<web::Json<StudentOverviewBody>> {
    let address = session.require_address()?;
    let overview = state.student.overview(&address).await?;
    Ok(web::Json(StudentOverviewBody::from(overview)))
}

/// Reload the connected wallet's applications and project the dashboard.
#[utoipa::path(
    post,
    path = "/api/v1/dashboard/student/refresh",
    responses(
        (status = 200, description = "Refreshed dashboard", body = StudentOverviewBody),
        (status = 401, description = "Wallet not connected", body = Error)
    ),
    tags = ["dashboards"],
    operation_id = "refreshStudentDashboard"
)]
#[post("/dashboard/student/refresh")]
pub async fn refresh_student_dashboard(
    state: web::Data<HttpState>,
    session: WalletSession,
) -> ApiResult<web::Json<StudentOverviewBody>> {
    let address = session.require_address()?;
    let overview = state.student.refresh(&address).await?;
    Ok(web::Json(StudentOverviewBody::from(overview)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;

    use super::*;
    use crate::domain::ScholarshipStatus;
    use crate::domain::ports::{ReceivedBadge, ReceivedScholarship, StudentOverview};
    use crate::domain::test_support::scholarship;
    use crate::inbound::http::test_utils::{
        MockPorts, sign_in, student_address, student_key, test_session_middleware,
    };
    use crate::inbound::http::wallet::{connect_wallet, request_challenge};

    macro_rules! student_app {
        ($ports:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($ports.into_state()))
                    .wrap(test_session_middleware())
                    .service(
                        web::scope("/api/v1")
                            .service(request_challenge)
                            .service(connect_wallet)
                            .service(student_dashboard)
                            .service(refresh_student_dashboard),
                    ),
            )
            .await
        };
    }

    #[rstest]
    #[case::overview("/api/v1/dashboard/student", false)]
    #[case::refresh("/api/v1/dashboard/student/refresh", true)]
    #[actix_web::test]
    async fn dashboard_requires_wallet(#[case] uri: &str, #[case] post: bool) {
        let mut ports = MockPorts::default();
        ports.student.expect_overview().times(0);
        ports.student.expect_refresh().times(0);
        let app = student_app!(ports);

        let req = if post {
            test::TestRequest::post()
        } else {
            test::TestRequest::get()
        };
        let res = test::call_service(&app, req.uri(uri).to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn overview_is_projected_for_session_wallet() {
        let received = scholarship(ScholarshipStatus::Approved, 2);
        let mut ports = MockPorts::default();
        ports
            .student
            .expect_overview()
            .withf(|address| *address == student_address())
            .times(1)
            .return_once(move |_| {
                Ok(StudentOverview {
                    applied: vec![received.clone()],
                    received: vec![ReceivedScholarship {
                        scholarship: received,
                        badge: ReceivedBadge::Approved,
                    }],
                    total_available: 3,
                    loading: false,
                    stale: false,
                })
            });
        let app = student_app!(ports);
        let cookie = sign_in(&app, &student_key()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/dashboard/student")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: StudentOverviewBody = test::read_body_json(res).await;
        assert_eq!(body.applied.len(), 1);
        assert_eq!(body.received[0].badge, "approved");
        assert_eq!(body.total_available, 3);
    }

    #[rstest]
    #[actix_web::test]
    async fn refresh_reports_stale_data() {
        let mut ports = MockPorts::default();
        ports.student.expect_refresh().times(1).return_once(|_| {
            Ok(StudentOverview {
                stale: true,
                ..StudentOverview::default()
            })
        });
        let app = student_app!(ports);
        let cookie = sign_in(&app, &student_key()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/dashboard/student/refresh")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        let body: StudentOverviewBody = test::read_body_json(res).await;
        assert!(body.stale);
    }
}
