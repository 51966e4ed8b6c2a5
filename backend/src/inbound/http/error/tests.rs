//! Tests for HTTP error mapping.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::rstest;
use serde_json::json;

use super::*;

const TRACE_ID: &str = "00000000-0000-0000-0000-00000000002a";

async fn payload(error: &Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|v| v.to_str().expect("ascii header").to_owned());
    let bytes = to_bytes(response.into_body())
        .await
        .expect("body readable");
    let body = serde_json::from_slice(&bytes).expect("error JSON");
    (status, header, body)
}

#[rstest]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED)]
#[case(ErrorCode::Forbidden, StatusCode::FORBIDDEN)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::Conflict, StatusCode::CONFLICT)]
#[case(ErrorCode::PreconditionFailed, StatusCode::PRECONDITION_FAILED)]
#[case(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
#[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
fn every_code_has_a_status(#[case] code: ErrorCode, #[case] status: StatusCode) {
    assert_eq!(status_for(code), status);
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_title() {
    let error = Error::internal("pool checkout failed: too many clients")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "title": "Error processing funding", "dsn": "secret" }));

    let (status, header, body) = payload(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(body.message(), "Internal server error");
    assert_eq!(body.details(), Some(&json!({ "title": "Error processing funding" })));
}

#[rstest]
#[actix_web::test]
async fn client_errors_pass_through() {
    let error = Error::precondition_failed("Wallet not found")
        .with_details(json!({ "title": "Error processing funding" }));

    let (status, header, body) = payload(&error).await;

    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert!(header.is_none());
    assert_eq!(body.code(), ErrorCode::PreconditionFailed);
    assert_eq!(body.message(), "Wallet not found");
    assert_eq!(body.trace_id(), None);
}

#[rstest]
fn actix_errors_become_generic_internal_errors() {
    let err: Error = actix_web::error::ErrorBadRequest("malformed").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}
