//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use k256::ecdsa::SigningKey;

use crate::domain::WalletAddress;
use crate::domain::ports::{
    MockFinancierFunding, MockGovernmentReview, MockScholarshipCatalog, MockStudentDashboard,
};
use crate::domain::test_support::{sign_message, signing_key};
use crate::inbound::http::dto::{ChallengeBody, ChallengeRequest, ConnectWalletRequest};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Session middleware with a fresh key and the `Secure` flag off.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

pub fn government_key() -> SigningKey {
    signing_key(0x90)
}

pub fn student_key() -> SigningKey {
    signing_key(0x52)
}

pub fn government_address() -> WalletAddress {
    WalletAddress::from_verifying_key(government_key().verifying_key())
}

pub fn student_address() -> WalletAddress {
    WalletAddress::from_verifying_key(student_key().verifying_key())
}

/// `POST /api/v1/wallet/challenge` for `address`.
pub fn challenge_request(address: &WalletAddress) -> Request {
    test::TestRequest::post()
        .uri("/api/v1/wallet/challenge")
        .set_json(ChallengeRequest {
            address: address.to_string(),
        })
        .to_request()
}

/// `POST /api/v1/wallet/connect` answering the challenge held by `cookie`.
pub fn connect_request(
    address: &WalletAddress,
    signature: &str,
    cookie: Cookie<'static>,
) -> Request {
    test::TestRequest::post()
        .uri("/api/v1/wallet/connect")
        .cookie(cookie)
        .set_json(ConnectWalletRequest {
            address: address.to_string(),
            signature: signature.to_owned(),
        })
        .to_request()
}

/// Fetch a challenge for `key`'s wallet and return its signature with the
/// session cookie holding the challenge.
pub async fn signed_challenge<S, B>(app: &S, key: &SigningKey) -> (String, Cookie<'static>)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let address = WalletAddress::from_verifying_key(key.verifying_key());
    let res = test::call_service(app, challenge_request(&address)).await;
    assert_eq!(res.status(), StatusCode::OK, "challenge issued");
    let cookie = session_cookie(&res);
    let challenge: ChallengeBody = test::read_body_json(res).await;
    (sign_message(key, &challenge.message), cookie)
}

/// Connect `key`'s wallet through the signed handshake and return the
/// session cookie.
pub async fn sign_in<S, B>(app: &S, key: &SigningKey) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let address = WalletAddress::from_verifying_key(key.verifying_key());
    let (signature, cookie) = signed_challenge(app, key).await;
    let res = test::call_service(app, connect_request(&address, &signature, cookie)).await;
    assert_eq!(res.status(), StatusCode::OK, "wallet connected");
    session_cookie(&res)
}

/// Driving port mocks, one per dashboard.
#[derive(Default)]
pub struct MockPorts {
    pub catalog: MockScholarshipCatalog,
    pub student: MockStudentDashboard,
    pub government: MockGovernmentReview,
    pub financier: MockFinancierFunding,
}

impl MockPorts {
    /// Build handler state with [`government_address`] as the officer.
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                catalog: Arc::new(self.catalog),
                student: Arc::new(self.student),
                government: Arc::new(self.government),
                financier: Arc::new(self.financier),
            },
            government_address(),
        )
    }
}
