//! Scholarship disbursement service.
//!
//! Students browse and apply for scholarships, the government officer
//! approves one applicant per scholarship, and financiers pay the award
//! on-chain through a wallet provider.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
