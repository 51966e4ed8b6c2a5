//! Builders shared by domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use k256::ecdsa::SigningKey;
use mockable::{Clock, MockClock};

use super::{
    Application, ApplicationId, ApplicationStatus, EduAmount, Scholarship, ScholarshipId,
    ScholarshipStatus, WalletAddress, WalletSignature, personal_message_hash,
};

pub(crate) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) fn fixed_clock() -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(epoch());
    Arc::new(clock)
}

pub(crate) fn address(seed: u8) -> WalletAddress {
    WalletAddress::new(format!("0x{}", format!("{seed:02x}").repeat(20))).expect("valid address")
}

/// Deterministic wallet key; `seed` must be non-zero.
pub(crate) fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_slice(&[seed; 32]).expect("valid secp256k1 key")
}

/// `personal_sign` output of `key` over `message`.
pub(crate) fn sign_message(key: &SigningKey, message: &str) -> String {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(&personal_message_hash(message))
        .expect("signing succeeds");
    WalletSignature::from_parts(signature, recovery_id).to_hex()
}

pub(crate) fn amount(raw: &str) -> EduAmount {
    raw.parse().expect("valid amount")
}

pub(crate) fn scholarship(status: ScholarshipStatus, age_minutes: i64) -> Scholarship {
    Scholarship {
        id: ScholarshipId::random(),
        title: format!("Scholarship {age_minutes}"),
        description: "Tuition support".to_owned(),
        amount: amount("0.001"),
        status,
        recipient: None,
        created_at: epoch() - Duration::minutes(age_minutes),
        applicants: Vec::new(),
    }
}

pub(crate) fn application(
    scholarship_id: ScholarshipId,
    applicant: WalletAddress,
    status: ApplicationStatus,
    age_minutes: i64,
) -> Application {
    Application {
        id: ApplicationId::random(),
        scholarship_id,
        applicant_address: applicant,
        status,
        created_at: epoch() - Duration::minutes(age_minutes),
    }
}
