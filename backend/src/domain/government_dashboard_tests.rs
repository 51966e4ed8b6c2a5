//! Tests for the government review dashboard service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    ApplicationRepositoryError, ApproveOutcome, MockApplicationRepository,
    MockScholarshipRepository,
};
use crate::domain::test_support::{address, application, fixed_clock, scholarship};

type Service = GovernmentDashboardService<MockScholarshipRepository, MockApplicationRepository>;

fn service(scholarships: MockScholarshipRepository, applications: MockApplicationRepository) -> Service {
    let applications = Arc::new(applications);
    let board = Arc::new(ScholarshipBoard::new(
        Arc::new(scholarships),
        Arc::clone(&applications),
        fixed_clock(),
    ));
    GovernmentDashboardService::new(board, applications)
}

fn listing(items: Vec<crate::domain::Scholarship>) -> MockScholarshipRepository {
    let mut repo = MockScholarshipRepository::new();
    repo.expect_list().returning(move || Ok(items.clone()));
    repo
}

#[rstest]
#[tokio::test]
async fn overview_lists_pending_with_applicants() {
    let mut reviewed = scholarship(ScholarshipStatus::Pending, 1);
    reviewed.applicants.push(address(1));
    let empty = scholarship(ScholarshipStatus::Pending, 2);
    let approved = scholarship(ScholarshipStatus::Approved, 3);
    let completed = scholarship(ScholarshipStatus::Completed, 4);
    let rejected = scholarship(ScholarshipStatus::Rejected, 5);

    let overview = service(
        listing(vec![reviewed.clone(), empty, approved, completed, rejected]),
        MockApplicationRepository::new(),
    )
    .overview()
    .await
    .expect("overview succeeds");

    assert_eq!(overview.pending, vec![reviewed]);
    assert_eq!(overview.total, 5);
    assert_eq!(overview.approved, 2);
    assert!(overview.selected.is_none());
}

#[rstest]
#[tokio::test]
async fn toggle_filters_all_applications_client_side() {
    let target = scholarship(ScholarshipStatus::Pending, 1);
    let target_id = target.id;
    let later = application(target_id, address(1), ApplicationStatus::Pending, 1);
    let earlier = application(target_id, address(2), ApplicationStatus::Pending, 9);
    let approved = application(target_id, address(3), ApplicationStatus::Approved, 5);
    let elsewhere = application(
        crate::domain::ScholarshipId::random(),
        address(4),
        ApplicationStatus::Pending,
        3,
    );
    let all = vec![later.clone(), approved, elsewhere, earlier.clone()];

    let mut applications = MockApplicationRepository::new();
    applications
        .expect_list_all()
        .times(2)
        .returning(move || Ok(all.clone()));
    applications.expect_find().times(0);
    let service = service(listing(vec![target]), applications);

    let opened = service
        .toggle_applicants(target_id)
        .await
        .expect("expand succeeds");
    assert_eq!(opened.selected, Some(target_id));
    let ids: Vec<_> = opened.applicants.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![earlier.id, later.id]);

    let closed = service
        .toggle_applicants(target_id)
        .await
        .expect("collapse succeeds");
    assert!(closed.selected.is_none());
    assert!(closed.applicants.is_empty());

    let reopened = service
        .toggle_applicants(target_id)
        .await
        .expect("expand again refetches");
    assert_eq!(reopened.applicants.len(), 2);
}

#[rstest]
#[tokio::test]
async fn toggle_failure_clears_list_and_keeps_selection() {
    let first = scholarship(ScholarshipStatus::Pending, 1);
    let second = scholarship(ScholarshipStatus::Pending, 2);
    let first_id = first.id;
    let pending = application(first_id, address(1), ApplicationStatus::Pending, 1);

    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut applications = MockApplicationRepository::new();
    applications.expect_list_all().returning(move || {
        if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
            Ok(vec![pending.clone()])
        } else {
            Err(ApplicationRepositoryError::connection("reset by peer"))
        }
    });
    let service = service(listing(vec![first, second.clone()]), applications);

    service
        .toggle_applicants(first_id)
        .await
        .expect("first expand succeeds");
    let err = service
        .toggle_applicants(second.id)
        .await
        .expect_err("second expand fails");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(
        err.details().and_then(|d| d.get("title")).and_then(|t| t.as_str()),
        Some("Error loading applicants")
    );

    let overview = service.overview().await.expect("overview succeeds");
    assert_eq!(overview.selected, Some(first_id));
    assert!(overview.applicants.is_empty());
}

#[rstest]
#[tokio::test]
async fn approve_delegates_to_board() {
    let pending = scholarship(ScholarshipStatus::Pending, 1);
    let scholarship_id = pending.id;
    let applicant = address(5);
    let chosen = application(scholarship_id, applicant.clone(), ApplicationStatus::Approved, 1);

    let mut applications = MockApplicationRepository::new();
    applications
        .expect_approve()
        .times(1)
        .return_once(move |_, _| Ok(ApproveOutcome::Approved(chosen)));

    let notification = service(listing(vec![pending]), applications)
        .approve(ApproveApplicantRequest {
            scholarship_id,
            applicant_address: applicant,
        })
        .await
        .expect("approve succeeds");
    assert_eq!(notification.title, "Scholarship approved");
}

#[rstest]
#[tokio::test]
async fn approve_failure_carries_notification_title() {
    let mut applications = MockApplicationRepository::new();
    applications
        .expect_approve()
        .return_once(|id, _| Err(ApplicationRepositoryError::not_found(id.to_string())));

    let err = service(MockScholarshipRepository::new(), applications)
        .approve(ApproveApplicantRequest {
            scholarship_id: crate::domain::ScholarshipId::random(),
            applicant_address: address(6),
        })
        .await
        .expect_err("missing scholarship");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(
        err.details().and_then(|d| d.get("title")).and_then(|t| t.as_str()),
        Some("Error approving applicant")
    );
}
