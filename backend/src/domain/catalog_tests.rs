//! Tests for the scholarship catalog service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{CatalogTab, MockApplicationRepository, MockScholarshipRepository};
use crate::domain::test_support::{address, application, epoch, fixed_clock, scholarship};
use crate::domain::{ApplicationStatus, Scholarship, ScholarshipDraft, ScholarshipStatus};

type Service = CatalogService<MockScholarshipRepository, MockApplicationRepository>;

fn government() -> WalletAddress {
    address(0x90)
}

fn service(scholarships: MockScholarshipRepository, applications: MockApplicationRepository) -> Service {
    let applications = Arc::new(applications);
    let board = Arc::new(ScholarshipBoard::new(
        Arc::new(scholarships),
        Arc::clone(&applications),
        fixed_clock(),
    ));
    CatalogService::new(board, applications, fixed_clock(), government())
}

fn listing(items: Vec<Scholarship>) -> MockScholarshipRepository {
    let mut repo = MockScholarshipRepository::new();
    repo.expect_list().returning(move || Ok(items.clone()));
    repo
}

fn title(err: &Error) -> Option<&str> {
    err.details()
        .and_then(|d| d.get("title"))
        .and_then(|t| t.as_str())
}

fn created(request: &NewApplication) -> ApplyOutcome {
    ApplyOutcome::Created(request.clone().into_application())
}

#[rstest]
#[case(CatalogTab::Active, None, 2)]
#[case(CatalogTab::All, None, 5)]
#[case(CatalogTab::Completed, None, 1)]
#[case(CatalogTab::All, Some("robotics"), 1)]
#[case(CatalogTab::Active, Some("ROBOTICS"), 1)]
#[case(CatalogTab::Completed, Some("robotics"), 0)]
#[tokio::test]
async fn browse_filters_by_tab_and_search(
    #[case] tab: CatalogTab,
    #[case] search: Option<&str>,
    #[case] expected: usize,
) {
    let mut robotics = scholarship(ScholarshipStatus::Pending, 1);
    robotics.description = "Robotics club funding".to_owned();
    let items = vec![
        robotics,
        scholarship(ScholarshipStatus::Pending, 2),
        scholarship(ScholarshipStatus::Approved, 3),
        scholarship(ScholarshipStatus::Completed, 4),
        scholarship(ScholarshipStatus::Rejected, 5),
    ];

    let view = service(listing(items), MockApplicationRepository::new())
        .browse(BrowseRequest {
            address: None,
            search: search.map(str::to_owned),
            tab,
        })
        .await
        .expect("browse succeeds");

    assert_eq!(view.entries.len(), expected);
    assert!(!view.can_create);
}

#[rstest]
#[tokio::test]
async fn browse_badges_reflect_applied_cache() {
    let student = address(1);
    let applied = scholarship(ScholarshipStatus::Pending, 1);
    let open = scholarship(ScholarshipStatus::Pending, 2);
    let approved = scholarship(ScholarshipStatus::Approved, 3);
    let completed = scholarship(ScholarshipStatus::Completed, 4);
    let rejected = scholarship(ScholarshipStatus::Rejected, 5);
    let history = vec![application(
        applied.id,
        student.clone(),
        ApplicationStatus::Pending,
        1,
    )];
    let mut applications = MockApplicationRepository::new();
    applications
        .expect_list_for_applicant()
        .return_once(move |_| Ok(history));

    let view = service(
        listing(vec![applied, open, approved, completed, rejected]),
        applications,
    )
    .browse(BrowseRequest {
        address: Some(student),
        search: None,
        tab: CatalogTab::All,
    })
    .await
    .expect("browse succeeds");

    let badges: Vec<_> = view.entries.iter().map(|e| e.badge).collect();
    assert_eq!(
        badges,
        vec![
            ActionBadge::ApplicationSubmitted,
            ActionBadge::Apply,
            ActionBadge::AwaitingFunding,
            ActionBadge::Funded,
            ActionBadge::Rejected,
        ]
    );
}

#[rstest]
#[tokio::test]
async fn only_government_can_create() {
    let mut applications = MockApplicationRepository::new();
    applications
        .expect_list_for_applicant()
        .returning(|_| Ok(Vec::new()));
    let service = service(listing(Vec::new()), applications);

    let view = service
        .browse(BrowseRequest {
            address: Some(government()),
            ..BrowseRequest::default()
        })
        .await
        .expect("browse succeeds");
    assert!(view.can_create);

    let err = service
        .create(CreateScholarshipRequest {
            address: Some(address(2)),
            draft: ScholarshipDraft {
                title: "Arts".to_owned(),
                description: String::new(),
                amount: "1".parse().expect("valid amount"),
            },
        })
        .await
        .expect_err("student cannot create");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn government_creates_scholarship() {
    let mut scholarships = listing(Vec::new());
    scholarships
        .expect_insert()
        .withf(|s| s.created_at == epoch() && s.title == "Arts Grant")
        .times(1)
        .return_once(|_| Ok(()));

    let response = service(scholarships, MockApplicationRepository::new())
        .create(CreateScholarshipRequest {
            address: Some(government()),
            draft: ScholarshipDraft {
                title: "Arts Grant".to_owned(),
                description: "Studio fees".to_owned(),
                amount: "0.25".parse().expect("valid amount"),
            },
        })
        .await
        .expect("create succeeds");

    assert_eq!(response.scholarship.status, ScholarshipStatus::Pending);
    assert_eq!(response.notification.title, "Scholarship created");
}

#[rstest]
#[tokio::test]
async fn apply_requires_connected_wallet() {
    let mut applications = MockApplicationRepository::new();
    applications.expect_submit().times(0);

    let err = service(MockScholarshipRepository::new(), applications)
        .apply(ApplyRequest {
            address: None,
            scholarship_id: ScholarshipId::random(),
        })
        .await
        .expect_err("no wallet");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(title(&err), Some("Wallet not connected"));
}

#[rstest]
#[tokio::test]
async fn second_apply_is_rejected_locally() {
    let student = address(3);
    let target = ScholarshipId::random();
    let mut applications = MockApplicationRepository::new();
    applications
        .expect_submit()
        .times(1)
        .returning(|request| Ok(created(request)));
    let service = service(listing(Vec::new()), applications);
    let request = ApplyRequest {
        address: Some(student.clone()),
        scholarship_id: target,
    };

    let first = service.apply(request.clone()).await.expect("first apply");
    assert_eq!(first.title, "Application submitted");

    let err = service.apply(request).await.expect_err("second apply");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(title(&err), Some("Already applied"));
    assert_eq!(service.applied_for(&student).len(), 1);
}

#[rstest]
#[tokio::test]
async fn existing_application_counts_as_success() {
    let student = address(4);
    let target = ScholarshipId::random();
    let mut applications = MockApplicationRepository::new();
    applications
        .expect_submit()
        .times(1)
        .return_once(|_| Ok(ApplyOutcome::AlreadyApplied));
    let service = service(MockScholarshipRepository::new(), applications);

    let notification = service
        .apply(ApplyRequest {
            address: Some(student.clone()),
            scholarship_id: target,
        })
        .await
        .expect("already applied is not an error");
    assert_eq!(notification.title, "Already applied");
    assert_eq!(notification.tone, crate::domain::NotificationTone::Default);
    assert!(service.has_applied(&student, &target));
}

#[rstest]
#[tokio::test]
async fn refused_application_is_invalid_request() {
    let mut applications = MockApplicationRepository::new();
    applications.expect_submit().return_once(|_| {
        Ok(ApplyOutcome::Refused {
            reason: "scholarship is no longer accepting applications".to_owned(),
        })
    });

    let err = service(MockScholarshipRepository::new(), applications)
        .apply(ApplyRequest {
            address: Some(address(5)),
            scholarship_id: ScholarshipId::random(),
        })
        .await
        .expect_err("refused");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.message(),
        "scholarship is no longer accepting applications"
    );
}

#[rstest]
#[tokio::test]
async fn strict_policy_surfaces_unexpected_errors() {
    let student = address(6);
    let target = ScholarshipId::random();
    let mut applications = MockApplicationRepository::new();
    applications
        .expect_submit()
        .times(2)
        .returning(|_| Err(ApplicationRepositoryError::connection("pool exhausted")));
    let service = service(MockScholarshipRepository::new(), applications);
    let request = ApplyRequest {
        address: Some(student.clone()),
        scholarship_id: target,
    };

    for _ in 0..2 {
        let err = service.apply(request.clone()).await.expect_err("failure");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
    assert!(!service.has_applied(&student, &target));
}

#[rstest]
#[tokio::test]
async fn optimistic_policy_records_application_locally() {
    let student = address(7);
    let target = ScholarshipId::random();
    let mut applications = MockApplicationRepository::new();
    applications
        .expect_submit()
        .times(1)
        .returning(|_| Err(ApplicationRepositoryError::query("deadlock detected")));
    let service =
        service(MockScholarshipRepository::new(), applications).with_policy(ApplyPolicy::Optimistic);
    let request = ApplyRequest {
        address: Some(student.clone()),
        scholarship_id: target,
    };

    let notification = service
        .apply(request.clone())
        .await
        .expect("optimistic success");
    assert_eq!(notification.title, "Application processed");
    assert!(service.has_applied(&student, &target));

    let err = service.apply(request).await.expect_err("cached");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn applied_cache_stays_bounded_across_wallets() {
    let target = ScholarshipId::random();
    let mut applications = MockApplicationRepository::new();
    applications
        .expect_list_for_applicant()
        .returning(move |who| {
            Ok(vec![application(
                target,
                who.clone(),
                ApplicationStatus::Pending,
                1,
            )])
        });
    let service = service(listing(Vec::new()), applications)
        .with_cache_capacity(NonZeroUsize::new(2).expect("non-zero"));

    for seed in 10..20 {
        service
            .browse(BrowseRequest {
                address: Some(address(seed)),
                search: None,
                tab: CatalogTab::All,
            })
            .await
            .expect("browse");
    }

    assert_eq!(service.applied.len(), 2);
    assert!(service.has_applied(&address(19), &target));
    assert!(!service.has_applied(&address(10), &target));
}

#[rstest]
#[tokio::test]
async fn missing_scholarship_is_never_swallowed() {
    let mut applications = MockApplicationRepository::new();
    applications
        .expect_submit()
        .return_once(|request| {
            Err(ApplicationRepositoryError::not_found(
                request.scholarship_id.to_string(),
            ))
        });
    let service =
        service(MockScholarshipRepository::new(), applications).with_policy(ApplyPolicy::Optimistic);

    let err = service
        .apply(ApplyRequest {
            address: Some(address(8)),
            scholarship_id: ScholarshipId::random(),
        })
        .await
        .expect_err("not found");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
