mod common;

use common::{TestSchool, d};
use gradeline::modules::AcademicSessionService;
use gradeline_core::ErrorKind;
use gradeline_models::{CreateAcademicSessionDto, PeriodStatus, TermName};

#[tokio::test]
async fn test_terms_hand_over_through_the_year() {
    let mut school = TestSchool::new(d(2024, 8, 1));
    let session = school.add_session(2024).await;

    let period = AcademicSessionService::current_period(&mut school.store, d(2024, 10, 1))
        .await
        .unwrap();
    let term = period.term.unwrap();
    assert_eq!(term.item.name, TermName::First);
    assert_eq!(term.status, PeriodStatus::Current);
    assert_eq!(period.session.unwrap().item.id, session.id);

    let period = AcademicSessionService::current_period(&mut school.store, d(2025, 2, 3))
        .await
        .unwrap();
    assert_eq!(period.term.unwrap().item.name, TermName::Second);
    assert_eq!(
        school
            .store
            .terms
            .iter()
            .filter(|t| t.is_current)
            .count(),
        1
    );

    let period = AcademicSessionService::current_period(&mut school.store, d(2025, 6, 1))
        .await
        .unwrap();
    assert_eq!(period.term.unwrap().item.name, TermName::Third);

    // Summer break after the only session: nothing is current.
    let period = AcademicSessionService::current_period(&mut school.store, d(2025, 8, 15))
        .await
        .unwrap();
    assert!(period.term.is_none());
    assert!(period.session.is_none());
}

#[tokio::test]
async fn test_pinned_term_survives_transitions() {
    let mut school = TestSchool::new(d(2024, 8, 1));
    let session = school.add_session(2024).await;
    let first = school
        .store
        .terms
        .iter()
        .find(|t| t.name == TermName::First)
        .unwrap()
        .id;

    let pinned = AcademicSessionService::set_current_term(&mut school.store, session.id, first)
        .await
        .unwrap();
    assert!(pinned.is_current && pinned.is_manual);

    let period = AcademicSessionService::current_period(&mut school.store, d(2025, 3, 1))
        .await
        .unwrap();
    assert_eq!(period.term.unwrap().item.name, TermName::First);
    assert!(!school.store.terms.iter().any(|t| t.name == TermName::Second && t.is_current));
}

#[tokio::test]
async fn test_next_session_takes_over() {
    let mut school = TestSchool::new(d(2024, 8, 1));
    let old = school.add_session(2024).await;
    let new = school.add_session(2025).await;

    AcademicSessionService::current_period(&mut school.store, d(2025, 5, 10))
        .await
        .unwrap();
    assert!(school.store.session(old.id).unwrap().is_current);

    let period = AcademicSessionService::current_period(&mut school.store, d(2025, 9, 10))
        .await
        .unwrap();
    assert_eq!(period.session.unwrap().item.id, new.id);
    assert!(!school.store.session(old.id).unwrap().is_current);
}

#[tokio::test]
async fn test_pinning_a_session_moves_the_flag() {
    let mut school = TestSchool::new(d(2024, 8, 1));
    let old = school.add_session(2023).await;
    let new = school.add_session(2024).await;

    AcademicSessionService::set_current_session(&mut school.store, old.id)
        .await
        .unwrap();
    AcademicSessionService::set_current_session(&mut school.store, new.id)
        .await
        .unwrap();

    let old_after = school.store.session(old.id).unwrap();
    assert!(!old_after.is_current && !old_after.is_manual);
    let new_after = school.store.session(new.id).unwrap();
    assert!(new_after.is_current && new_after.is_manual);
}

#[tokio::test]
async fn test_session_creation_rules() {
    let mut school = TestSchool::new(d(2024, 8, 1));
    school.add_session(2024).await;

    let overlapping = CreateAcademicSessionDto {
        name: "Overlap".to_string(),
        start_date: d(2025, 1, 10),
        end_date: d(2026, 6, 30),
        is_current: false,
    };
    let err = AcademicSessionService::create_academic_session(
        &mut school.store,
        overlapping,
        school.today,
    )
    .await
    .unwrap_err();
    assert!(err.is(ErrorKind::Conflict));

    let backwards = CreateAcademicSessionDto {
        name: "Backwards".to_string(),
        start_date: d(2027, 7, 1),
        end_date: d(2026, 9, 1),
        is_current: false,
    };
    let err = AcademicSessionService::create_academic_session(
        &mut school.store,
        backwards,
        school.today,
    )
    .await
    .unwrap_err();
    assert!(err.is(ErrorKind::Validation));

    assert_eq!(school.store.sessions.len(), 1);
    assert_eq!(school.store.terms.len(), 3);
}

#[tokio::test]
async fn test_delete_session_refused_with_scores() {
    let mut school = TestSchool::new(d(2024, 10, 1));
    let jss1 = school.add_class("JSS 1");
    let maths = school.add_subject("Mathematics");
    let busy = school.add_session(2024).await;
    let empty = school.add_session(2025).await;
    let ada = school.add_student("Ada", jss1);
    school.record(ada, maths, &busy, TermName::First, 66.0).await;

    let err = AcademicSessionService::delete_academic_session(&mut school.store, busy.id)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Conflict));

    AcademicSessionService::delete_academic_session(&mut school.store, empty.id)
        .await
        .unwrap();
    assert!(school.store.session(empty.id).is_none());
    assert!(school.store.terms.iter().all(|t| t.academic_session_id == busy.id));
}
