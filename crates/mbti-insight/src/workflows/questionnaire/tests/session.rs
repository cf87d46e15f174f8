use super::common::*;
use crate::workflows::questionnaire::{
    MbtiResult, QuestionCatalog, SessionError, SessionStep, TestSession, Variant,
};

#[test]
fn session_starts_with_empty_answers() {
    let session = TestSession::start(&catalog(), Variant::Standard).expect("session starts");

    assert_eq!(session.variant(), Variant::Standard);
    assert_eq!(session.answers().len(), 12);
    assert!(session.answers().iter().all(Option::is_none));

    let progress = session.progress();
    assert_eq!((progress.position, progress.total), (1, 12));
    assert!(progress.is_first);
    assert!(!progress.is_last);
}

#[test]
fn walking_the_short_variant_reaches_enfp() {
    let mut session = TestSession::start(&catalog(), Variant::Short).expect("session starts");

    loop {
        session.record(5).expect("valid answer");
        match session.advance() {
            SessionStep::Question(progress) => assert!(progress.position <= 8),
            SessionStep::Complete => break,
        }
    }

    assert!(session.progress().is_last);
    assert_eq!(session.progress().answered, 8);
    assert_eq!(session.finish().to_string(), "ENFP");
}

#[test]
fn invalid_answers_are_refused_and_previous_value_kept() {
    let mut session = TestSession::start(&catalog(), Variant::Short).expect("session starts");
    session.record(4).expect("valid answer");

    assert_eq!(session.record(7), Err(SessionError::AnswerOutOfRange(7)));
    assert_eq!(session.record(0), Err(SessionError::AnswerOutOfRange(0)));
    assert_eq!(session.current_answer(), Some(4));
}

#[test]
fn retreat_clamps_at_first_question_and_keeps_answers() {
    let mut session = TestSession::start(&catalog(), Variant::Short).expect("session starts");

    let progress = session.retreat();
    assert_eq!(progress.position, 1);

    session.record(2).expect("valid answer");
    session.advance();
    session.record(5).expect("valid answer");
    session.retreat();

    assert_eq!(session.current_answer(), Some(2));
    assert_eq!(session.current(), &short_questions()[0]);
}

#[test]
fn unanswered_session_still_scores() {
    let session = TestSession::start(&catalog(), Variant::Extended).expect("session starts");
    assert_eq!(session.finish().to_string(), "INFP");
}

#[test]
fn missing_variant_is_reported() {
    let catalog = QuestionCatalog::from_json(
        r#"{ "short": [ { "text": "q", "dimension": "E/I", "direction": 1 } ] }"#,
    )
    .expect("partial catalog parses");

    assert_eq!(
        TestSession::start(&catalog, Variant::Extended),
        Err(SessionError::VariantUnavailable(Variant::Extended))
    );
}

#[test]
fn sessions_are_independent() {
    let catalog = catalog();
    let mut first = TestSession::start(&catalog, Variant::Short).expect("session starts");
    let second = TestSession::start(&catalog, Variant::Short).expect("session starts");

    first.record(5).expect("valid answer");

    assert_eq!(second.current_answer(), None);
    assert_ne!(first.finish(), MbtiResult::Unknown);
}
