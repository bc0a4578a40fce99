use std::num::NonZeroUsize;

use hooks_core::model::{ProgressUpdate, QuestionId, QuizQuestion, TopicCatalog, TopicId};
use hooks_core::quiz::{QuizSession, QuizStep};
use hooks_core::time::fixed_clock;
use services::LearningHub;

fn question(id: &str, correct: usize) -> QuizQuestion {
    QuizQuestion::new(
        QuestionId::new(id).unwrap(),
        format!("Question {id}"),
        vec!["first".into(), "second".into(), "third".into()],
        correct,
        "See the docs.",
    )
    .unwrap()
}

fn quiz() -> QuizSession {
    QuizSession::new(vec![question("q1", 1), question("q2", 2), question("q3", 0)])
}

async fn hub() -> LearningHub {
    LearningHub::in_memory(
        fixed_clock(),
        TopicCatalog::with_count(NonZeroUsize::new(16).unwrap()),
    )
    .await
}

async fn answer_all(
    hub: &mut LearningHub,
    topic: &TopicId,
    quiz: &mut QuizSession,
    answers: [usize; 3],
) -> QuizStep {
    for (idx, option) in answers.into_iter().enumerate() {
        quiz.select_answer(idx, option).unwrap();
        let step = hub.advance_quiz(topic, quiz).await;
        if idx + 1 < answers.len() {
            assert_eq!(step, QuizStep::Next(idx + 1));
        } else {
            return step;
        }
    }
    unreachable!("quiz has three questions")
}

#[tokio::test]
async fn passing_quiz_completes_topic() {
    let mut hub = hub().await;
    let t = TopicId::new("use-callback").unwrap();
    let mut session = quiz();

    let step = answer_all(&mut hub, &t, &mut session, [1, 2, 0]).await;
    assert_eq!(step, QuizStep::Finished { score: 100 });
    assert!(hub.progress().topic(&t).unwrap().completed());
}

#[tokio::test]
async fn two_of_three_is_not_enough() {
    let mut hub = hub().await;
    let t = TopicId::new("use-callback").unwrap();
    let mut session = quiz();

    let step = answer_all(&mut hub, &t, &mut session, [1, 2, 1]).await;
    assert_eq!(step, QuizStep::Finished { score: 67 });
    assert!(hub.progress().topic(&t).is_none());

    // Retake after reviewing the breakdown.
    let wrong: Vec<_> = session
        .breakdown()
        .into_iter()
        .filter(|line| !line.is_correct)
        .map(|line| line.question_id)
        .collect();
    assert_eq!(wrong, vec![QuestionId::new("q3").unwrap()]);

    session.reset();
    let step = answer_all(&mut hub, &t, &mut session, [1, 2, 0]).await;
    assert_eq!(step, QuizStep::Finished { score: 100 });
    assert!(hub.progress().topic(&t).unwrap().completed());
}

#[tokio::test]
async fn going_back_keeps_answers() {
    let mut hub = hub().await;
    let t = TopicId::new("use-id").unwrap();
    let mut session = quiz();

    assert_eq!(session.retreat(), 0);
    session.select_answer(0, 1).unwrap();
    assert_eq!(hub.advance_quiz(&t, &mut session).await, QuizStep::Next(1));
    assert_eq!(session.retreat(), 0);
    session.select_answer(0, 2).unwrap();
    assert_eq!(session.selections(), &[Some(2), None, None]);
    assert!(!session.is_finished());
}

#[tokio::test]
async fn finished_quiz_reports_once() {
    let mut hub = hub().await;
    let t = TopicId::new("use-layout-effect").unwrap();
    let mut session = quiz();
    answer_all(&mut hub, &t, &mut session, [1, 2, 0]).await;

    // Learner manually un-completes; re-advancing a finished quiz must not re-complete.
    hub.progress_mut()
        .update_progress(&t, ProgressUpdate::new().completed(false))
        .await;
    assert_eq!(
        hub.advance_quiz(&t, &mut session).await,
        QuizStep::Finished { score: 100 }
    );
    assert!(!hub.progress().topic(&t).unwrap().completed());
}

#[tokio::test]
async fn empty_quiz_scores_zero() {
    let mut hub = hub().await;
    let t = TopicId::new("use-debug-value").unwrap();
    let mut session = QuizSession::new(Vec::<QuizQuestion>::new());
    assert!(session.is_finished());
    assert_eq!(
        hub.advance_quiz(&t, &mut session).await,
        QuizStep::Finished { score: 0 }
    );
    assert!(hub.progress().topic(&t).is_none());
}
