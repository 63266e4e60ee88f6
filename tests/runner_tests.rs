// tests/runner_tests.rs

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::backend::{BackendError, QuizBackend};
use quiz_core::config::Config;
use quiz_core::models::attempt::{NO_ANSWER, QuizAttempt};
use quiz_core::models::explanation::ExplanationPayload;
use quiz_core::models::question::{GeneratedQuiz, Question};
use quiz_core::models::submission::{SubmissionResult, SubmissionType, SubmitRequest};
use quiz_core::runner::{ActivePhase, Direction, Notice, QuizRunner, RunnerState};

/// Scripted backend for driving the runner without a network.
#[derive(Default)]
struct MockBackend {
    fail_generate: AtomicBool,
    fail_submit: AtomicBool,
    fail_tracking: AtomicBool,
    submit_delay: Mutex<Option<Duration>>,
    submits: Mutex<Vec<(String, SubmitRequest)>>,
    tracked: Mutex<Vec<usize>>,
}

impl MockBackend {
    fn submitted(&self) -> Vec<(String, SubmitRequest)> {
        self.submits.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuizBackend for MockBackend {
    async fn generate(
        &self,
        _session_id: &str,
        question_count: usize,
    ) -> Result<GeneratedQuiz, BackendError> {
        if self.fail_generate.load(Ordering::SeqCst) {
            return Err(BackendError("generate unavailable".to_string()));
        }
        Ok(GeneratedQuiz {
            quiz_id: format!("quiz-{}", &uuid::Uuid::new_v4().to_string()[..8]),
            questions: (0..question_count)
                .map(|i| Question {
                    prompt: format!("Question {}", i),
                    options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                })
                .collect(),
            total_questions: question_count,
            time_limit_per_question: None,
            total_time_limit: None,
        })
    }

    async fn submit(
        &self,
        quiz_id: &str,
        request: SubmitRequest,
    ) -> Result<SubmissionResult, BackendError> {
        let delay = *self.submit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.submits
            .lock()
            .unwrap()
            .push((quiz_id.to_string(), request.clone()));
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(BackendError("submit unavailable".to_string()));
        }
        Ok(SubmissionResult {
            score: 3,
            total_questions: request.answers.len(),
            percentage: 60.0,
            breakdown: vec![],
            submission_type: if request.is_auto_submit {
                SubmissionType::Auto
            } else {
                SubmissionType::Manual
            },
        })
    }

    async fn track_question_time(
        &self,
        _quiz_id: &str,
        question_index: usize,
    ) -> Result<(), BackendError> {
        if self.fail_tracking.load(Ordering::SeqCst) {
            return Err(BackendError("telemetry down".to_string()));
        }
        self.tracked.lock().unwrap().push(question_index);
        Ok(())
    }

    async fn fetch_explanation(&self, _q: &str) -> Result<ExplanationPayload, BackendError> {
        Err(BackendError("not exercised by runner tests".to_string()))
    }

    async fn followup_chat(&self, _c: &str, _q: &str) -> Result<String, BackendError> {
        Err(BackendError("not exercised by runner tests".to_string()))
    }
}

/// Lets spawned backend calls complete, then applies them.
async fn settle(runner: &mut QuizRunner) {
    tokio::time::sleep(Duration::from_millis(20)).await;
    runner.poll();
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

async fn started_runner(backend: Arc<MockBackend>, question_count: usize) -> QuizRunner {
    init_tracing();
    let mut runner = QuizRunner::new(backend, Config::default(), "session-1");
    runner.start(question_count).expect("start failed");
    assert!(matches!(runner.state(), RunnerState::Generating));
    settle(&mut runner).await;
    assert!(matches!(runner.state(), RunnerState::Active { .. }));
    runner
}

fn attempt(runner: &QuizRunner) -> &QuizAttempt {
    match runner.state() {
        RunnerState::Active { attempt, .. } => attempt,
        other => panic!("expected active state, got {:?}", other),
    }
}

fn phase(runner: &QuizRunner) -> &ActivePhase {
    match runner.state() {
        RunnerState::Active { phase, .. } => phase,
        other => panic!("expected active state, got {:?}", other),
    }
}

#[tokio::test]
async fn start_initializes_answers_to_unanswered() {
    let backend = Arc::new(MockBackend::default());
    let runner = started_runner(backend, 4).await;

    let attempt = attempt(&runner);
    assert_eq!(attempt.questions.len(), 4);
    assert_eq!(attempt.answers.len(), 4);
    assert!(attempt.answers.iter().all(|slot| slot.is_none()));
    assert_eq!(attempt.elapsed_secs, 0);
    assert_eq!(attempt.total_limit_secs, 4 * 180);
    assert!(attempt.extension_granted.is_empty());
}

#[tokio::test]
async fn generation_failure_returns_to_idle() {
    let backend = Arc::new(MockBackend::default());
    backend.fail_generate.store(true, Ordering::SeqCst);

    let mut runner = QuizRunner::new(backend, Config::default(), "session-1");
    runner.start(5).expect("start failed");
    settle(&mut runner).await;

    assert!(matches!(runner.state(), RunnerState::Idle));
    let notices = runner.take_notices();
    assert!(matches!(notices.as_slice(), [Notice::GenerationFailed(_)]));
}

#[tokio::test]
async fn start_requires_idle() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = started_runner(backend, 3).await;

    assert!(runner.start(3).is_err());
}

#[tokio::test]
async fn zero_question_count_is_rejected() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = QuizRunner::new(backend, Config::default(), "session-1");

    assert!(runner.start(0).is_err());
    assert!(matches!(runner.state(), RunnerState::Idle));
}

#[tokio::test]
async fn select_answer_overwrites_without_advancing() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = started_runner(backend, 3).await;

    runner.select_answer(1).unwrap();
    runner.select_answer(3).unwrap();

    let attempt = attempt(&runner);
    assert_eq!(attempt.answers[0], Some(3));
    assert_eq!(attempt.current_index, 0);

    // indices outside the option range are rejected
    assert!(runner.select_answer(4).is_err());
}

#[tokio::test]
async fn navigate_clamps_at_both_ends() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = started_runner(backend, 2).await;

    runner.navigate(Direction::Prev).unwrap();
    assert_eq!(attempt(&runner).current_index, 0);

    runner.navigate(Direction::Next).unwrap();
    assert_eq!(attempt(&runner).current_index, 1);

    runner.navigate(Direction::Next).unwrap();
    assert_eq!(attempt(&runner).current_index, 1);
}

// Scenario from the 5-question default budget: warning at 840 exactly
// once, auto-submission at 900 with the sentinel in unanswered slots.
#[tokio::test]
async fn total_budget_warning_and_auto_submit() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = started_runner(Arc::clone(&backend), 5).await;

    assert_eq!(attempt(&runner).total_limit_secs, 900);
    runner.select_answer(2).unwrap();

    let mut warnings = 0;
    for _ in 0..899 {
        runner.tick();
        warnings += runner
            .take_notices()
            .iter()
            .filter(|n| matches!(n, Notice::OneMinuteWarning))
            .count();
    }
    assert_eq!(warnings, 1);
    assert_eq!(attempt(&runner).elapsed_secs, 899);
    assert!(attempt(&runner).warning_fired);
    assert!(!attempt(&runner).auto_submit_triggered);

    // the 900th tick exhausts the budget
    runner.tick();
    assert!(matches!(
        runner.state(),
        RunnerState::Submitting {
            kind: SubmissionType::Auto,
            ..
        }
    ));

    settle(&mut runner).await;
    assert!(matches!(runner.state(), RunnerState::Completed { .. }));

    let submits = backend.submitted();
    assert_eq!(submits.len(), 1);
    let request = &submits[0].1;
    assert!(request.is_auto_submit);
    assert_eq!(request.time_spent_secs, 900);
    assert_eq!(request.answers[0], Some(2));
    // no slot is null on the auto path: each either carries a real
    // pick, the first-option fill from a per-question timeout, or the
    // sentinel
    assert!(
        request
            .answers
            .iter()
            .all(|slot| matches!(slot, Some(i) if *i >= 0 || *i == NO_ANSWER))
    );
    assert!(request.answers.contains(&Some(NO_ANSWER)));
}

#[tokio::test]
async fn ticks_are_ignored_once_budget_is_exhausted() {
    let backend = Arc::new(MockBackend::default());
    backend.fail_submit.store(true, Ordering::SeqCst);
    let mut runner = started_runner(backend, 1).await;

    for _ in 0..180 {
        runner.tick();
    }
    settle(&mut runner).await;

    // auto-submit failed: back to active, ticking NOT resumed
    assert!(matches!(phase(&runner), ActivePhase::Expired));
    assert!(attempt(&runner).auto_submit_triggered);
    let notices = runner.take_notices();
    assert!(
        notices
            .iter()
            .any(|n| matches!(n, Notice::SubmitFailed { auto: true, .. }))
    );

    let elapsed = attempt(&runner).elapsed_secs;
    runner.tick();
    runner.tick();
    assert_eq!(attempt(&runner).elapsed_secs, elapsed);
}

#[tokio::test]
async fn per_question_timeout_fills_first_option_and_advances() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = started_runner(backend, 3).await;

    for _ in 0..180 {
        runner.tick();
    }

    // slot filled with option 0, cursor still on the question
    let attempt_ref = attempt(&runner);
    assert_eq!(attempt_ref.answers[0], Some(0));
    assert_eq!(attempt_ref.current_index, 0);
    assert!(
        runner
            .take_notices()
            .contains(&Notice::QuestionAutoFilled { index: 0 })
    );

    // cursor advances after the short fixed delay
    runner.tick();
    runner.tick();
    let attempt_ref = attempt(&runner);
    assert_eq!(attempt_ref.current_index, 1);
    assert_eq!(attempt_ref.seconds_on_question, 0);

    // a single question's timer never submits the whole quiz
    assert!(matches!(runner.state(), RunnerState::Active { .. }));
}

#[tokio::test]
async fn per_question_timeout_keeps_existing_answer() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = started_runner(backend, 2).await;

    runner.select_answer(3).unwrap();
    for _ in 0..182 {
        runner.tick();
    }

    let attempt_ref = attempt(&runner);
    assert_eq!(attempt_ref.answers[0], Some(3));
    assert_eq!(attempt_ref.current_index, 1);
}

#[tokio::test]
async fn per_question_timeout_does_not_advance_past_last_question() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = started_runner(backend, 2).await;

    runner.navigate(Direction::Next).unwrap();
    for _ in 0..185 {
        runner.tick();
    }

    let attempt_ref = attempt(&runner);
    assert_eq!(attempt_ref.answers[1], Some(0));
    assert_eq!(attempt_ref.current_index, 1);
}

#[tokio::test]
async fn extension_applies_once_per_question() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = started_runner(backend, 5).await;

    runner.extend_question_time(120).unwrap();
    assert_eq!(attempt(&runner).total_limit_secs, 900 + 120);

    // second grant for the same index is a no-op, not an error
    runner.extend_question_time(120).unwrap();
    assert_eq!(attempt(&runner).total_limit_secs, 900 + 120);

    // a different question gets its own grant
    runner.navigate(Direction::Next).unwrap();
    runner.extend_question_time(60).unwrap();
    assert_eq!(attempt(&runner).total_limit_secs, 900 + 120 + 60);
}

#[tokio::test]
async fn submit_with_everything_answered_skips_confirmation() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = started_runner(Arc::clone(&backend), 3).await;

    for i in 0..3 {
        runner.select_answer(i).unwrap();
        if i < 2 {
            runner.navigate(Direction::Next).unwrap();
        }
    }

    runner.initiate_submit().unwrap();
    assert!(matches!(
        runner.state(),
        RunnerState::Submitting {
            kind: SubmissionType::Manual,
            ..
        }
    ));

    settle(&mut runner).await;
    assert!(matches!(runner.state(), RunnerState::Completed { .. }));

    let submits = backend.submitted();
    assert_eq!(submits.len(), 1);
    let request = &submits[0].1;
    assert!(!request.is_auto_submit);
    assert_eq!(request.answers, vec![Some(0), Some(1), Some(2)]);
}

#[tokio::test]
async fn confirm_flow_exposes_unanswered_count() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = started_runner(Arc::clone(&backend), 5).await;

    // answer 3 of 5
    for _ in 0..3 {
        runner.select_answer(0).unwrap();
        runner.navigate(Direction::Next).unwrap();
    }

    runner.initiate_submit().unwrap();
    assert!(matches!(
        phase(&runner),
        ActivePhase::Confirming { unanswered: 2 }
    ));

    // ticking is suspended while the dialog is up
    let elapsed = attempt(&runner).elapsed_secs;
    runner.tick();
    assert_eq!(attempt(&runner).elapsed_secs, elapsed);

    // intents are rejected while confirming
    assert!(runner.select_answer(0).is_err());
    assert!(runner.navigate(Direction::Prev).is_err());
    assert!(runner.initiate_submit().is_err());

    // cancel returns to plain active with answers intact
    runner.cancel_submit().unwrap();
    assert!(matches!(phase(&runner), ActivePhase::Ticking));
    assert_eq!(attempt(&runner).answers[..3], [Some(0), Some(0), Some(0)]);
    runner.tick();
    assert_eq!(attempt(&runner).elapsed_secs, elapsed + 1);

    // confirm sends the answers array unmodified: nulls stay null
    runner.initiate_submit().unwrap();
    runner.confirm_submit().unwrap();
    settle(&mut runner).await;
    assert!(matches!(runner.state(), RunnerState::Completed { .. }));

    let submits = backend.submitted();
    assert_eq!(submits.len(), 1);
    let request = &submits[0].1;
    assert!(!request.is_auto_submit);
    assert_eq!(
        request.answers,
        vec![Some(0), Some(0), Some(0), None, None]
    );
    assert!(!request.answers.contains(&Some(NO_ANSWER)));
}

#[tokio::test]
async fn manual_submit_failure_resumes_ticking() {
    let backend = Arc::new(MockBackend::default());
    backend.fail_submit.store(true, Ordering::SeqCst);
    let mut runner = started_runner(backend, 2).await;

    runner.select_answer(1).unwrap();
    runner.navigate(Direction::Next).unwrap();
    runner.select_answer(2).unwrap();

    runner.tick();
    runner.initiate_submit().unwrap();
    settle(&mut runner).await;

    // back to active, ticking resumed, answers preserved
    assert!(matches!(phase(&runner), ActivePhase::Ticking));
    assert_eq!(attempt(&runner).answers, vec![Some(1), Some(2)]);
    let notices = runner.take_notices();
    assert!(
        notices
            .iter()
            .any(|n| matches!(n, Notice::SubmitFailed { auto: false, .. }))
    );

    runner.tick();
    assert_eq!(attempt(&runner).elapsed_secs, 2);
}

#[tokio::test]
async fn intents_are_rejected_while_submitting() {
    let backend = Arc::new(MockBackend::default());
    *backend.submit_delay.lock().unwrap() = Some(Duration::from_millis(200));
    let mut runner = started_runner(backend, 1).await;

    runner.select_answer(0).unwrap();
    runner.initiate_submit().unwrap();
    assert!(matches!(runner.state(), RunnerState::Submitting { .. }));

    assert!(runner.select_answer(1).is_err());
    assert!(runner.navigate(Direction::Next).is_err());
    assert!(runner.initiate_submit().is_err());
    runner.tick(); // ignored
    runner.poll();
    assert!(matches!(runner.state(), RunnerState::Submitting { .. }));

    tokio::time::sleep(Duration::from_millis(300)).await;
    runner.poll();
    assert!(matches!(runner.state(), RunnerState::Completed { .. }));
}

#[tokio::test]
async fn abandoning_discards_inflight_submission() {
    let backend = Arc::new(MockBackend::default());
    *backend.submit_delay.lock().unwrap() = Some(Duration::from_millis(50));
    let mut runner = started_runner(Arc::clone(&backend), 1).await;

    runner.select_answer(0).unwrap();
    runner.initiate_submit().unwrap();
    runner.abandon();
    assert!(matches!(runner.state(), RunnerState::Idle));

    // the late completion must not resurrect the torn-down attempt
    tokio::time::sleep(Duration::from_millis(150)).await;
    runner.poll();
    assert!(matches!(runner.state(), RunnerState::Idle));
    assert!(runner.take_notices().is_empty());
    assert_eq!(backend.submitted().len(), 1); // call itself was not cancelled
}

#[tokio::test]
async fn retry_resets_completed_attempt() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = started_runner(backend, 1).await;

    runner.select_answer(0).unwrap();
    runner.initiate_submit().unwrap();
    settle(&mut runner).await;
    assert!(matches!(runner.state(), RunnerState::Completed { .. }));

    runner.retry().unwrap();
    assert!(matches!(runner.state(), RunnerState::Idle));

    // a fresh start works after retry
    runner.start(2).unwrap();
    settle(&mut runner).await;
    assert!(matches!(runner.state(), RunnerState::Active { .. }));
}

#[tokio::test]
async fn review_mode_never_ticks() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = QuizRunner::new(backend, Config::default(), "session-1");

    runner
        .load_review(SubmissionResult {
            score: 7,
            total_questions: 10,
            percentage: 70.0,
            breakdown: vec![],
            submission_type: SubmissionType::Manual,
        })
        .unwrap();

    assert!(matches!(runner.state(), RunnerState::Completed { .. }));
    runner.tick();
    assert!(matches!(runner.state(), RunnerState::Completed { .. }));
    assert!(runner.take_notices().is_empty());
}

#[tokio::test]
async fn telemetry_failure_never_touches_state() {
    let backend = Arc::new(MockBackend::default());
    backend.fail_tracking.store(true, Ordering::SeqCst);
    let mut runner = started_runner(backend, 3).await;

    runner.navigate(Direction::Next).unwrap();
    settle(&mut runner).await;

    assert!(matches!(phase(&runner), ActivePhase::Ticking));
    assert_eq!(attempt(&runner).current_index, 1);
    assert!(runner.take_notices().is_empty());
}

#[tokio::test]
async fn cursor_changes_fire_time_tracking() {
    let backend = Arc::new(MockBackend::default());
    let mut runner = started_runner(Arc::clone(&backend), 3).await;

    runner.navigate(Direction::Next).unwrap();
    runner.navigate(Direction::Next).unwrap();
    settle(&mut runner).await;

    let tracked = backend.tracked.lock().unwrap().clone();
    assert!(tracked.contains(&1));
    assert!(tracked.contains(&2));
}
