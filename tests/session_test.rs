//! Tests for round sequencing in the lab session.

use async_trait::async_trait;
use prime_lock::{
    ExplanationClient, GuessOutcome, GuessRejected, LabSession, LockGenerator, LockMode, RoundPhase,
    TipState,
};
use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// Teacher that answers after a fixed delay and counts requests.
struct ScriptedTeacher {
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedTeacher {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExplanationClient for ScriptedTeacher {
    async fn explain_concept(&self, topic: &str, _context: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(self.delay).await;
        format!("Explained: {topic}")
    }

    async fn code_snippet_explanation(&self) -> String {
        "bool is_prime(int n);".to_string()
    }
}

/// Teacher that replaces the round while answering, past the point where the
/// request task could still be aborted.
#[derive(Default)]
struct RestartingTeacher {
    session: OnceLock<LabSession>,
}

#[async_trait]
impl ExplanationClient for RestartingTeacher {
    async fn explain_concept(&self, _topic: &str, _context: &str) -> String {
        if let Some(session) = self.session.get() {
            session.restart();
        }
        "Late explanation".to_string()
    }

    async fn code_snippet_explanation(&self) -> String {
        String::new()
    }
}

fn session(teacher: Arc<ScriptedTeacher>, scan_delay: Duration, mode: LockMode) -> LabSession {
    LabSession::with_generator(teacher, LockGenerator::seeded(11), scan_delay, mode)
}

fn wrong_guess(session: &LabSession) -> u32 {
    let round = session.round();
    round
        .guess_space()
        .iter()
        .find(|&v| v != round.secret())
        .expect("guess space has more than one candidate")
}

#[tokio::test(start_paused = true)]
async fn test_guesses_blocked_while_scanning() {
    let session = session(ScriptedTeacher::new(Duration::ZERO), Duration::from_millis(1000), LockMode::Composite);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, RoundPhase::Scanning);
    assert_eq!(snapshot.public_factor, None);
    assert_eq!(snapshot.guess_space, None);

    let secret = session.round().secret();
    assert_eq!(session.guess(secret), Err(GuessRejected::Scanning));
    assert_eq!(session.snapshot().guesses, 0);

    sleep(Duration::from_millis(1001)).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, RoundPhase::Ready);
    assert_eq!(snapshot.public_factor, Some(session.round().public_factor()));
    assert!(snapshot.guess_space.is_some_and(|space| space.contains(&secret)));
}

#[tokio::test(start_paused = true)]
async fn test_stale_scan_does_not_reveal_newer_round() {
    let session = session(ScriptedTeacher::new(Duration::ZERO), Duration::from_millis(1000), LockMode::Composite);
    let first = session.round_id();

    sleep(Duration::from_millis(600)).await;
    let second = session.start_round(LockMode::Prime);
    assert!(second > first);

    // First round's timer fires at 1000ms and must be ignored
    sleep(Duration::from_millis(500)).await;
    assert_eq!(session.round_id(), second);
    assert_eq!(session.phase(), RoundPhase::Scanning);

    sleep(Duration::from_millis(600)).await;
    assert_eq!(session.phase(), RoundPhase::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_hit_solves_round_and_fetches_tip() {
    let teacher = ScriptedTeacher::new(Duration::from_secs(2));
    let session = session(teacher.clone(), Duration::ZERO, LockMode::Composite);

    let miss = wrong_guess(&session);
    assert_eq!(session.guess(miss), Ok(GuessOutcome::MISS));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, RoundPhase::Ready);
    assert_eq!(snapshot.secret, None);
    assert_eq!(snapshot.last_guess.map(|g| (g.value, g.hit)), Some((miss, false)));

    let secret = session.round().secret();
    assert_eq!(session.guess(secret), Ok(GuessOutcome::HIT));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, RoundPhase::Solved);
    assert_eq!(snapshot.secret, Some(secret));
    assert_eq!(snapshot.guesses, 2);
    assert_eq!(snapshot.tip, TipState::Loading);
    assert!(session.round().is_solved());

    sleep(Duration::from_millis(2001)).await;
    match session.snapshot().tip {
        TipState::Ready(text) => assert!(text.contains("public key P")),
        other => panic!("expected tip, got {other:?}"),
    }
    assert_eq!(teacher.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_guess_after_solve_is_ignored() {
    let session = session(ScriptedTeacher::new(Duration::ZERO), Duration::ZERO, LockMode::Prime);
    let secret = session.round().secret();

    assert!(session.guess(secret).is_ok());
    assert_eq!(session.guess(secret), Err(GuessRejected::AlreadySolved));
    assert_eq!(session.guess(1), Err(GuessRejected::AlreadySolved));
    assert_eq!(session.snapshot().guesses, 1);
}

#[tokio::test(start_paused = true)]
async fn test_restart_discards_pending_tip() {
    let teacher = ScriptedTeacher::new(Duration::from_secs(5));
    let session = session(teacher.clone(), Duration::ZERO, LockMode::Prime);

    let solved_round = session.round_id();
    let secret = session.round().secret();
    session.guess(secret).expect("round is ready");
    assert_eq!(session.snapshot().tip, TipState::Loading);

    let next = session.restart();
    assert_ne!(next, solved_round);
    assert_eq!(session.mode(), LockMode::Prime);
    assert_eq!(session.snapshot().tip, TipState::Idle);

    sleep(Duration::from_secs(6)).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.round_id, next);
    assert_eq!(snapshot.tip, TipState::Idle);
    assert_eq!(snapshot.phase, RoundPhase::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_mode_switch_replaces_round() {
    let session = session(ScriptedTeacher::new(Duration::ZERO), Duration::ZERO, LockMode::Composite);
    session.start_round(LockMode::Prime);

    let round = session.round();
    assert_eq!(round.mode(), LockMode::Prime);
    assert_eq!(round.public_factor(), 1);
    assert_eq!(session.snapshot().guesses, 0);
}

#[tokio::test(start_paused = true)]
async fn test_code_notes_pass_through() {
    let session = session(ScriptedTeacher::new(Duration::ZERO), Duration::ZERO, LockMode::Composite);
    assert_eq!(session.code_notes().await, "bool is_prime(int n);");
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_serializes_tip_state() {
    let session = session(ScriptedTeacher::new(Duration::ZERO), Duration::ZERO, LockMode::Composite);
    let json = serde_json::to_value(session.snapshot()).expect("serialize snapshot");
    assert_eq!(json["phase"], "ready");
    assert_eq!(json["mode"], "COMPOSITE");
    assert_eq!(json["tip"]["state"], "idle");
    assert!(json["secret"].is_null());
}

#[tokio::test(start_paused = true)]
async fn test_explanation_for_replaced_round_is_discarded() {
    let teacher = Arc::new(RestartingTeacher::default());
    let session = LabSession::with_generator(
        teacher.clone(),
        LockGenerator::seeded(11),
        Duration::ZERO,
        LockMode::Composite,
    );
    teacher.session.set(session.clone()).expect("session set once");

    let solved_round = session.round_id();
    let secret = session.round().secret();
    session.guess(secret).expect("round is ready");

    sleep(Duration::from_millis(10)).await;
    let snapshot = session.snapshot();
    assert_ne!(snapshot.round_id, solved_round);
    assert_eq!(snapshot.phase, RoundPhase::Ready);
    assert_eq!(snapshot.tip, TipState::Idle);
}

#[test]
fn test_concurrent_restarts_leave_newest_round_active() {
    let session = session(ScriptedTeacher::new(Duration::ZERO), Duration::ZERO, LockMode::Composite);

    let highest = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let session = session.clone();
                scope.spawn(move || (0..50).map(|_| session.restart()).max())
            })
            .collect();
        workers
            .into_iter()
            .filter_map(|worker| worker.join().expect("worker panicked"))
            .max()
    });

    assert_eq!(Some(session.round_id()), highest);
}
