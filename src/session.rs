//! Lab session: owns the active round and sequences its async work.
//!
//! Two things complete asynchronously: the artificial "scanning" delay before
//! the guess space is shown, and the teacher's explanation after a solve.
//! Both are tagged with the [`RoundId`] they were started for and applied only
//! if that round is still active; completions for a replaced round are dropped.

use crate::lab_config::LabConfig;
use crate::teacher::{ExplanationClient, TipRequest};
use derive_more::{Display, Error};
use prime_lock_core::{GuessOutcome, LockGenerator, LockMode, Round, evaluate};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Identity of a round within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(transparent)]
#[display("#{_0}")]
pub struct RoundId(u64);

impl RoundId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Lifecycle of the active round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Guess space not yet visible; guesses are blocked.
    Scanning,
    /// Accepting guesses.
    Ready,
    /// Secret found; further guesses are ignored.
    Solved,
}

/// State of the teacher's explanation for the active round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum TipState {
    /// Nothing requested yet.
    Idle,
    /// Request in flight.
    Loading,
    /// Explanation received.
    Ready(String),
}

/// Why a guess was not evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum GuessRejected {
    /// The guess space is not visible yet.
    #[display("The guess space is still being scanned")]
    Scanning,
    /// The lock is already open.
    #[display("This lock is already open")]
    AlreadySolved,
}

/// The most recent evaluated guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastGuess {
    /// Guessed value.
    pub value: u32,
    /// Whether it matched the secret.
    pub hit: bool,
}

/// Read-only view of the session for renderers.
///
/// The public factor and guess space stay hidden while scanning, and the
/// secret stays hidden until solved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabSnapshot {
    /// Active round.
    pub round_id: RoundId,
    /// Lock mode of the active round.
    pub mode: LockMode,
    /// Phase of the active round.
    pub phase: RoundPhase,
    /// Revealed factor `P`, once scanning finishes.
    pub public_factor: Option<u32>,
    /// Candidates, once scanning finishes.
    pub guess_space: Option<Vec<u32>>,
    /// The secret, once solved.
    pub secret: Option<u32>,
    /// Guesses evaluated this round.
    pub guesses: u32,
    /// Feedback for the latest guess.
    pub last_guess: Option<LastGuess>,
    /// Teacher explanation state.
    pub tip: TipState,
}

#[derive(Debug)]
struct ActiveRound {
    id: RoundId,
    round: Round,
    phase: RoundPhase,
    guesses: u32,
    last_guess: Option<LastGuess>,
    tip: TipState,
    tip_task: Option<JoinHandle<()>>,
}

impl ActiveRound {
    fn new(id: RoundId, round: Round, phase: RoundPhase) -> Self {
        Self {
            id,
            round,
            phase,
            guesses: 0,
            last_guess: None,
            tip: TipState::Idle,
            tip_task: None,
        }
    }
}

struct Inner {
    active: Mutex<ActiveRound>,
    generator: Mutex<LockGenerator>,
    explainer: Arc<dyn ExplanationClient>,
    scan_delay: Duration,
    next_id: AtomicU64,
}

/// Controller owning the single mutable round.
///
/// Cheap to clone; clones share the same round. Must be created and driven
/// inside a Tokio runtime.
#[derive(Clone)]
pub struct LabSession {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for LabSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabSession")
            .field("scan_delay", &self.inner.scan_delay)
            .field("active", &*self.active())
            .finish()
    }
}

impl LabSession {
    /// Creates a session from configuration and starts a composite round.
    #[instrument(skip(explainer, config))]
    pub fn new(explainer: Arc<dyn ExplanationClient>, config: &LabConfig) -> Self {
        Self::with_generator(
            explainer,
            LockGenerator::new(),
            config.scan_delay(),
            LockMode::Composite,
        )
    }

    /// Creates a session with an explicit generator, delay and opening mode.
    #[instrument(skip(explainer, generator))]
    pub fn with_generator(
        explainer: Arc<dyn ExplanationClient>,
        mut generator: LockGenerator,
        scan_delay: Duration,
        mode: LockMode,
    ) -> Self {
        let id = RoundId(1);
        let round = generator.generate(mode);
        let phase = initial_phase(scan_delay);
        info!(round_id = %id, %mode, "Opening lab session");

        let session = Self {
            inner: Arc::new(Inner {
                active: Mutex::new(ActiveRound::new(id, round, phase)),
                generator: Mutex::new(generator),
                explainer,
                scan_delay,
                next_id: AtomicU64::new(id.0 + 1),
            }),
        };
        if phase == RoundPhase::Scanning {
            session.schedule_scan(id);
        }
        session
    }

    fn active(&self) -> MutexGuard<'_, ActiveRound> {
        self.inner.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the active round with a fresh one of `mode`.
    ///
    /// Any in-flight explanation for the old round is aborted, and its pending
    /// scan completion becomes a no-op.
    #[instrument(skip(self))]
    pub fn start_round(&self, mode: LockMode) -> RoundId {
        let round = self
            .inner
            .generator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate(mode);
        let phase = initial_phase(self.inner.scan_delay);

        // Ids are allocated under the round lock so installed ids only grow
        let (id, previous) = {
            let mut active = self.active();
            let id = RoundId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
            (id, std::mem::replace(&mut *active, ActiveRound::new(id, round, phase)))
        };
        if let Some(task) = previous.tip_task {
            debug!(stale_round = %previous.id, "Dropping in-flight explanation");
            task.abort();
        }

        info!(round_id = %id, %mode, "Started round");
        if phase == RoundPhase::Scanning {
            self.schedule_scan(id);
        }
        id
    }

    /// Starts a new round with the current mode.
    #[instrument(skip(self))]
    pub fn restart(&self) -> RoundId {
        let mode = self.mode();
        self.start_round(mode)
    }

    /// Evaluates `value` against the active round.
    ///
    /// A hit solves the round and requests the teacher's explanation.
    #[instrument(skip(self))]
    pub fn guess(&self, value: u32) -> Result<GuessOutcome, GuessRejected> {
        let mut active = self.active();
        match active.phase {
            RoundPhase::Scanning => {
                debug!("Guess rejected while scanning");
                return Err(GuessRejected::Scanning);
            }
            RoundPhase::Solved => {
                debug!("Guess ignored on solved round");
                return Err(GuessRejected::AlreadySolved);
            }
            RoundPhase::Ready => {}
        }

        let outcome = evaluate(&active.round, value);
        active.guesses += 1;
        active.last_guess = Some(LastGuess {
            value,
            hit: outcome.is_hit(),
        });

        if outcome.is_hit() {
            active.round.mark_solved();
            active.phase = RoundPhase::Solved;
            active.tip = TipState::Loading;
            info!(round_id = %active.id, guesses = active.guesses, "Lock opened");

            let request = TipRequest::for_round(&active.round);
            let task = self.spawn_explanation(active.id, request);
            active.tip_task = Some(task);
        } else {
            debug!(round_id = %active.id, guesses = active.guesses, "Wrong guess");
        }

        Ok(outcome)
    }

    /// Mode of the active round.
    pub fn mode(&self) -> LockMode {
        self.active().round.mode()
    }

    /// Id of the active round.
    pub fn round_id(&self) -> RoundId {
        self.active().id
    }

    /// Phase of the active round.
    pub fn phase(&self) -> RoundPhase {
        self.active().phase
    }

    /// Full copy of the active round, including the secret.
    ///
    /// Renderers should prefer [`LabSession::snapshot`], which hides it.
    pub fn round(&self) -> Round {
        self.active().round.clone()
    }

    /// Current view of the session.
    pub fn snapshot(&self) -> LabSnapshot {
        let active = self.active();
        let revealed = active.phase != RoundPhase::Scanning;
        LabSnapshot {
            round_id: active.id,
            mode: active.round.mode(),
            phase: active.phase,
            public_factor: revealed.then(|| active.round.public_factor()),
            guess_space: revealed.then(|| active.round.guess_space().as_slice().to_vec()),
            secret: (active.phase == RoundPhase::Solved).then(|| active.round.secret()),
            guesses: active.guesses,
            last_guess: active.last_guess,
            tip: active.tip.clone(),
        }
    }

    /// Fetches the decorative code notes. Empty when unavailable.
    #[instrument(skip(self))]
    pub async fn code_notes(&self) -> String {
        self.inner.explainer.code_snippet_explanation().await
    }

    fn schedule_scan(&self, id: RoundId) {
        let session = self.clone();
        let delay = self.inner.scan_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            session.complete_scan(id);
        });
    }

    #[instrument(skip(self))]
    fn complete_scan(&self, id: RoundId) {
        let mut active = self.active();
        if active.id != id {
            debug!(current = %active.id, "Discarding stale scan completion");
            return;
        }
        if active.phase == RoundPhase::Scanning {
            active.phase = RoundPhase::Ready;
            debug!(candidates = active.round.guess_space().len(), "Guess space ready");
        }
    }

    fn spawn_explanation(&self, id: RoundId, request: TipRequest) -> JoinHandle<()> {
        let session = self.clone();
        tokio::spawn(async move {
            let text = session
                .inner
                .explainer
                .explain_concept(&request.topic, &request.context)
                .await;
            session.apply_explanation(id, text);
        })
    }

    #[instrument(skip(self, text))]
    fn apply_explanation(&self, id: RoundId, text: String) {
        let mut active = self.active();
        if active.id != id {
            warn!(current = %active.id, "Discarding explanation for replaced round");
            return;
        }
        active.tip = TipState::Ready(text);
        active.tip_task = None;
    }
}

fn initial_phase(scan_delay: Duration) -> RoundPhase {
    if scan_delay.is_zero() {
        RoundPhase::Ready
    } else {
        RoundPhase::Scanning
    }
}
