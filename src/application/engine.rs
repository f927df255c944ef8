use crate::domain::ports::SharedDelay;
use crate::domain::workflow::{
    ContinueBehavior, PaymentMethod, PaymentPhase, WorkflowEvent, WorkflowScript, WorkflowSnapshot,
};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// The payment workflow state machine.
///
/// `WorkflowEngine` owns the current phase, the chosen payment method, the
/// delay-notice flag and the two timer tasks that drive the simulation. All
/// operations take `&self`, return immediately, and mutate under a single
/// lock so user actions and timer firings never interleave mid-mutation.
///
/// Cancellation is double-guarded: a reset aborts the outstanding tasks and
/// bumps a generation counter that every task re-checks under the lock at
/// fire time, so a task caught mid-fire becomes a no-op.
pub struct WorkflowEngine {
    shared: Arc<EngineShared>,
}

struct EngineShared {
    state: Mutex<EngineState>,
    script: WorkflowScript,
    delay: SharedDelay,
}

struct EngineState {
    phase: PaymentPhase,
    method: PaymentMethod,
    delay_notice_visible: bool,
    amount: Option<Decimal>,
    generation: u64,
    step_task: Option<JoinHandle<()>>,
    notice_task: Option<JoinHandle<()>>,
    subscribers: Vec<mpsc::UnboundedSender<WorkflowEvent>>,
}

impl WorkflowEngine {
    /// Creates an engine in the `Start` phase with the `bank` method chosen.
    ///
    /// # Arguments
    ///
    /// * `script` - The phase sequence and timing for each attempt.
    /// * `delay` - The timing port the simulation waits through.
    pub fn new(script: WorkflowScript, delay: SharedDelay) -> Self {
        let state = EngineState {
            phase: PaymentPhase::Start,
            method: PaymentMethod::Bank,
            delay_notice_visible: false,
            amount: None,
            generation: 0,
            step_task: None,
            notice_task: None,
            subscribers: Vec::new(),
        };
        Self {
            shared: Arc::new(EngineShared {
                state: Mutex::new(state),
                script,
                delay,
            }),
        }
    }

    /// Begins a payment attempt for `total`.
    ///
    /// Enters the first scripted phase immediately and spawns the
    /// phase-advance driver for the rest. Rejected outside the `Start`
    /// phase.
    pub async fn start(&self, total: Decimal) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        if state.phase != PaymentPhase::Start {
            return Err(PaymentError::InvalidTransition(format!(
                "cannot start a payment while {}",
                state.phase
            )));
        }

        info!(%total, method = %state.method, "payment attempt started");
        state.delay_notice_visible = false;
        state.amount = Some(total);

        let first = self.shared.script.steps()[0].phase;
        enter_phase(&self.shared, &mut state, first);

        let task = spawn_driver(Arc::clone(&self.shared), state.generation);
        if let Some(old) = state.step_task.replace(task) {
            old.abort();
        }
        Ok(())
    }

    /// Discards the in-progress attempt and returns to `Start`, cancelling
    /// both timers. Rejected when no attempt is in progress.
    pub async fn abort(&self) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        if state.phase == PaymentPhase::Start {
            return Err(PaymentError::InvalidTransition(
                "no payment attempt to abort".to_string(),
            ));
        }
        info!("payment attempt aborted");
        reset_locked(&mut state);
        Ok(())
    }

    /// Answers the delay notice. Rejected unless the notice is visible.
    ///
    /// What "keep waiting" means is configured by the script's
    /// `ContinueBehavior`; the default matches the original product and
    /// resets the attempt just like [`abort`](Self::abort).
    pub async fn continue_waiting(&self) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        if !state.delay_notice_visible {
            return Err(PaymentError::InvalidTransition(
                "no delay notice to answer".to_string(),
            ));
        }
        match self.shared.script.on_continue {
            ContinueBehavior::ResetToStart => {
                info!("delay notice answered: attempt reset");
                reset_locked(&mut state);
            }
            ContinueBehavior::DismissNotice => {
                debug!("delay notice dismissed");
                state.delay_notice_visible = false;
                emit(&mut state, WorkflowEvent::DelayNoticeCleared);
            }
        }
        Ok(())
    }

    /// Chooses the payment method. Rejected once an attempt is running.
    pub async fn change_method(&self, method: PaymentMethod) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        if state.phase != PaymentPhase::Start {
            return Err(PaymentError::InvalidTransition(format!(
                "cannot change the payment method while {}",
                state.phase
            )));
        }
        state.method = method;
        Ok(())
    }

    /// Unconditional reset back to `Start`. Idempotent; keeps the chosen
    /// method.
    pub async fn reset(&self) {
        let mut state = self.shared.state.lock().await;
        reset_locked(&mut state);
    }

    /// Registers a subscriber for phase and notice changes. Events are
    /// delivered in the order they occur.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<WorkflowEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.shared.state.lock().await.subscribers.push(tx);
        rx
    }

    pub async fn phase(&self) -> PaymentPhase {
        self.shared.state.lock().await.phase
    }

    pub async fn method(&self) -> PaymentMethod {
        self.shared.state.lock().await.method
    }

    pub async fn delay_notice_visible(&self) -> bool {
        self.shared.state.lock().await.delay_notice_visible
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        let state = self.shared.state.lock().await;
        WorkflowSnapshot {
            phase: state.phase,
            method: state.method,
            delay_notice_visible: state.delay_notice_visible,
            amount: state.amount,
        }
    }
}

fn emit(state: &mut EngineState, event: WorkflowEvent) {
    state.subscribers.retain(|tx| tx.send(event).is_ok());
}

/// Records the phase, notifies subscribers and, on entering the notify
/// phase, arms the delay-notice timer.
fn enter_phase(shared: &Arc<EngineShared>, state: &mut EngineState, phase: PaymentPhase) {
    debug!(%phase, "entering phase");
    state.phase = phase;
    emit(state, WorkflowEvent::PhaseChanged(phase));

    if phase == shared.script.notify_phase {
        let task = spawn_notice(Arc::clone(shared), state.generation);
        if let Some(old) = state.notice_task.replace(task) {
            old.abort();
        }
    }
}

/// Walks the script one step at a time, waiting out each dwell through the
/// delay port. A generation mismatch under the lock means the attempt was
/// reset while the task slept.
fn spawn_driver(shared: Arc<EngineShared>, generation: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let steps = shared.script.steps().to_vec();
        for index in 1..steps.len() {
            shared.delay.wait(steps[index - 1].dwell).await;
            let mut state = shared.state.lock().await;
            if state.generation != generation {
                return;
            }
            enter_phase(&shared, &mut state, steps[index].phase);
        }
    })
}

fn spawn_notice(shared: Arc<EngineShared>, generation: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        shared.delay.wait(shared.script.notify_after).await;
        let mut state = shared.state.lock().await;
        // Checked at fire time, not schedule time: a reset or a later phase
        // suppresses the notice.
        if state.generation != generation || state.phase != shared.script.notify_phase {
            return;
        }
        debug!("delay notice shown");
        state.delay_notice_visible = true;
        emit(&mut state, WorkflowEvent::DelayNoticeShown);
    })
}

fn reset_locked(state: &mut EngineState) {
    state.generation += 1;
    if let Some(task) = state.step_task.take() {
        task.abort();
    }
    if let Some(task) = state.notice_task.take() {
        task.abort();
    }
    state.amount = None;
    if state.delay_notice_visible {
        state.delay_notice_visible = false;
        emit(state, WorkflowEvent::DelayNoticeCleared);
    }
    if state.phase != PaymentPhase::Start {
        state.phase = PaymentPhase::Start;
        emit(state, WorkflowEvent::PhaseChanged(PaymentPhase::Start));
    }
}
