use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One discrete state of the payment workflow.
///
/// The order is strict: a running attempt only ever moves forward by exactly
/// one phase, or jumps back to `Start` on abort/reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentPhase {
    Start,
    Authorising,
    Authorised,
    Executing,
    Settled,
}

impl PaymentPhase {
    /// The phase immediately after this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::Authorising),
            Self::Authorising => Some(Self::Authorised),
            Self::Authorised => Some(Self::Executing),
            Self::Executing => Some(Self::Settled),
            Self::Settled => None,
        }
    }
}

impl fmt::Display for PaymentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Authorising => "authorising",
            Self::Authorised => "authorised",
            Self::Executing => "executing",
            Self::Settled => "settled",
        };
        f.write_str(name)
    }
}

/// How the payment is made. Selectable only while the workflow is in the
/// `Start` phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Bank,
    Debit,
    Credit,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bank => "bank",
            Self::Debit => "debit",
            Self::Credit => "credit",
        };
        f.write_str(name)
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank" => Ok(Self::Bank),
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(PaymentError::Validation(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

/// What `continue_waiting` does once the delay notice is showing.
///
/// The original product wires both notice buttons to a full reset; whether
/// "I'll wait" should instead keep the attempt running is an open product
/// decision, so both behaviors are supported and the reset is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContinueBehavior {
    /// Discard the attempt and return to `Start`, same as abort.
    #[default]
    ResetToStart,
    /// Only dismiss the notice; any pending phase advance keeps running.
    DismissNotice,
}

/// One scripted step: the phase entered and how long the workflow dwells in
/// it before advancing. The last step's dwell is never consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStep {
    pub phase: PaymentPhase,
    pub dwell: Duration,
}

/// The scripted phase sequence and timing for a simulated payment attempt.
///
/// Steps must begin at `Authorising` and be contiguous in phase order, so a
/// script can only ever lengthen or shorten the tail of the sequence, never
/// skip. `notify_after` runs from entry into `notify_phase`.
#[derive(Debug, Clone)]
pub struct WorkflowScript {
    steps: Vec<ScriptStep>,
    pub notify_phase: PaymentPhase,
    pub notify_after: Duration,
    pub on_continue: ContinueBehavior,
}

/// Time spent in each phase before the simulation advances.
pub const DEFAULT_STEP_DWELL: Duration = Duration::from_secs(2);
/// Time in the processing phase before the delay notice is raised.
pub const DEFAULT_NOTIFY_AFTER: Duration = Duration::from_secs(3);

impl WorkflowScript {
    pub fn new(steps: Vec<ScriptStep>) -> Result<Self, PaymentError> {
        let Some(first) = steps.first() else {
            return Err(PaymentError::Validation(
                "workflow script must have at least one step".to_string(),
            ));
        };
        if first.phase != PaymentPhase::Authorising {
            return Err(PaymentError::Validation(
                "workflow script must begin at the authorising phase".to_string(),
            ));
        }
        for pair in steps.windows(2) {
            if pair[0].phase.next() != Some(pair[1].phase) {
                return Err(PaymentError::Validation(format!(
                    "workflow script skips from {} to {}",
                    pair[0].phase, pair[1].phase
                )));
            }
        }
        Ok(Self {
            steps,
            notify_phase: PaymentPhase::Executing,
            notify_after: DEFAULT_NOTIFY_AFTER,
            on_continue: ContinueBehavior::default(),
        })
    }

    /// The sequence the original product runs: the attempt parks in
    /// `Executing` until the user reacts to the delay notice.
    pub fn three_step(dwell: Duration) -> Self {
        Self::uniform(PaymentPhase::Executing, dwell)
    }

    /// The extended sequence: the attempt settles on its own.
    pub fn four_step(dwell: Duration) -> Self {
        Self::uniform(PaymentPhase::Settled, dwell)
    }

    fn uniform(last: PaymentPhase, dwell: Duration) -> Self {
        let mut steps = Vec::new();
        let mut phase = PaymentPhase::Authorising;
        loop {
            steps.push(ScriptStep { phase, dwell });
            if phase == last {
                break;
            }
            match phase.next() {
                Some(next) => phase = next,
                None => break,
            }
        }
        Self {
            steps,
            notify_phase: PaymentPhase::Executing,
            notify_after: DEFAULT_NOTIFY_AFTER,
            on_continue: ContinueBehavior::default(),
        }
    }

    pub fn notify_after(mut self, delay: Duration) -> Self {
        self.notify_after = delay;
        self
    }

    pub fn on_continue(mut self, behavior: ContinueBehavior) -> Self {
        self.on_continue = behavior;
        self
    }

    /// The scripted steps, in order. Guaranteed non-empty.
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }
}

impl Default for WorkflowScript {
    fn default() -> Self {
        Self::three_step(DEFAULT_STEP_DWELL)
    }
}

/// A change the engine pushes to subscribers as it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEvent {
    PhaseChanged(PaymentPhase),
    DelayNoticeShown,
    DelayNoticeCleared,
}

/// Read-model of the engine for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowSnapshot {
    pub phase: PaymentPhase,
    pub method: PaymentMethod,
    pub delay_notice_visible: bool,
    /// Total of the in-flight attempt; `None` while in `Start`.
    pub amount: Option<Decimal>,
}
