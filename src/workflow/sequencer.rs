use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::SequenceConfig;

/// The analysis sequence phases. Transitions run strictly forward; the
/// external Restart action is the only way back to Idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowPhase {
    #[default]
    Idle,
    Submitting,
    AnalyzingStep1,
    AnalyzingStep2,
    AnalyzingStep3,
    Navigating,
}

/// Events driving the phase machine.
///
/// Timer-driven events carry the generation of the chain that scheduled
/// them; a handler seeing a generation other than the machine's current one
/// knows the timer is stale and must no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceEvent {
    Submit {
        generation: u64,
        classification_index: i64,
    },
    Advance {
        generation: u64,
    },
    Restart,
}

/// Wall-clock timings of the analysis sequence.
#[derive(Debug, Clone, Copy)]
pub struct PhaseTimings {
    pub step1_visible: Duration,
    pub step2_visible: Duration,
    pub step3_visible: Duration,
    pub transition: Duration,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            step1_visible: Duration::from_millis(3000),
            step2_visible: Duration::from_millis(3000),
            step3_visible: Duration::from_millis(700),
            transition: Duration::from_millis(300),
        }
    }
}

impl PhaseTimings {
    pub fn from_config(config: &SequenceConfig) -> Self {
        Self {
            step1_visible: Duration::from_millis(config.step1_visible_ms),
            step2_visible: Duration::from_millis(config.step2_visible_ms),
            step3_visible: Duration::from_millis(config.step3_visible_ms),
            transition: Duration::from_millis(config.transition_ms),
        }
    }

    /// Zero delays, for demo runs that skip the staged pauses.
    pub fn immediate() -> Self {
        Self {
            step1_visible: Duration::ZERO,
            step2_visible: Duration::ZERO,
            step3_visible: Duration::ZERO,
            transition: Duration::ZERO,
        }
    }

    /// Delay before each timer-driven advance after step 1 appears:
    /// step visible time plus the exit transition, with no transition
    /// after the last step.
    pub(crate) fn delays(&self) -> [Duration; 3] {
        [
            self.step1_visible + self.transition,
            self.step2_visible + self.transition,
            self.step3_visible,
        ]
    }
}

/// The phase state machine.
///
/// Pure transition logic: the machine never schedules timers itself, it
/// only decides what each event means given the current phase and
/// generation. The controller owns the clock.
#[derive(Debug, Default)]
pub struct PhaseMachine {
    phase: WorkflowPhase,
    generation: u64,
    captured_index: Option<i64>,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The classification index captured when Submitting was entered; the
    /// recommendation is resolved from this value, not from whatever the
    /// selection holds by the time navigation fires.
    pub fn captured_index(&self) -> Option<i64> {
        self.captured_index
    }

    /// Main transition logic. Returns the new phase when the event caused
    /// a transition, `None` when it was ignored (stale timer, invalid
    /// trigger).
    pub fn handle_event(&mut self, event: &SequenceEvent) -> Option<WorkflowPhase> {
        let from = self.phase;
        let to = match (from, event) {
            // A submission from Idle starts the sequence; one from a
            // mid-chain phase supersedes the live sequence wholesale.
            (
                WorkflowPhase::Idle
                | WorkflowPhase::Submitting
                | WorkflowPhase::AnalyzingStep1
                | WorkflowPhase::AnalyzingStep2
                | WorkflowPhase::AnalyzingStep3,
                SequenceEvent::Submit {
                    generation,
                    classification_index,
                },
            ) => {
                if from != WorkflowPhase::Idle {
                    warn!(
                        superseded_generation = self.generation,
                        new_generation = generation,
                        "new submission supersedes a live analysis sequence"
                    );
                }
                self.generation = *generation;
                self.captured_index = Some(*classification_index);
                Some(WorkflowPhase::Submitting)
            }
            (WorkflowPhase::Navigating, SequenceEvent::Submit { .. }) => {
                warn!("submission ignored: result handoff already in progress");
                None
            }

            (_, SequenceEvent::Advance { generation }) if *generation != self.generation => {
                debug!(
                    stale_generation = generation,
                    current_generation = self.generation,
                    "stale timer callback ignored"
                );
                None
            }
            (WorkflowPhase::Submitting, SequenceEvent::Advance { .. }) => {
                Some(WorkflowPhase::AnalyzingStep1)
            }
            (WorkflowPhase::AnalyzingStep1, SequenceEvent::Advance { .. }) => {
                Some(WorkflowPhase::AnalyzingStep2)
            }
            (WorkflowPhase::AnalyzingStep2, SequenceEvent::Advance { .. }) => {
                Some(WorkflowPhase::AnalyzingStep3)
            }
            (WorkflowPhase::AnalyzingStep3, SequenceEvent::Advance { .. }) => {
                Some(WorkflowPhase::Navigating)
            }
            (WorkflowPhase::Idle | WorkflowPhase::Navigating, SequenceEvent::Advance { .. }) => {
                debug!(phase = ?from, "advance ignored outside the analysis chain");
                None
            }

            (_, SequenceEvent::Restart) => {
                self.captured_index = None;
                Some(WorkflowPhase::Idle)
            }
        }?;

        info!(from = ?from, to = ?to, generation = self.generation, "workflow phase transition");
        self.phase = to;
        Some(to)
    }
}
