// Workflow Sequencer - the timed, phased intake-to-result transition and
// the session controller that owns it

pub mod controller;
pub mod sequencer;
pub mod traits;

#[cfg(test)]
pub mod mocks;

pub use controller::{FlowController, FlowError};
pub use sequencer::{PhaseMachine, PhaseTimings, SequenceEvent, WorkflowPhase};
pub use traits::{FlowPresenter, ResultNavigator};
