// Recording collaborators for unit tests - no side effects

use std::sync::Mutex;

use crate::upload::UploadError;
use crate::workflow::sequencer::WorkflowPhase;
use crate::workflow::traits::{FlowPresenter, ResultNavigator};

#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    SubmitEnabled(bool),
    AgeError(Option<String>),
    Preview(String),
    Busy(bool),
    UploadRejected(String),
    PhaseChanged(WorkflowPhase),
    FlowReset,
}

/// Presenter that records every notification in order.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn submit_enabled_states(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::SubmitEnabled(enabled) => Some(enabled),
                _ => None,
            })
            .collect()
    }

    pub fn age_errors(&self) -> Vec<Option<String>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::AgeError(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn phases(&self) -> Vec<WorkflowPhase> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::PhaseChanged(phase) => Some(phase),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: PresenterEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl FlowPresenter for RecordingPresenter {
    fn submit_enabled(&self, enabled: bool) {
        self.record(PresenterEvent::SubmitEnabled(enabled));
    }

    fn age_error(&self, message: Option<&str>) {
        self.record(PresenterEvent::AgeError(message.map(str::to_string)));
    }

    fn photo_preview(&self, preview_data_uri: &str) {
        self.record(PresenterEvent::Preview(preview_data_uri.to_string()));
    }

    fn upload_busy(&self, busy: bool) {
        self.record(PresenterEvent::Busy(busy));
    }

    fn upload_rejected(&self, error: &UploadError) {
        self.record(PresenterEvent::UploadRejected(error.to_string()));
    }

    fn phase_changed(&self, phase: WorkflowPhase) {
        self.record(PresenterEvent::PhaseChanged(phase));
    }

    fn flow_reset(&self) {
        self.record(PresenterEvent::FlowReset);
    }
}

/// Navigator that records every handoff.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    shown: Mutex<Vec<i64>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<i64> {
        self.shown.lock().unwrap().clone()
    }
}

impl ResultNavigator for RecordingNavigator {
    fn show_result(&self, product_id: i64) {
        self.shown.lock().unwrap().push(product_id);
    }
}
