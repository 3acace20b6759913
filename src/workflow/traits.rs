// Traits for dependency injection - the rendering and navigation
// collaborators own all presentation; the core only emits state changes.

use crate::upload::UploadError;
use crate::workflow::sequencer::WorkflowPhase;

/// Rendering collaborator. Every method is a pure state notification; node
/// and style manipulation happen on the other side of this seam.
pub trait FlowPresenter: Send + Sync {
    /// Submission control enabled state, recomputed after every edit.
    fn submit_enabled(&self, enabled: bool);

    /// The single age-range indicator: `Some` shows it (reusing any
    /// existing one), `None` removes it.
    fn age_error(&self, message: Option<&str>);

    /// A validated photo's preview is ready to display.
    fn photo_preview(&self, preview_data_uri: &str);

    /// Busy indicator around the remote classification call.
    fn upload_busy(&self, busy: bool);

    /// An upload attempt failed; intake state is unchanged and the user
    /// may retry.
    fn upload_rejected(&self, error: &UploadError);

    /// The analysis sequence moved to a new phase.
    fn phase_changed(&self, phase: WorkflowPhase);

    /// The whole flow was restarted.
    fn flow_reset(&self);
}

/// Result-view collaborator; receives the resolved product's identifier.
pub trait ResultNavigator: Send + Sync {
    fn show_result(&self, product_id: i64);
}
