use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogEntry, CatalogStore};
use crate::intake::{validate_age, AgeValidation, Gender, IntakeSelection};
use crate::recommend::resolve;
use crate::share::{self, ShareError, SharePlatform};
use crate::upload::{PhotoFile, UploadError, UploadPipeline};
use crate::workflow::sequencer::{PhaseMachine, PhaseTimings, SequenceEvent, WorkflowPhase};
use crate::workflow::traits::{FlowPresenter, ResultNavigator};

/// Message behind the single age-range indicator.
pub const AGE_RANGE_MESSAGE: &str = "Age must be between 15 and 100";

/// Controller-level error for the fallible entry points. Catalog and
/// recommendation failures never surface here: the store degrades to an
/// empty sequence and the sequencer aborts back to Idle on its own.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Share(#[from] ShareError),
}

/// The session object owning the whole guided flow: the three selections,
/// the phase machine, the generation counter, the upload pipeline, and the
/// catalog, with rendering and navigation injected as collaborators.
///
/// There is exactly one live timer chain per controller: every submission
/// and restart bumps the generation counter, and both the chain task and
/// the machine's handlers drop work tagged with a superseded generation.
pub struct FlowController {
    selection: Mutex<IntakeSelection>,
    machine: Mutex<PhaseMachine>,
    generation: AtomicU64,
    pipeline: UploadPipeline,
    catalog: Arc<CatalogStore>,
    presenter: Arc<dyn FlowPresenter>,
    navigator: Arc<dyn ResultNavigator>,
    timings: PhaseTimings,
    resolved: Mutex<Option<CatalogEntry>>,
}

impl FlowController {
    pub fn new(
        pipeline: UploadPipeline,
        catalog: Arc<CatalogStore>,
        presenter: Arc<dyn FlowPresenter>,
        navigator: Arc<dyn ResultNavigator>,
        timings: PhaseTimings,
    ) -> Arc<Self> {
        Arc::new(Self {
            selection: Mutex::new(IntakeSelection::new()),
            machine: Mutex::new(PhaseMachine::new()),
            generation: AtomicU64::new(0),
            pipeline,
            catalog,
            presenter,
            navigator,
            timings,
            resolved: Mutex::new(None),
        })
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    pub async fn phase(&self) -> WorkflowPhase {
        self.machine.lock().await.phase()
    }

    pub async fn is_ready(&self) -> bool {
        self.selection.lock().await.is_ready()
    }

    /// The product resolved by the most recent completed sequence.
    pub async fn resolved_product(&self) -> Option<CatalogEntry> {
        self.resolved.lock().await.clone()
    }

    pub async fn select_gender(&self, gender: Gender) {
        let mut selection = self.selection.lock().await;
        selection.set_gender(gender);
        self.presenter.submit_enabled(selection.is_ready());
    }

    /// Feed the raw age field. The range indicator appears exactly when the
    /// input is non-empty and unusable; it is a single optional state, so
    /// repeated edits reuse the same indicator instead of stacking new ones.
    pub async fn set_age_input(&self, raw: &str) {
        let mut selection = self.selection.lock().await;
        match validate_age(raw) {
            AgeValidation::Valid(age) => {
                selection.set_age(Some(age));
                self.presenter.age_error(None);
            }
            AgeValidation::Empty => {
                selection.set_age(None);
                self.presenter.age_error(None);
            }
            AgeValidation::OutOfRange => {
                selection.set_age(None);
                self.presenter.age_error(Some(AGE_RANGE_MESSAGE));
            }
        }
        self.presenter.submit_enabled(selection.is_ready());
    }

    /// Run the upload pipeline for a selected file. On success the photo
    /// supersedes any previous one; on failure the selection is untouched
    /// and the user may retry without restarting.
    pub async fn attach_photo(&self, file: PhotoFile) -> Result<(), FlowError> {
        if !file.is_image() {
            let error = UploadError::InvalidFileType {
                mime_type: file.mime_type.clone(),
            };
            warn!(%error, "upload refused before any network call");
            self.presenter.upload_rejected(&error);
            return Err(error.into());
        }

        let (gender, age) = {
            let selection = self.selection.lock().await;
            (selection.gender(), selection.age())
        };

        self.presenter.upload_busy(true);
        let result = self.pipeline.submit_photo(&file, gender, age).await;
        self.presenter.upload_busy(false);

        match result {
            Ok(photo) => {
                self.presenter.photo_preview(&photo.preview_data_uri);
                let mut selection = self.selection.lock().await;
                selection.set_photo(photo);
                self.presenter.submit_enabled(selection.is_ready());
                Ok(())
            }
            Err(error) => {
                warn!(%error, "photo upload attempt failed");
                self.presenter.upload_rejected(&error);
                Err(error.into())
            }
        }
    }

    /// Trigger submission. A no-op unless the intake is ready (the control
    /// is disabled upstream, so reaching this while unready is a caller
    /// bug worth logging, not an error worth surfacing).
    ///
    /// Returns the handle of the spawned phase chain so callers can await
    /// the handoff; any chain from a previous submission is invalidated
    /// before the new one is scheduled.
    pub async fn try_submit(self: Arc<Self>) -> Option<JoinHandle<()>> {
        let classification_index = {
            let selection = self.selection.lock().await;
            if !selection.is_ready() {
                warn!("submission triggered while intake is incomplete, ignoring");
                return None;
            }
            selection.photo()?.classification_index
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut machine = self.machine.lock().await;
            let phase = machine.handle_event(&SequenceEvent::Submit {
                generation,
                classification_index,
            })?;
            self.presenter.phase_changed(phase);
        }

        info!(generation, classification_index, "analysis sequence started");
        Some(tokio::spawn(async move {
            self.run_phase_chain(generation).await;
        }))
    }

    /// Restart: back to Idle, selection cleared, pending timers of any
    /// previous sequence invalidated, resolved product discarded.
    pub async fn restart(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut machine = self.machine.lock().await;
            if let Some(phase) = machine.handle_event(&SequenceEvent::Restart) {
                self.presenter.phase_changed(phase);
            }
        }
        self.selection.lock().await.clear();
        *self.resolved.lock().await = None;
        self.presenter.flow_reset();
        self.presenter.submit_enabled(false);
        info!("flow restarted");
    }

    /// Share the resolved recommendation through the platform capability,
    /// best effort.
    pub async fn share_result(
        &self,
        platform: &dyn SharePlatform,
        page_url: &str,
    ) -> Result<(), FlowError> {
        let resolved = self.resolved.lock().await;
        let entry = resolved.as_ref().ok_or(ShareError::NothingToShare)?;
        Ok(share::share_product(platform, entry, page_url)?)
    }

    /// Walk the timer chain for one sequence. Each advance is scheduled
    /// only after its predecessor's handler ran, so steps of one sequence
    /// cannot reorder; the generation check makes superseded chains die
    /// quietly at their next wake-up.
    async fn run_phase_chain(&self, generation: u64) {
        // Submitting is momentary: the first analysis step appears at once.
        if !self.advance(generation).await {
            return;
        }
        for delay in self.timings.delays() {
            tokio::time::sleep(delay).await;
            if !self.advance(generation).await {
                return;
            }
        }
    }

    async fn advance(&self, generation: u64) -> bool {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "phase chain superseded, dropping stale timer");
            return false;
        }
        let phase = {
            let mut machine = self.machine.lock().await;
            match machine.handle_event(&SequenceEvent::Advance { generation }) {
                Some(phase) => phase,
                None => return false,
            }
        };
        self.presenter.phase_changed(phase);
        if phase == WorkflowPhase::Navigating {
            self.finish_navigation(generation).await;
            return false;
        }
        true
    }

    /// Resolve the recommendation from the index captured at submission
    /// time and hand off to the result view.
    async fn finish_navigation(&self, generation: u64) {
        let classification_index = self.machine.lock().await.captured_index();
        let Some(classification_index) = classification_index else {
            error!("navigation reached without a captured classification");
            self.abort_sequence(generation).await;
            return;
        };

        let catalog = self.catalog.load_or_empty().await;
        match resolve(classification_index, &catalog) {
            Ok(entry) => {
                let entry = entry.clone();
                info!(product_id = entry.id, "handing off to result view");
                *self.resolved.lock().await = Some(entry.clone());
                self.navigator.show_result(entry.id);
            }
            Err(e) => {
                // Reachable only with an empty catalog; don't crash, go
                // back to intake with the selection intact.
                error!(error = %e, "cannot resolve a recommendation, returning to intake");
                self.abort_sequence(generation).await;
            }
        }
    }

    async fn abort_sequence(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        let mut machine = self.machine.lock().await;
        if let Some(phase) = machine.handle_event(&SequenceEvent::Restart) {
            self.presenter.phase_changed(phase);
        }
    }
}
