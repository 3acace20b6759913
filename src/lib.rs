// Shademate Library - Guided Sunglasses-Recommendation Intake Flow
// This exposes the core components for testing and integration

pub mod catalog;
pub mod config;
pub mod intake;
pub mod recommend;
pub mod share;
pub mod telemetry;
pub mod upload;
pub mod workflow;

// Re-export key types for easy access
pub use catalog::{CatalogEntry, CatalogError, CatalogSource, CatalogStore};
pub use config::{config, init_config, ShademateConfig};
pub use intake::{validate_age, AgeValidation, Gender, IntakeSelection, ValidatedPhoto};
pub use recommend::{resolve, RecommendError};
pub use share::{ShareContent, ShareError, SharePlatform};
pub use telemetry::init_telemetry;
pub use upload::{PhotoFile, UploadError, UploadPipeline};
pub use workflow::{
    FlowController, FlowError, FlowPresenter, PhaseTimings, ResultNavigator, WorkflowPhase,
};
