use thiserror::Error;

/// Failures of a single upload attempt. All of these are terminal for that
/// attempt only: the busy indicator resets, the current selection keeps its
/// previous photo, and the user may retry without restarting the flow.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The selected file is not an image; no network call was made.
    #[error("only image files can be uploaded (got {mime_type})")]
    InvalidFileType { mime_type: String },

    /// Producing or re-validating the preview data URI failed.
    #[error("failed to encode photo preview: {reason}")]
    EncodingError { reason: String },

    /// A classification request is already in flight; uploads are
    /// serialized and the upload control stays disabled while one runs.
    #[error("another photo is already being validated")]
    UploadInFlight,

    /// Transport-level fault (connect, timeout, malformed reply). The user
    /// may retry with the same photo.
    #[error("face classification request failed: {reason}")]
    ClassificationRequestFailed { reason: String },

    /// The classifier answered but judged the photo unusable (no face,
    /// several faces, ...). The user should pick a different photo.
    #[error("photo was rejected: {reason}")]
    ClassificationRejected { reason: String },
}
