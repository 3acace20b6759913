use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::intake::{Gender, ValidatedPhoto};
use crate::upload::classifier::FaceClassifierClient;
use crate::upload::errors::UploadError;

/// The selected file as handed over by the rendering collaborator.
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    /// Step 1 of the pipeline: the declared media type must begin with an
    /// image indicator.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Step 2: encode the file into a preview data URI and re-validate the
/// produced payload before it is ever rendered.
pub fn encode_preview(file: &PhotoFile) -> Result<String, UploadError> {
    let uri = format!(
        "data:{};base64,{}",
        file.mime_type,
        BASE64_STANDARD.encode(&file.bytes)
    );
    validate_data_uri(&uri)?;
    Ok(uri)
}

/// A well-formed preview URI has exactly one header/data separator, an
/// image header with a base64 marker, and a decodable payload.
pub(crate) fn validate_data_uri(uri: &str) -> Result<(), UploadError> {
    let encoding_error = |reason: &str| UploadError::EncodingError {
        reason: reason.to_string(),
    };

    if uri.matches(',').count() != 1 {
        return Err(encoding_error("expected exactly one header/data separator"));
    }
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| encoding_error("missing header/data separator"))?;
    if !header.starts_with("data:image/") {
        return Err(encoding_error("header does not declare an image type"));
    }
    if !header.ends_with(";base64") {
        return Err(encoding_error("header does not declare base64 data"));
    }
    BASE64_STANDARD
        .decode(payload)
        .map_err(|_| encoding_error("data segment is not valid base64"))?;
    Ok(())
}

/// Clears the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The photo validation/upload pipeline.
///
/// Uploads are serialized: a second submission while one is pending fails
/// with `UploadInFlight`, and the presenter's busy indicator keeps the
/// upload control disabled for the duration of the remote call, so the
/// error path is unreachable from a well-behaved UI.
#[derive(Debug)]
pub struct UploadPipeline {
    classifier: FaceClassifierClient,
    in_flight: AtomicBool,
}

impl UploadPipeline {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            classifier: FaceClassifierClient::new(endpoint, timeout),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run the full pipeline: type check, preview encoding, remote
    /// classification. Returns a fully formed ValidatedPhoto or the first
    /// failure; no partial photo state ever escapes.
    pub async fn submit_photo(
        &self,
        file: &PhotoFile,
        gender: Option<Gender>,
        age: Option<u8>,
    ) -> Result<ValidatedPhoto, UploadError> {
        if !file.is_image() {
            warn!(mime_type = %file.mime_type, "rejected non-image upload before any network call");
            return Err(UploadError::InvalidFileType {
                mime_type: file.mime_type.clone(),
            });
        }

        let guard = self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| InFlightGuard(&self.in_flight))
            .map_err(|_| UploadError::UploadInFlight)?;

        let attempt_id = uuid::Uuid::new_v4();
        debug!(
            attempt = %attempt_id,
            file = %file.name,
            bytes = file.bytes.len(),
            "starting photo validation"
        );

        let preview_data_uri = encode_preview(file)?;
        let classification = self.classifier.classify(file, gender, age).await?;

        info!(
            attempt = %attempt_id,
            shape_index = classification.shape_index,
            shape = %classification.shape_name,
            "photo classified"
        );
        drop(guard);

        Ok(ValidatedPhoto {
            raw_bytes: file.bytes.clone(),
            mime_type: file.mime_type.clone(),
            preview_data_uri,
            classification_index: classification.shape_index,
            classification_label: classification.shape_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg_file() -> PhotoFile {
        PhotoFile {
            name: "face.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    #[test]
    fn preview_encoding_round_trips() {
        let file = jpeg_file();
        let uri = encode_preview(&file).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));

        let payload = uri.split_once(',').unwrap().1;
        assert_eq!(BASE64_STANDARD.decode(payload).unwrap(), file.bytes);
    }

    #[test]
    fn data_uri_validation_rejects_extra_separators() {
        let err = validate_data_uri("data:image/png;base64,AQID,extra").unwrap_err();
        assert!(matches!(err, UploadError::EncodingError { .. }));
    }

    #[test]
    fn data_uri_validation_rejects_non_image_header() {
        let err = validate_data_uri("data:text/plain;base64,AQID").unwrap_err();
        assert!(matches!(err, UploadError::EncodingError { .. }));
    }

    #[test]
    fn data_uri_validation_rejects_missing_base64_marker() {
        let err = validate_data_uri("data:image/png,AQID").unwrap_err();
        assert!(matches!(err, UploadError::EncodingError { .. }));
    }

    #[test]
    fn data_uri_validation_rejects_bad_payload() {
        let err = validate_data_uri("data:image/png;base64,not~base64!").unwrap_err();
        assert!(matches!(err, UploadError::EncodingError { .. }));
    }

    #[tokio::test]
    async fn non_image_file_fails_without_touching_the_network() {
        // Endpoint that cannot resolve: reaching it would fail differently.
        let pipeline = UploadPipeline::new("http://invalid.invalid/classify", Duration::from_secs(1));
        let file = PhotoFile {
            name: "notes.txt".to_string(),
            mime_type: "text/plain".to_string(),
            bytes: b"hello".to_vec(),
        };

        let err = pipeline.submit_photo(&file, None, None).await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidFileType { .. }));
        assert!(!pipeline.is_busy());
    }
}
