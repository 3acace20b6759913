//! Face classification endpoint client
//!
//! Wraps the multipart request/response exchange with the remote
//! classifier and folds its response conventions into a single verdict.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::intake::Gender;
use crate::upload::errors::UploadError;
use crate::upload::pipeline::PhotoFile;

/// A successful classifier verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub shape_index: i64,
    pub shape_name: String,
}

/// Raw classifier response. Observed variants carry a `result` flag and/or
/// an `error` string next to the shape fields; any of "non-2xx status",
/// "result:false", or an `error` field means rejection, absence of all
/// three means success.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierResponse {
    pub result: Option<bool>,
    pub error: Option<String>,
    pub shape_index: Option<i64>,
    pub shape_name: Option<String>,
}

impl ClassifierResponse {
    pub fn into_classification(self) -> Result<Classification, UploadError> {
        if let Some(error) = self.error {
            return Err(UploadError::ClassificationRejected { reason: error });
        }
        if self.result == Some(false) {
            return Err(UploadError::ClassificationRejected {
                reason: "classifier reported an unfavorable verdict".to_string(),
            });
        }
        match (self.shape_index, self.shape_name) {
            (Some(shape_index), Some(shape_name)) => Ok(Classification {
                shape_index,
                shape_name,
            }),
            // The photo was never judged, so this is a server fault, not a
            // rejection the user could fix by picking another photo.
            _ => Err(UploadError::ClassificationRequestFailed {
                reason: "classifier response missing shape fields".to_string(),
            }),
        }
    }
}

/// HTTP client for the classification endpoint. The request timeout is the
/// bounded wait guarding against an indefinitely stuck busy state.
#[derive(Debug)]
pub struct FaceClassifierClient {
    client: reqwest::Client,
    endpoint: String,
}

impl FaceClassifierClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the raw file plus the currently-selected gender/age context
    /// (when available) and interpret the response.
    pub async fn classify(
        &self,
        file: &PhotoFile,
        gender: Option<Gender>,
        age: Option<u8>,
    ) -> Result<Classification, UploadError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| UploadError::ClassificationRequestFailed {
                reason: format!("invalid media type for upload: {e}"),
            })?;

        let mut form = Form::new().part("file", part);
        if let Some(gender) = gender {
            form = form.text("gender", gender.as_str());
        }
        if let Some(age) = age {
            form = form.text("age", age.to_string());
        }

        debug!(endpoint = %self.endpoint, "sending classification request");
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::ClassificationRequestFailed {
                reason: request_failure_reason(&e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::ClassificationRejected {
                reason: format!("classifier returned HTTP {status}"),
            });
        }

        let verdict: ClassifierResponse =
            response
                .json()
                .await
                .map_err(|e| UploadError::ClassificationRequestFailed {
                    reason: format!("malformed classifier response: {e}"),
                })?;
        verdict.into_classification()
    }
}

fn request_failure_reason(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("could not reach classifier: {error}")
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> ClassifierResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn plain_shape_fields_are_success() {
        let verdict = response(r#"{"shape_index": 3, "shape_name": "round"}"#)
            .into_classification()
            .unwrap();
        assert_eq!(verdict.shape_index, 3);
        assert_eq!(verdict.shape_name, "round");
    }

    #[test]
    fn result_true_variant_is_success() {
        let verdict = response(r#"{"result": true, "shape_index": 1, "shape_name": "oval"}"#)
            .into_classification()
            .unwrap();
        assert_eq!(verdict.shape_index, 1);
    }

    #[test]
    fn result_false_is_rejection_even_with_shape_fields() {
        let err = response(r#"{"result": false, "shape_index": 1, "shape_name": "oval"}"#)
            .into_classification()
            .unwrap_err();
        assert!(matches!(err, UploadError::ClassificationRejected { .. }));
    }

    #[test]
    fn error_field_is_rejection() {
        let err = response(r#"{"error": "no face detected"}"#)
            .into_classification()
            .unwrap_err();
        match err {
            UploadError::ClassificationRejected { reason } => {
                assert_eq!(reason, "no face detected")
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn missing_shape_fields_without_verdict_is_a_server_fault() {
        let err = response(r#"{"result": true}"#).into_classification().unwrap_err();
        assert!(matches!(
            err,
            UploadError::ClassificationRequestFailed { .. }
        ));
    }
}
