use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gender selection, serialized as `male`/`female` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// A photo that survived the whole upload pipeline. Never partially
/// populated: either the classification succeeded and all fields are set,
/// or the selection holds no photo at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPhoto {
    pub raw_bytes: Vec<u8>,
    pub mime_type: String,
    pub preview_data_uri: String,
    pub classification_index: i64,
    pub classification_label: String,
}

/// The three required selections. Mutated only by explicit user edits and
/// cleared entirely on restart.
#[derive(Debug, Clone, Default)]
pub struct IntakeSelection {
    gender: Option<Gender>,
    age: Option<u8>,
    photo: Option<ValidatedPhoto>,
}

impl IntakeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff gender is set, age passed range validation, and a fully
    /// formed ValidatedPhoto is present.
    pub fn is_ready(&self) -> bool {
        self.gender.is_some() && self.age.is_some() && self.photo.is_some()
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn age(&self) -> Option<u8> {
        self.age
    }

    pub fn photo(&self) -> Option<&ValidatedPhoto> {
        self.photo.as_ref()
    }

    pub fn set_gender(&mut self, gender: Gender) {
        debug!(gender = gender.as_str(), "gender selected");
        self.gender = Some(gender);
    }

    /// Age is stored only after range validation; out-of-range input clears
    /// any previously stored age.
    pub fn set_age(&mut self, age: Option<u8>) {
        self.age = age;
    }

    /// Each successful upload supersedes the previous photo wholesale.
    pub fn set_photo(&mut self, photo: ValidatedPhoto) {
        debug!(
            shape_index = photo.classification_index,
            shape = %photo.classification_label,
            "validated photo attached"
        );
        self.photo = Some(photo);
    }

    /// Restart: drop everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
