// Intake Form State - the three required selections and submit readiness

pub mod age;
pub mod selection;

pub use age::{validate_age, AgeValidation, AGE_MAX, AGE_MIN};
pub use selection::{Gender, IntakeSelection, ValidatedPhoto};
