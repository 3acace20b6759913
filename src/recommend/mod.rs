// Recommendation Resolver - classification index to catalog entry

pub mod resolver;

pub use resolver::{resolve, RecommendError};
