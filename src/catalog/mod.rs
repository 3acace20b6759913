// Catalog Store - static product data access with a per-session cache

pub mod store;

pub use store::{CatalogEntry, CatalogError, CatalogSource, CatalogStore};
