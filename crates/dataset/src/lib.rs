//! # BearCart Dataset Crate
//!
//! This crate turns a transaction export on disk into an immutable, typed,
//! in-memory `Dataset`. It is the only part of the system that touches files.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** `polars` does the file parsing. Everything past the loader
//!   works on plain `Event` / `Order` values from `core-types`.
//! - **Fail Fast:** a missing column, a value that does not cast to its column
//!   type, or a flag that is not 0/1 aborts the load. No partial datasets.
//! - **Immutable:** a `Dataset` is built once and only handed out by shared
//!   reference, so any number of readers can use it at the same time.
//!
//! ## Public API
//!
//! - `DataLoader`: reads CSV or Parquet files (or CSV bytes) into a `Dataset`.
//! - `DataFormat`: the closed set of supported file formats.
//! - `Dataset` / `DatasetSummary`: the loaded events, derived orders and their shape.
//! - `filter_orders`: the conversion filter with first-wins deduplication.
//! - `DatasetError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod dataset;
pub mod error;
pub mod format;
pub mod loader;
pub mod schema;

// Re-export the key components to create a clean, public-facing API.
pub use dataset::{Dataset, DatasetSummary, filter_orders};
pub use error::DatasetError;
pub use format::DataFormat;
pub use loader::DataLoader;
pub use schema::{REQUIRED_COLUMNS, events_from_frame};
