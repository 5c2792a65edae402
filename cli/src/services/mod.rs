//! Services layer - orchestration logic
//!
//! This module coordinates between domain logic and infrastructure.
//! Services use infrastructure adapters to perform I/O operations.

pub mod composer;
pub mod image_info;
pub mod provenance;
pub mod service_values;

// Re-export commonly used types
pub use composer::{ComposeRequest, Composer};
