//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod ci;
pub mod image;
pub mod namespace;
pub mod slug;
pub mod tag;
pub mod target;
pub mod values;

// Re-export commonly used types
pub use ci::CiEnv;
pub use image::{resolve_registry_path, RegistryMode};
pub use tag::TagOptions;
pub use target::{resolve_target, DeployTarget, TargetOptions};
pub use values::{GitInfo, ImageInfo, ImageValues, Provenance, ServiceValues};
