//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - Container registries (skopeo)
//! - Git checkouts
//! - Filesystem workspace (tmp/home directories)

pub mod auth;
pub mod git;
pub mod registry;
pub mod workspace;

// Re-export commonly used types
pub use auth::{CredentialOptions, RegistryAuthenticator};
pub use git::{GitClient, ProvenanceSource};
pub use registry::{RegistryClient, SkopeoClientFactory};
pub use workspace::Workspace;
