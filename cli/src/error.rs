//! Centralized error types for deckhand
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

/// Top-level error type for service values composition
///
/// Every variant carries the stage that failed so the message is
/// readable without a backtrace.
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("initialization error: {0}")]
    Initialization(#[from] InitError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("docker login failed: {0}")]
    Authentication(#[from] AuthError),

    #[error("error creating service values: {0}")]
    ServiceValues(#[from] ServiceValuesError),
}

/// Process bootstrap errors
#[derive(Error, Debug)]
pub enum InitError {
    #[error("cannot prepare {kind} directory {path}: {source}")]
    Directory {
        kind: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors (project file, tag, namespace)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("project config not found: {path}")]
    FileNotFound { path: String },

    #[error("cannot parse project config {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("required configuration missing: {field}")]
    MissingField { field: String },

    #[error("duplicate image name in project config: {name}")]
    DuplicateImage { name: String },

    #[error("only one tag option may be specified, got: {options}")]
    ConflictingTagOptions { options: String },

    #[error("cannot resolve deploy tag: {reason}")]
    TagUnresolved { reason: String },

    #[error("no namespace configured for environment '{environment}'; set --namespace or deploy.namespace")]
    NamespaceUnresolved { environment: String },

    #[error("namespace template '{template}' renders to an empty namespace")]
    InvalidNamespace { template: String },
}

/// Registry authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("cannot acquire working directory: {0}")]
    Workdir(#[source] std::io::Error),

    #[error("both registry username and password must be specified")]
    IncompleteCredentials,

    #[error("cannot seed docker config from {path}: {source}")]
    SeedConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("login to {registry} rejected: {message}")]
    LoginFailed { registry: String, message: String },
}

/// Errors raised while resolving a single image's info
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageInfoError {
    #[error("image {reference} not found")]
    NotFound { reference: String },

    #[error("registry {registry} unavailable: {message}")]
    RegistryUnavailable { registry: String, message: String },
}

/// Service values assembly failure for one image
#[derive(Error, Debug)]
#[error("image '{image}': {source}")]
pub struct ServiceValuesError {
    pub image: String,
    #[source]
    pub source: ImageInfoError,
}

/// Git operation errors
///
/// Never fatal for composition: provenance falls back to `unknown`.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("not a git repository: {path}")]
    NotARepository { path: String },

    #[error("git command failed: {command}: {message}")]
    CommandFailed { command: String, message: String },
}
