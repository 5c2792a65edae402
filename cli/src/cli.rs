//! CLI definitions for deckhand
//!
//! This module contains all CLI argument parsing structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::{TagOptions, TargetOptions};
use crate::infrastructure::CredentialOptions;

#[derive(Parser)]
#[command(
    name = "deckhand",
    version,
    about = "Deploy-time companion for Helm charts",
    long_about = "Composes the service values document handed to Helm charts at deploy time:\nimage references, deploy target and git provenance for a project."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (to stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Helm deploy helpers
    Helm {
        #[command(subcommand)]
        command: HelmCommands,
    },
}

/// Helm subcommands
#[derive(Subcommand)]
pub enum HelmCommands {
    /// Print the service values document as YAML
    GetServiceValues(GetServiceValuesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GetServiceValuesArgs {
    /// Project directory
    #[arg(long, env = "DECKHAND_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Project config file (default: <dir>/deckhand.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Temporary directory for per-run working data
    #[arg(long, env = "DECKHAND_TMP_DIR")]
    pub tmp_dir: Option<PathBuf>,

    /// Images repo; empty means no registry is consulted
    #[arg(long, env = "DECKHAND_IMAGES_REPO")]
    pub images_repo: Option<String>,

    /// Registry username
    #[arg(long, env = "DECKHAND_REGISTRY_USERNAME")]
    pub registry_username: Option<String>,

    /// Registry password
    #[arg(long, env = "DECKHAND_REGISTRY_PASSWORD", hide_env_values = true)]
    pub registry_password: Option<String>,

    /// Deploy environment
    #[arg(long, env = "DECKHAND_ENV")]
    pub env: Option<String>,

    /// Kubernetes namespace (default: derived from project and environment)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Custom image tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Tag images with the current git branch
    #[arg(long)]
    pub tag_git_branch: bool,

    /// Tag images with the current git tag
    #[arg(long)]
    pub tag_git_tag: bool,

    /// Tag images with the current git commit
    #[arg(long)]
    pub tag_git_commit: bool,

    /// Tag images from CI variables (CI_COMMIT_TAG or CI_COMMIT_REF_NAME)
    #[arg(long)]
    pub tag_ci: bool,
}

impl GetServiceValuesArgs {
    pub fn credentials(&self) -> CredentialOptions {
        CredentialOptions {
            username: self.registry_username.clone(),
            password: self.registry_password.clone(),
        }
    }

    pub fn target(&self) -> TargetOptions {
        TargetOptions {
            tag: TagOptions {
                custom: self.tag.clone(),
                git_branch: self.tag_git_branch,
                git_tag: self.tag_git_tag,
                git_commit: self.tag_git_commit,
                ci: self.tag_ci,
            },
            namespace: self.namespace.clone(),
            environment: self.env.clone(),
        }
    }
}
