//! Runtime tool path resolution
//!
//! For each external tool (e.g., `skopeo`), we:
//! 1. Check for an environment variable `{TOOL}_BIN` (e.g., `SKOPEO_BIN`)
//! 2. Fall back to PATH-based invocation if the envvar is not set
//!
//! Overriding the envvar is also how tests point at fake binaries.

use std::env;

/// Get the path to an external tool
///
/// Checks `{TOOL}_BIN` (uppercase, `-` replaced by `_`). Falls back to the
/// tool name itself, which relies on PATH.
///
/// ```rust,ignore
/// // With SKOPEO_BIN="/nix/store/abc123-skopeo-1.14.0/bin/skopeo"
/// assert_eq!(get_tool_path(tools::SKOPEO), "/nix/store/abc123-skopeo-1.14.0/bin/skopeo");
/// ```
pub fn get_tool_path(tool: &str) -> String {
    let env_var = format!("{}_BIN", tool.to_uppercase().replace('-', "_"));
    env::var(&env_var).unwrap_or_else(|_| tool.to_string())
}

/// Tool names used by deckhand
pub mod tools {
    pub const SKOPEO: &str = "skopeo";
    pub const GIT: &str = "git";
}
