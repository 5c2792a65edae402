//! Slug helpers for Kubernetes namespaces and Docker tags.

use sha2::{Digest, Sha256};

const NAMESPACE_MAX_LEN: usize = 63;
const DOCKER_TAG_MAX_LEN: usize = 128;
const HASH_SUFFIX_LEN: usize = 8;

fn short_hash(input: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(input.as_bytes()));
    digest[..HASH_SUFFIX_LEN].to_string()
}

/// Cut `slug` to `max_len` keeping a hash of the original input.
fn truncate_with_hash(slug: String, original: &str, max_len: usize, separator: char) -> String {
    if slug.len() <= max_len {
        return slug;
    }
    let keep = max_len - HASH_SUFFIX_LEN - 1;
    let head = slug[..keep].trim_end_matches(separator);
    format!("{}{}{}", head, separator, short_hash(original))
}

/// Convert arbitrary input into a DNS-1123 label usable as a namespace.
///
/// # Examples
/// - `Demo_Staging` -> `demo-staging`
/// - `--feature/JIRA-1--` -> `feature-jira-1`
pub fn kubernetes_namespace(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-').to_string();
    truncate_with_hash(slug, input, NAMESPACE_MAX_LEN, '-')
}

/// Convert arbitrary input into a valid Docker tag.
///
/// Docker tags allow `[A-Za-z0-9_.-]`, at most 128 characters, and must not
/// start with `.` or `-`.
pub fn docker_tag(input: &str) -> String {
    let slug: String = input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug.trim_start_matches(['.', '-']).to_string();
    truncate_with_hash(slug, input, DOCKER_TAG_MAX_LEN, '-')
}
