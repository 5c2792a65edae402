//! Best-effort git provenance

use tracing::warn;

use crate::domain::{CiEnv, GitInfo, Provenance};
use crate::infrastructure::ProvenanceSource;

/// Collect provenance for the deployment.
///
/// CI variables describe the ref being deployed and win over the local
/// checkout. A missing or broken repository yields `Provenance::Unknown`.
pub async fn collect_provenance(source: &dyn ProvenanceSource, ci: &CiEnv) -> Provenance {
    if let Some(tag) = &ci.commit_tag {
        return Provenance::Known(GitInfo::on_tag(ci.commit_sha.clone(), tag.clone()));
    }
    if let Some(branch) = &ci.commit_ref_name {
        return Provenance::Known(GitInfo::on_branch(ci.commit_sha.clone(), branch.clone()));
    }

    match source.git_info().await {
        Ok(info) => Provenance::Known(info),
        Err(e) => {
            warn!("Git provenance unavailable: {}", e);
            Provenance::Unknown
        }
    }
}
