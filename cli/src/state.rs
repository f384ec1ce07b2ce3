//! State file handling.

use anyhow::{bail, Context as _};
use permit_governance::Governance;
use std::path::Path;

pub fn load(path: &Path) -> anyhow::Result<Governance> {
    let bytes = std::fs::read(path).with_context(|| {
        format!("reading state file {} (run `permit init` first)", path.display())
    })?;
    let governance = Governance::load_state(&bytes)
        .with_context(|| format!("decoding state file {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "state loaded");
    Ok(governance)
}

/// Write the state next to `path` and move it into place.
pub fn save(path: &Path, governance: &Governance) -> anyhow::Result<()> {
    let bytes = governance.save_state()?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &bytes).with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "state saved");
    Ok(())
}

/// Write a fresh state, refusing to clobber an existing one unless forced.
pub fn create(path: &Path, governance: &Governance, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("state file {} already exists (use --force to overwrite)", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    save(path, governance)
}
