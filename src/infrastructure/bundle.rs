use std::path::Path;
use tracing::info;

use crate::domain::{DomainError, ProfileBundle, Result};

/// Reads the scraper's profile bundle JSON.
pub fn load_bundle(path: &Path) -> Result<ProfileBundle> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| DomainError::config(format!("{}: {e}", path.display())))?;
    let bundle: ProfileBundle = serde_json::from_str(&raw)
        .map_err(|e| DomainError::validation(format!("{}: {e}", path.display())))?;

    info!(
        path = %path.display(),
        subject = %bundle.name,
        sources = bundle.documents().len(),
        "profile bundle loaded"
    );
    Ok(bundle)
}
