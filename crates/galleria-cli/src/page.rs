//! Page files: the editable regions of a page, as JSON.
//!
//! ```json
//! { "heroTitle": { "markup": "Hello" },
//!   "timelineHTML": { "markup": "<li>…</li>", "composite": true } }
//! ```

use anyhow::{Context, Result};
use galleria_core::RegionMap;
use std::path::Path;

pub fn load(path: &Path) -> Result<RegionMap> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("reading page file {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing page file {}", path.display()))
}

pub fn save(path: &Path, page: &RegionMap) -> Result<()> {
    let json = serde_json::to_string_pretty(page)?;
    std::fs::write(path, json).with_context(|| format!("writing page file {}", path.display()))
}

/// Split `id=markup`; markup may itself contain `=`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((id, markup)) if !id.trim().is_empty() => {
            Ok((id.trim().to_string(), markup.to_string()))
        }
        _ => Err(format!("expected ID=MARKUP, got {s:?}")),
    }
}
