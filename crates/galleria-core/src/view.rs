//! Merge local and remote records into the canonical list and derive the
//! filtered view from it.

use serde::{Deserialize, Serialize};

use crate::model::{normalize, PhotoRecord, RawPhoto};

/// Search box and tag select, as last entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub query: String,
    pub tag: String,
}

impl FilterState {
    pub fn new(query: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            tag: tag.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.tag.is_empty()
    }

    pub fn matches(&self, p: &PhotoRecord) -> bool {
        let q = self.query.trim().to_lowercase();
        let in_text = q.is_empty() || p.search_text().contains(&q);
        let in_tag = self.tag.is_empty() || p.has_tag(&self.tag);
        in_text && in_tag
    }
}

/// Local records first, then remote ones, invalid entries dropped.
pub fn merge(remote: &[PhotoRecord], local: &[PhotoRecord]) -> Vec<PhotoRecord> {
    normalize(
        local
            .iter()
            .chain(remote.iter())
            .cloned()
            .map(RawPhoto::from),
    )
}

pub fn apply_filter(list: &[PhotoRecord], filter: &FilterState) -> Vec<PhotoRecord> {
    if filter.is_empty() {
        return list.to_vec();
    }
    list.iter().filter(|p| filter.matches(p)).cloned().collect()
}

pub fn build_view(
    remote: &[PhotoRecord],
    local: &[PhotoRecord],
    filter: &FilterState,
) -> Vec<PhotoRecord> {
    apply_filter(&merge(remote, local), filter)
}

/// Drop every local record whose resolved source equals `source`. Returns
/// the remaining records and how many were removed. Records sharing a
/// source are all removed together.
pub fn delete_by_source(local: Vec<RawPhoto>, source: &str) -> (Vec<RawPhoto>, usize) {
    let before = local.len();
    let kept: Vec<RawPhoto> = local
        .into_iter()
        .filter(|r| r.resolved_source() != Some(source))
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Distinct tags in first-seen order, for the tag select.
pub fn tag_options(list: &[PhotoRecord]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in list.iter().flat_map(|p| p.tags.iter()) {
        if !out.iter().any(|o| o == t) {
            out.push(t.clone());
        }
    }
    out
}
