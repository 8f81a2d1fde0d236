//! In-place text editing: the region registry capability, the two-state
//! edit mode, and snapshot capture/restore.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const TIMELINE_KEY: &str = "timelineHTML";
pub const STORIES_KEY: &str = "storiesHTML";
pub const ABOUT_KEY: &str = "aboutHTML";

/// Containers saved as a whole whenever the page has them.
pub const COMPOSITE_KEYS: [&str; 3] = [TIMELINE_KEY, STORIES_KEY, ABOUT_KEY];

const KEY_TEXT_PREFIX: usize = 24;

/// Stable identifier for a region: its id when it has one, otherwise the
/// tag name joined with the start of its text.
pub fn region_key(id: Option<&str>, tag: &str, text: &str) -> String {
    match id.filter(|s| !s.is_empty()) {
        Some(id) => id.to_string(),
        None => {
            let prefix: String = text.trim().chars().take(KEY_TEXT_PREFIX).collect();
            format!("{}:{}", tag.to_ascii_lowercase(), prefix)
        }
    }
}

/// Saved markup keyed by region identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextSnapshot(BTreeMap<String, String>);

impl TextSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, markup: impl Into<String>) {
        self.0.insert(key.into(), markup.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay `newer` on top of `self`; its keys win.
    pub fn merged(mut self, newer: &TextSnapshot) -> TextSnapshot {
        for (k, v) in newer.iter() {
            self.insert(k, v);
        }
        self
    }
}

impl FromIterator<(String, String)> for TextSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        TextSnapshot(iter.into_iter().collect())
    }
}

/// Capability the page exposes for its editable regions.
pub trait EditableRegionRegistry {
    /// Identifiers of the regions that toggle with edit mode.
    fn list_regions(&self) -> Vec<String>;
    /// Current markup of any region, including composite containers.
    fn get_content(&self, id: &str) -> Option<String>;
    /// Replace a region's markup; `false` when no such region exists.
    fn set_content(&mut self, id: &str, markup: &str) -> bool;
    fn set_editable(&mut self, id: &str, editable: bool);
}

/// Read every listed region plus the composite containers present on this
/// page. Absent composites are left out so a save never blanks the copy
/// another page stored.
pub fn capture(registry: &dyn EditableRegionRegistry) -> TextSnapshot {
    let mut snap = TextSnapshot::new();
    for id in registry.list_regions() {
        if let Some(markup) = registry.get_content(&id) {
            snap.insert(id, markup);
        }
    }
    for key in COMPOSITE_KEYS {
        if let Some(markup) = registry.get_content(key) {
            snap.insert(key, markup);
        }
    }
    snap
}

/// Write saved markup back into existing regions, empty markup included.
/// Keys with no matching region are skipped. Returns how many regions
/// changed.
pub fn restore(snapshot: &TextSnapshot, registry: &mut dyn EditableRegionRegistry) -> usize {
    let mut applied = 0;
    for (key, markup) in snapshot.iter() {
        if registry.get_content(key).as_deref() == Some(markup) {
            continue;
        }
        if registry.set_content(key, markup) {
            applied += 1;
        } else {
            tracing::debug!(key, "no region for saved text; skipped");
        }
    }
    applied
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditState {
    #[default]
    Viewing,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Entered,
    /// Left edit mode. `changed` carries the captured snapshot when it
    /// differs from what the regions held on entry.
    Exited { changed: Option<TextSnapshot> },
}

#[derive(Debug, Default)]
pub struct EditMode {
    state: EditState,
    baseline: Option<TextSnapshot>,
}

impl EditMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state == EditState::Editing
    }

    pub fn toggle(&mut self, registry: &mut dyn EditableRegionRegistry) -> Transition {
        match self.state {
            EditState::Viewing => {
                for id in registry.list_regions() {
                    registry.set_editable(&id, true);
                }
                self.baseline = Some(capture(registry));
                self.state = EditState::Editing;
                Transition::Entered
            }
            EditState::Editing => {
                for id in registry.list_regions() {
                    registry.set_editable(&id, false);
                }
                let now = capture(registry);
                let changed = match self.baseline.take() {
                    Some(before) if before == now => None,
                    _ => Some(now),
                };
                self.state = EditState::Viewing;
                Transition::Exited { changed }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub markup: String,
    #[serde(default)]
    pub editable: bool,
    /// Composite containers are saved and restored but not toggled.
    #[serde(default)]
    pub composite: bool,
}

/// In-memory registry, keyed by region identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionMap {
    regions: BTreeMap<String, Region>,
}

impl RegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, id: &str, markup: &str) -> Self {
        self.insert(id, markup, false);
        self
    }

    pub fn with_composite(mut self, id: &str, markup: &str) -> Self {
        self.insert(id, markup, true);
        self
    }

    pub fn insert(&mut self, id: &str, markup: &str, composite: bool) {
        self.regions.insert(
            id.to_string(),
            Region {
                markup: markup.to_string(),
                editable: false,
                composite,
            },
        );
    }

    pub fn is_editable(&self, id: &str) -> bool {
        self.regions.get(id).map(|r| r.editable).unwrap_or(false)
    }
}

impl EditableRegionRegistry for RegionMap {
    fn list_regions(&self) -> Vec<String> {
        self.regions
            .iter()
            .filter(|(_, r)| !r.composite)
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn get_content(&self, id: &str) -> Option<String> {
        self.regions.get(id).map(|r| r.markup.clone())
    }

    fn set_content(&mut self, id: &str, markup: &str) -> bool {
        match self.regions.get_mut(id) {
            Some(r) => {
                r.markup = markup.to_string();
                true
            }
            None => false,
        }
    }

    fn set_editable(&mut self, id: &str, editable: bool) {
        if let Some(r) = self.regions.get_mut(id) {
            r.editable = editable;
        }
    }
}
