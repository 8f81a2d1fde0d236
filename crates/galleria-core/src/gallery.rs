//! Session controller: owns the canonical list, filter, edit mode and the
//! repository, and runs every owner action through persist → rebuild → sync.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::edit::{self, EditMode, EditState, EditableRegionRegistry, Transition};
use crate::error::InputError;
use crate::gesture::LongPress;
use crate::manifest::{load_manifest, ManifestSource};
use crate::model::{normalize, PhotoRecord, RawPhoto};
use crate::render::{project, project_tag_options, project_theme};
use crate::repo::Repository;
use crate::sync::{SyncDispatcher, SyncOutcome, SyncPayload, SyncTask, ThemePayload};
use crate::upload::{
    encode_data_url, validate_color, validate_hero_source, AddByPath, CompactOptions, UploadForm,
};
use crate::view::{apply_filter, delete_by_source, merge, tag_options, FilterState};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeState {
    pub background: Option<String>,
    pub hero: Option<String>,
}

pub struct Gallery {
    repo: Repository,
    sync: SyncDispatcher,
    compact: CompactOptions,
    remote: Vec<PhotoRecord>,
    canonical: Vec<PhotoRecord>,
    filter: FilterState,
    edit: EditMode,
    press: LongPress,
    /// Local records whose last write was refused by the store. They stand
    /// in for the persisted list until a later write succeeds.
    unsaved: Option<Vec<RawPhoto>>,
    in_flight: Vec<SyncTask>,
}

impl Gallery {
    /// Session over persisted state only; call [`Gallery::load`] to add
    /// the manifest.
    pub fn open(repo: Repository, sync: SyncDispatcher) -> Self {
        let mut g = Self {
            repo,
            sync,
            compact: CompactOptions::default(),
            remote: Vec::new(),
            canonical: Vec::new(),
            filter: FilterState::default(),
            edit: EditMode::new(),
            press: LongPress::default(),
            unsaved: None,
            in_flight: Vec::new(),
        };
        g.rebuild();
        g
    }

    pub fn with_compact_options(mut self, opts: CompactOptions) -> Self {
        self.compact = opts;
        self
    }

    pub fn load(&mut self, manifest: &dyn ManifestSource) {
        self.remote = load_manifest(manifest);
        self.rebuild();
    }

    /// Re-read local records and merge them ahead of the manifest.
    fn rebuild(&mut self) {
        let local = normalize(self.local_raw());
        self.canonical = merge(&self.remote, &local);
    }

    fn local_raw(&self) -> Vec<RawPhoto> {
        match &self.unsaved {
            Some(list) => list.clone(),
            None => self.repo.local_raw(),
        }
    }

    /// `false` when the store refused the write; the list is then kept for
    /// the rest of the session.
    fn save_local(&mut self, list: Vec<RawPhoto>) -> bool {
        if self.repo.set_local_raw(&list) {
            self.unsaved = None;
            true
        } else {
            tracing::warn!(count = list.len(), "local photos kept in memory only");
            self.unsaved = Some(list);
            false
        }
    }

    /// Whether some local change is held in memory because the store
    /// refused it.
    pub fn has_unsaved_photos(&self) -> bool {
        self.unsaved.is_some()
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn canonical(&self) -> &[PhotoRecord] {
        &self.canonical
    }

    pub fn remote(&self) -> &[PhotoRecord] {
        &self.remote
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.filter.tag = tag.into();
    }

    pub fn view(&self) -> Vec<PhotoRecord> {
        apply_filter(&self.canonical, &self.filter)
    }

    pub fn render(&self) -> String {
        project(&self.view())
    }

    pub fn tag_options(&self) -> Vec<String> {
        tag_options(&self.canonical)
    }

    pub fn render_tag_options(&self) -> String {
        project_tag_options(&self.tag_options(), &self.filter.tag)
    }

    pub fn add_by_path(&mut self, form: AddByPath) -> Result<PhotoRecord, InputError> {
        let record = form.into_record()?;
        self.persist_new(record)
    }

    pub fn upload(&mut self, form: UploadForm) -> Result<PhotoRecord, InputError> {
        let record = form.into_record(self.compact)?;
        self.persist_new(record)
    }

    fn persist_new(&mut self, record: RawPhoto) -> Result<PhotoRecord, InputError> {
        let added = normalize([record.clone()])
            .pop()
            .ok_or(InputError::MissingField("image"))?;
        let mut saved = self.local_raw();
        saved.insert(0, record);
        self.save_local(saved);
        self.rebuild();
        self.dispatch_sync();
        Ok(added)
    }

    /// Remove every local record whose source is `source`. Manifest
    /// records are never affected.
    pub fn delete(&mut self, source: &str) -> Result<usize, InputError> {
        let (kept, removed) = delete_by_source(self.local_raw(), source);
        if removed == 0 {
            return Err(InputError::NotFound(source.to_string()));
        }
        self.save_local(kept);
        self.rebuild();
        self.dispatch_sync();
        tracing::debug!(source, removed, "deleted local photos");
        Ok(removed)
    }

    /// Pointer down on a photo; held long enough, it deletes.
    pub fn press_photo(&mut self, source: &str, now: Instant) {
        self.press.press(source, now);
    }

    pub fn release_photo(&mut self) {
        self.press.release();
    }

    /// Timer tick. Deletes the pressed photo once the hold threshold has
    /// passed; `None` while nothing is due.
    pub fn poll_press(&mut self, now: Instant) -> Option<Result<usize, InputError>> {
        let source = self.press.poll(now)?;
        Some(self.delete(&source))
    }

    pub fn edit_state(&self) -> EditState {
        self.edit.state()
    }

    /// Flip edit mode. Leaving it saves changed text and syncs.
    pub fn toggle_edit(&mut self, registry: &mut dyn EditableRegionRegistry) -> Transition {
        let transition = self.edit.toggle(registry);
        if let Transition::Exited {
            changed: Some(snapshot),
        } = &transition
        {
            let merged = self.repo.texts().merged(snapshot);
            self.repo.set_texts(&merged);
            self.dispatch_sync();
        }
        transition
    }

    /// Apply saved text to the page. Safe to call repeatedly.
    pub fn restore_texts(&self, registry: &mut dyn EditableRegionRegistry) -> usize {
        edit::restore(&self.repo.texts(), registry)
    }

    pub fn theme(&self) -> ThemeState {
        ThemeState {
            background: self.repo.background(),
            hero: self.repo.hero(),
        }
    }

    pub fn render_theme(&self) -> String {
        let theme = self.theme();
        project_theme(theme.background.as_deref(), theme.hero.as_deref())
    }

    pub fn set_background(&mut self, color: &str) -> Result<String, InputError> {
        let color = validate_color(color)?;
        self.repo.set_background(&color);
        self.dispatch_sync();
        Ok(color)
    }

    pub fn set_hero(&mut self, source: &str) -> Result<(), InputError> {
        let source = validate_hero_source(source)?;
        self.repo.set_hero(source);
        self.dispatch_sync();
        Ok(())
    }

    /// Compact an image file into a data URI and use it as the hero.
    pub fn upload_hero(&mut self, bytes: &[u8]) -> Result<(), InputError> {
        let url = encode_data_url(bytes, self.compact)?;
        self.set_hero(&url)
    }

    pub fn sync_payload(&self) -> SyncPayload {
        SyncPayload {
            texts: self.repo.texts(),
            photos: self.local_raw(),
            theme: ThemePayload {
                bg: self.repo.background(),
            },
            hero: self.repo.hero(),
        }
    }

    fn dispatch_sync(&mut self) {
        if !self.sync.is_configured() {
            return;
        }
        self.reap_sync();
        if let Some(task) = self.sync.dispatch_if_configured(self.sync_payload()) {
            self.in_flight.push(task);
        }
    }

    /// Drop handles of pushes that already finished; their outcome was
    /// logged by the push thread.
    fn reap_sync(&mut self) {
        self.in_flight.retain(|task| !task.is_finished());
    }

    /// Pushes not yet finished.
    pub fn pending_sync(&mut self) -> usize {
        self.reap_sync();
        self.in_flight.len()
    }

    /// Push current state now and wait for the outcome; `None` when no
    /// endpoint is configured. For an explicit owner request only.
    pub fn sync_now(&self) -> Option<SyncOutcome> {
        self.sync
            .dispatch_if_configured(self.sync_payload())
            .map(SyncTask::join)
    }

    /// Join pushes still in flight. For host shutdown only.
    pub fn wait_for_sync(&mut self) -> Vec<SyncOutcome> {
        self.in_flight.drain(..).map(SyncTask::join).collect()
    }
}
