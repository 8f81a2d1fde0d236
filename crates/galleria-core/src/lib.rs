//! galleria-core: photo records, local persistence, view building, HTML
//! projection, edit mode and best-effort sync for a static gallery page.

pub mod edit;
mod error;
pub mod gallery;
pub mod gesture;
pub mod manifest;
pub mod model;
pub mod render;
pub mod repo;
pub mod store;
pub mod sync;
pub mod upload;
pub mod view;

pub use edit::{EditState, EditableRegionRegistry, RegionMap, TextSnapshot, Transition};
pub use error::InputError;
pub use gallery::{Gallery, ThemeState};
pub use manifest::{load_manifest, FileManifest, ManifestSource, NoManifest};
pub use model::{normalize, PhotoRecord, RawPhoto};
pub use repo::Repository;
pub use store::{KvStore, MemStore, StoreImpl};
pub use sync::{SyncDispatcher, SyncPayload, SyncTransport};
pub use upload::{AddByPath, CompactOptions, UploadForm};
pub use view::{build_view, FilterState};

#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
