//! Best-effort push of owner state to an optional remote endpoint.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};

use crate::edit::TextSnapshot;
use crate::model::RawPhoto;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePayload {
    pub bg: Option<String>,
}

/// Everything the owner changed locally, as sent to the sync endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPayload {
    pub texts: TextSnapshot,
    pub photos: Vec<RawPhoto>,
    pub theme: ThemePayload,
    pub hero: Option<String>,
}

pub trait SyncTransport: Send + Sync {
    fn push(&self, payload: &SyncPayload) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Delivered,
    Failed,
}

/// A push in flight. Only a host shutting down joins it, to let the
/// outcome reach the log.
pub struct SyncTask {
    handle: JoinHandle<SyncOutcome>,
}

impl SyncTask {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> SyncOutcome {
        self.handle.join().unwrap_or(SyncOutcome::Failed)
    }
}

#[derive(Clone, Default)]
pub struct SyncDispatcher {
    transport: Option<Arc<dyn SyncTransport>>,
}

impl SyncDispatcher {
    /// Dispatcher that never sends anything.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn new(transport: Arc<dyn SyncTransport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// Start one push attempt in the background and return immediately.
    /// No retry follows a failure.
    pub fn dispatch_if_configured(&self, payload: SyncPayload) -> Option<SyncTask> {
        let transport = self.transport.clone()?;
        let spawned = thread::Builder::new()
            .name("galleria-sync".into())
            .spawn(move || match transport.push(&payload) {
                Ok(()) => {
                    tracing::info!(photos = payload.photos.len(), "sync delivered");
                    SyncOutcome::Delivered
                }
                Err(e) => {
                    tracing::warn!(error = %e, "sync failed; local state is unaffected");
                    SyncOutcome::Failed
                }
            });
        match spawned {
            Ok(handle) => Some(SyncTask { handle }),
            Err(e) => {
                tracing::warn!(error = %e, "could not start sync");
                None
            }
        }
    }
}

#[cfg(feature = "http")]
pub mod http {
    use super::{SyncPayload, SyncTransport};
    use std::time::Duration;

    /// POSTs the payload as JSON; any 2xx status counts as delivered.
    pub struct HttpTransport {
        url: String,
        client: reqwest::blocking::Client,
    }

    impl HttpTransport {
        pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()?;
            Ok(Self {
                url: url.into(),
                client,
            })
        }
    }

    impl SyncTransport for HttpTransport {
        fn push(&self, payload: &SyncPayload) -> anyhow::Result<()> {
            let resp = self.client.post(&self.url).json(payload).send()?;
            let status = resp.status();
            if !status.is_success() {
                anyhow::bail!("sync endpoint answered HTTP {}", status);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<SyncPayload>>,
        fail: bool,
    }

    impl SyncTransport for Recorder {
        fn push(&self, payload: &SyncPayload) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(payload.clone());
            if self.fail {
                anyhow::bail!("offline");
            }
            Ok(())
        }
    }

    #[test]
    fn disabled_is_noop() {
        assert!(SyncDispatcher::disabled()
            .dispatch_if_configured(SyncPayload::default())
            .is_none());
    }

    #[test]
    fn pushes_once_and_reports_outcome() {
        let rec = Arc::new(Recorder::default());
        let d = SyncDispatcher::new(rec.clone());
        let payload = SyncPayload {
            hero: Some("images/cover.jpg".into()),
            ..Default::default()
        };
        let task = d.dispatch_if_configured(payload.clone()).expect("task");
        assert_eq!(task.join(), SyncOutcome::Delivered);
        assert_eq!(rec.seen.lock().unwrap().as_slice(), &[payload]);
    }

    #[test]
    fn failure_is_terminal() {
        let rec = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let d = SyncDispatcher::new(rec.clone());
        let task = d.dispatch_if_configured(SyncPayload::default()).unwrap();
        assert_eq!(task.join(), SyncOutcome::Failed);
        assert_eq!(rec.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn payload_wire_shape() {
        let mut texts = TextSnapshot::new();
        texts.insert("heroTitle", "Hi");
        let p = SyncPayload {
            texts,
            photos: vec![],
            theme: ThemePayload {
                bg: Some("#fff".into()),
            },
            hero: None,
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"texts":{"heroTitle":"Hi"},"photos":[],"theme":{"bg":"#fff"},"hero":null})
        );
    }
}
