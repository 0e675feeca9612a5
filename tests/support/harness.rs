//! Self-contained receive workflow harness
//!
//! ```rust,ignore
//! let harness = Harness::builder()
//!     .with_credentials(proxied_credentials())
//!     .with_pending_notification(LOCATION, "N1")
//!     .build();
//!
//! let path = harness.write_download(b"retrieve;from=+15551234567;tx=TX1");
//! let outcome = harness.receive(harness.event(&path, LOCATION)).await;
//! ```

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use mmsrx::{
    Collaborators, Config, DownloadCompleted, MmsReceiver, Outcome,
    ack::{AckSubmitter, RelayCredentials},
    store::{MemoryNotificationStore, NotificationUri, TestMessageStore},
};
use tempfile::TempDir;

use super::{RecordingHooks, RecordingSubmitter, ScriptedCodec, notification};

pub struct Harness {
    pub receiver: Arc<MmsReceiver>,
    pub messages: TestMessageStore,
    pub notifications: MemoryNotificationStore,
    pub hooks: Arc<RecordingHooks>,
    pub acks: Arc<RecordingSubmitter>,
    dir: TempDir,
    files: AtomicUsize,
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    /// Write `bytes` to a fresh transient file
    pub fn write_download(&self, bytes: &[u8]) -> PathBuf {
        let n = self.files.fetch_add(1, Ordering::SeqCst);
        let path = self.dir.path().join(format!("download-{n}.dat"));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    /// A path inside the harness directory that does not exist
    pub fn missing_download(&self) -> PathBuf {
        self.dir.path().join("never-written.dat")
    }

    pub fn event(&self, path: &Path, location: &str) -> DownloadCompleted {
        DownloadCompleted::new(path, location).with_notification(format!("content://mms/{location}"))
    }

    /// Run one event through `on_receive` and wait for its completion
    pub async fn receive(&self, event: DownloadCompleted) -> Outcome {
        self.receiver.on_receive(event).await
    }

    pub fn pending(&self, location: &str) -> usize {
        self.notifications
            .records_for(location)
            .iter()
            .filter(|record| record.matches(location))
            .count()
    }
}

#[derive(Default)]
pub struct HarnessBuilder {
    config: Config,
    hooks: RecordingHooks,
    pending: Vec<(String, String, String)>,
    fail_persist: bool,
    acks: Option<Arc<dyn AckSubmitter>>,
}

impl HarnessBuilder {
    pub fn with_blocked(mut self, address: &str) -> Self {
        self.hooks.blocked.insert(address.to_string());
        self
    }

    pub fn with_credentials(mut self, credentials: RelayCredentials) -> Self {
        self.hooks.credentials = Some(credentials);
        self
    }

    pub fn with_line_number(mut self, number: &str) -> Self {
        self.hooks.line_number = Some(number.to_string());
        self
    }

    pub fn with_panicking_hooks(mut self) -> Self {
        self.hooks.panic_on_received = true;
        self
    }

    pub fn with_panicking_screen(mut self) -> Self {
        self.hooks.panic_on_screen = true;
        self
    }

    /// Store a pending notification for `location`, referenced by the harness events
    pub fn with_pending_notification(mut self, location: &str, transaction_id: &str) -> Self {
        self.pending.push((
            format!("content://mms/{location}"),
            location.to_string(),
            transaction_id.to_string(),
        ));
        self
    }

    pub fn with_persist_failure(mut self) -> Self {
        self.fail_persist = true;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Use a real submitter (e.g. an acknowledgment lane) instead of recording tasks
    pub fn with_ack_submitter(mut self, acks: Arc<dyn AckSubmitter>) -> Self {
        self.acks = Some(acks);
        self
    }

    pub fn build(self) -> Harness {
        let messages = TestMessageStore::new();
        messages.fail_persist(self.fail_persist);

        let notifications = MemoryNotificationStore::new();
        for (uri, location, transaction_id) in &self.pending {
            notifications.insert_pending(
                NotificationUri::from(uri.as_str()),
                notification(location, transaction_id),
            );
        }

        let hooks = Arc::new(self.hooks);
        let recording = Arc::new(RecordingSubmitter::default());
        let acks = self
            .acks
            .unwrap_or_else(|| Arc::clone(&recording) as Arc<dyn AckSubmitter>);

        let receiver = MmsReceiver::new(
            &self.config,
            Collaborators {
                codec: Arc::new(ScriptedCodec),
                messages: Arc::new(messages.clone()),
                notifications: Arc::new(notifications.clone()),
                hooks: Arc::clone(&hooks) as Arc<dyn mmsrx::ReceiveHooks>,
            },
            acks,
        );

        Harness {
            receiver: Arc::new(receiver),
            messages,
            notifications,
            hooks,
            acks: recording,
            dir: tempfile::tempdir().unwrap(),
            files: AtomicUsize::new(0),
        }
    }
}
