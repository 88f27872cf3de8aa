//! Single-flight import orchestrator.
//!
//! [`Importer`] owns the job state machine, checks trigger preconditions,
//! drives the matching catalog adapter, and resets to idle when the job
//! settles. The reset is tied to a drop guard, so it also happens when the
//! sink panics or a spawned job is aborted.

mod guard;
mod state;

pub use state::{ImportEvent, ImportJob, ImportState};

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::{CatalogKind, Config, ImportReport};
use crate::sources::{Amazon, GoogleBooks, OpenLibrary, PenguinRandomHouse, RecordSink, drive};
use crate::utils::http::CatalogTransport;

/// Host callbacks for the record-targeted jobs.
pub trait RecordActions: Send + Sync {
    fn edit(&self, record_id: &str);
    fn delete(&self, record_id: &str);
}

/// Everything the host supplies when constructing an importer.
#[derive(Default)]
pub struct ImporterInputs {
    pub author_name: String,
    pub sink: Option<Arc<dyn RecordSink>>,
    pub open_library_keys: Vec<String>,
    pub penguin_keys: Vec<String>,
    pub actions: Option<Arc<dyn RecordActions>>,
}

/// Cheaply cloneable handle to one importer.
#[derive(Clone)]
pub struct Importer {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<ImportState>,
    transport: Arc<dyn CatalogTransport>,
    sink: Option<Arc<dyn RecordSink>>,
    actions: Option<Arc<dyn RecordActions>>,
    google: GoogleBooks,
    open_library: OpenLibrary,
    penguin: PenguinRandomHouse,
    amazon: Amazon,
}

/// Returns the state machine to idle when dropped.
struct JobReset(Arc<Inner>);

impl Drop for JobReset {
    fn drop(&mut self) {
        self.0
            .state
            .send_if_modified(|state| state.transition(ImportEvent::Finish));
    }
}

impl Importer {
    pub fn new(
        config: &Config,
        transport: Arc<dyn CatalogTransport>,
        inputs: ImporterInputs,
    ) -> Self {
        let state = ImportState::new(
            inputs.author_name,
            inputs.sink.is_some(),
            inputs.open_library_keys,
            inputs.penguin_keys,
        );
        let (state, _) = watch::channel(state);

        Self {
            inner: Arc::new(Inner {
                state,
                transport,
                sink: inputs.sink,
                actions: inputs.actions,
                google: GoogleBooks::new(&config.google),
                open_library: OpenLibrary::new(&config.open_library),
                penguin: PenguinRandomHouse::new(&config.penguin),
                amazon: Amazon::new(&config.amazon),
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ImportState {
        self.inner.state.borrow().clone()
    }

    /// Watch every state change.
    pub fn subscribe(&self) -> watch::Receiver<ImportState> {
        self.inner.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn is_disabled(&self, kind: CatalogKind) -> bool {
        self.inner.state.borrow().is_disabled(kind)
    }

    pub fn set_author_name(&self, author_name: impl Into<String>) {
        let author_name = author_name.into();
        self.inner
            .state
            .send_modify(|state| state.author_name = author_name);
    }

    pub fn set_open_library_keys(&self, keys: Vec<String>) {
        self.inner
            .state
            .send_modify(|state| state.open_library_keys = keys);
    }

    pub fn set_penguin_keys(&self, keys: Vec<String>) {
        self.inner.state.send_modify(|state| state.penguin_keys = keys);
    }

    /// Start an import in a background task.
    ///
    /// The state moves to running before this returns, so any trigger
    /// fired afterwards is rejected until the task settles. Returns `None`
    /// when the trigger was rejected. Must be called within a tokio runtime.
    pub fn trigger(&self, kind: CatalogKind) -> Option<JoinHandle<ImportReport>> {
        if !self.begin(kind) {
            return None;
        }
        let reset = JobReset(Arc::clone(&self.inner));
        let this = self.clone();
        Some(tokio::spawn(async move {
            let _reset = reset;
            this.import(kind).await
        }))
    }

    /// Run an import to completion on the current task.
    ///
    /// Returns `None` when the trigger was rejected.
    pub async fn run(&self, kind: CatalogKind) -> Option<ImportReport> {
        if !self.begin(kind) {
            return None;
        }
        let _reset = JobReset(Arc::clone(&self.inner));
        Some(self.import(kind).await)
    }

    /// Pass `record_id` to the host's edit callback.
    pub fn edit(&self, record_id: impl Into<String>) -> bool {
        self.passthrough(ImportEvent::Edit(record_id.into()))
    }

    /// Pass `record_id` to the host's delete callback.
    pub fn delete(&self, record_id: impl Into<String>) -> bool {
        self.passthrough(ImportEvent::Delete(record_id.into()))
    }

    fn begin(&self, kind: CatalogKind) -> bool {
        let started = self
            .inner
            .state
            .send_if_modified(|state| state.transition(ImportEvent::Start(kind)));
        if !started {
            log::debug!("Ignoring {} import trigger", kind);
        }
        started
    }

    async fn import(&self, kind: CatalogKind) -> ImportReport {
        let Some(sink) = self.inner.sink.as_deref() else {
            return ImportReport::begin(kind).finish();
        };

        let queries = {
            let state = self.inner.state.borrow();
            match kind {
                CatalogKind::Google | CatalogKind::Amazon => {
                    vec![state.author_name.trim().to_string()]
                }
                CatalogKind::OpenLibrary => state.open_library_keys.clone(),
                CatalogKind::Penguin => state.penguin_keys.clone(),
            }
        };

        let inner = &*self.inner;
        let transport = inner.transport.as_ref();
        match kind {
            CatalogKind::Google => drive(&inner.google, transport, &queries, sink).await,
            CatalogKind::OpenLibrary => {
                drive(&inner.open_library, transport, &queries, sink).await
            }
            CatalogKind::Penguin => drive(&inner.penguin, transport, &queries, sink).await,
            CatalogKind::Amazon => drive(&inner.amazon, transport, &queries, sink).await,
        }
    }

    fn passthrough(&self, event: ImportEvent) -> bool {
        let state = &self.inner.state;
        if !state.send_if_modified(|s| s.transition(event)) {
            log::debug!("Ignoring record action while a job is active");
            return false;
        }
        let _reset = JobReset(Arc::clone(&self.inner));

        let mut job = ImportJob::Idle;
        let mut target = None;
        state.send_modify(|s| {
            job = s.active_job;
            target = s.pending_target_id.take();
        });

        match (target, &self.inner.actions) {
            (Some(id), Some(actions)) => match job {
                ImportJob::Editing => actions.edit(&id),
                ImportJob::Deleting => actions.delete(&id),
                _ => {}
            },
            (Some(id), None) => log::debug!("No record actions registered, dropping {}", id),
            (None, _) => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    use crate::models::BookRecord;
    use crate::testing::{CollectingSink, ScriptedTransport, assert_canonical};

    const GOOGLE_URL: &str =
        "https://www.googleapis.com/books/v1/volumes?q=inauthor%3A%22Jane+Doe%22";
    const TWO_BOOKS: &str =
        r#"{"items":[{"volumeInfo":{"title":"Book A"}},{"volumeInfo":{"title":"Book B"}}]}"#;

    fn importer(
        transport: Arc<ScriptedTransport>,
        sink: Option<Arc<dyn RecordSink>>,
        author_name: &str,
    ) -> Importer {
        Importer::new(
            &Config::default(),
            transport,
            ImporterInputs {
                author_name: author_name.to_string(),
                sink,
                ..ImporterInputs::default()
            },
        )
    }

    fn assert_idle(importer: &Importer) {
        let state = importer.state();
        assert_eq!(state.active_job, ImportJob::Idle);
        assert!(!state.is_loading);
    }

    #[derive(Default)]
    struct RecordingActions {
        calls: Mutex<Vec<String>>,
    }

    impl RecordActions for RecordingActions {
        fn edit(&self, record_id: &str) {
            self.calls.lock().unwrap().push(format!("edit:{record_id}"));
        }

        fn delete(&self, record_id: &str) {
            self.calls.lock().unwrap().push(format!("delete:{record_id}"));
        }
    }

    #[tokio::test]
    async fn test_jane_doe_end_to_end() {
        let transport = Arc::new(ScriptedTransport::new().respond(GOOGLE_URL, TWO_BOOKS));
        let watcher: Arc<OnceLock<watch::Receiver<ImportState>>> = Arc::new(OnceLock::new());
        let observed = Arc::new(Mutex::new(Vec::new()));

        let sink = {
            let watcher = Arc::clone(&watcher);
            let observed = Arc::clone(&observed);
            move |record: BookRecord| {
                assert_canonical(&record);
                let loading = watcher.get().map(|rx| rx.borrow().is_loading);
                observed.lock().unwrap().push((record.title, loading));
            }
        };
        let importer = importer(transport.clone(), Some(Arc::new(sink)), "Jane Doe");
        watcher.set(importer.subscribe()).unwrap();

        assert!(!importer.is_loading());
        let report = importer.run(CatalogKind::Google).await.unwrap();
        assert!(!importer.is_loading());

        assert!(report.is_success());
        assert_eq!(report.records_emitted, 2);
        assert_eq!(
            *observed.lock().unwrap(),
            vec![
                ("Book A".to_string(), Some(true)),
                ("Book B".to_string(), Some(true))
            ]
        );
        assert_idle(&importer);
    }

    #[tokio::test]
    async fn test_second_trigger_is_ignored_while_running() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(GOOGLE_URL, TWO_BOOKS)
                .gated(),
        );
        let sink = Arc::new(CollectingSink::default());
        let importer = importer(transport.clone(), Some(sink.clone()), "Jane Doe");

        let handle = importer.trigger(CatalogKind::Google).unwrap();
        assert_eq!(importer.state().active_job, ImportJob::GoogleRunning);
        assert!(importer.is_loading());

        assert!(importer.trigger(CatalogKind::Google).is_none());
        assert!(importer.trigger(CatalogKind::Amazon).is_none());
        assert!(importer.run(CatalogKind::Amazon).await.is_none());
        assert!(!importer.edit("r1"));
        assert!(!importer.delete("r1"));
        assert!(CatalogKind::ALL.iter().all(|k| importer.is_disabled(*k)));

        transport.release(1);
        let report = handle.await.unwrap();

        assert_eq!(report.records_emitted, 2);
        assert_eq!(transport.calls(), vec![GOOGLE_URL]);
        assert_eq!(transport.max_in_flight(), 1);
        assert_eq!(sink.titles(), vec!["Book A", "Book B"]);
        assert_idle(&importer);

        // Idle again: the next trigger is accepted.
        let handle = importer.trigger(CatalogKind::Google).unwrap();
        transport.release(1);
        handle.await.unwrap();
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_import_resets_state() {
        let transport = Arc::new(ScriptedTransport::new().fail(GOOGLE_URL));
        let sink = Arc::new(CollectingSink::default());
        let importer = importer(transport, Some(sink.clone()), "Jane Doe");

        let report = importer.run(CatalogKind::Google).await.unwrap();

        assert!(report.failure.is_some());
        assert!(sink.records().is_empty());
        assert_idle(&importer);
    }

    #[tokio::test]
    async fn test_partial_failure_resets_state() {
        let page = |offset: usize| {
            format!("https://openlibrary.org/authors/OL1A/works.json?limit=100&offset={offset}")
        };
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(
                    &page(0),
                    r#"{"links":{"next":"p2"},"entries":[{"title":"Kept"}]}"#,
                )
                .fail(&page(100)),
        );
        let sink = Arc::new(CollectingSink::default());
        let importer = Importer::new(
            &Config::default(),
            transport,
            ImporterInputs {
                author_name: "Jane Doe".to_string(),
                sink: Some(sink.clone()),
                open_library_keys: vec!["OL1A".to_string()],
                ..ImporterInputs::default()
            },
        );

        let report = importer.run(CatalogKind::OpenLibrary).await.unwrap();

        assert!(!report.is_success());
        assert_eq!(sink.titles(), vec!["Kept"]);
        assert_idle(&importer);
    }

    #[tokio::test]
    async fn test_panicking_sink_still_resets_state() {
        let transport = Arc::new(ScriptedTransport::new().respond(GOOGLE_URL, TWO_BOOKS));
        let sink = |record: BookRecord| {
            if !record.title.is_empty() {
                panic!("sink exploded on {}", record.title);
            }
        };
        let importer = importer(transport, Some(Arc::new(sink)), "Jane Doe");

        let handle = importer.trigger(CatalogKind::Google).unwrap();

        assert!(handle.await.unwrap_err().is_panic());
        assert_idle(&importer);
    }

    #[tokio::test]
    async fn test_aborted_job_resets_state() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(GOOGLE_URL, TWO_BOOKS)
                .gated(),
        );
        let sink = Arc::new(CollectingSink::default());
        let importer = importer(transport.clone(), Some(sink), "Jane Doe");

        let handle = importer.trigger(CatalogKind::Google).unwrap();
        tokio::task::yield_now().await;
        handle.abort();

        assert!(handle.await.unwrap_err().is_cancelled());
        assert_idle(&importer);
    }

    #[tokio::test]
    async fn test_guard_rejects_without_fetching() {
        let transport = Arc::new(ScriptedTransport::new().respond(GOOGLE_URL, TWO_BOOKS));
        let sink: Arc<dyn RecordSink> = Arc::new(CollectingSink::default());

        let nameless = importer(transport.clone(), Some(sink.clone()), "");
        assert!(nameless.state().disable_google_import);
        assert!(nameless.run(CatalogKind::Google).await.is_none());
        assert!(nameless.trigger(CatalogKind::Google).is_none());
        assert_idle(&nameless);

        let keyless = importer(transport.clone(), Some(sink), "Jane Doe");
        assert!(keyless.is_disabled(CatalogKind::OpenLibrary));
        assert!(keyless.run(CatalogKind::OpenLibrary).await.is_none());
        assert!(keyless.run(CatalogKind::Penguin).await.is_none());

        let sinkless = importer(transport.clone(), None, "Jane Doe");
        assert!(sinkless.run(CatalogKind::Amazon).await.is_none());

        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_keys_can_change_between_calls() {
        let page = "https://api.penguinrandomhouse.com/resources/v2/title/domains/PRH.US/authors/2150/titles?rows=10&start=0";
        let transport = Arc::new(
            ScriptedTransport::new().respond(page, r#"{"data":{"titles":[{"title":"P1"}]}}"#),
        );
        let sink = Arc::new(CollectingSink::default());
        let importer = importer(transport.clone(), Some(sink.clone()), "Jane Doe");

        assert!(importer.is_disabled(CatalogKind::Penguin));
        importer.set_penguin_keys(vec!["2150".to_string()]);
        assert!(!importer.is_disabled(CatalogKind::Penguin));

        importer.run(CatalogKind::Penguin).await.unwrap();
        assert_eq!(sink.titles(), vec!["P1"]);
        assert_eq!(transport.calls(), vec![page]);

        importer.set_penguin_keys(Vec::new());
        assert!(importer.run(CatalogKind::Penguin).await.is_none());
    }

    #[tokio::test]
    async fn test_author_name_update_is_used_for_queries() {
        let transport = Arc::new(ScriptedTransport::new().respond(GOOGLE_URL, TWO_BOOKS));
        let sink = Arc::new(CollectingSink::default());
        let importer = importer(transport.clone(), Some(sink.clone()), "J. Doe");

        importer.set_author_name("  Jane Doe ");
        importer.run(CatalogKind::Google).await.unwrap();

        assert_eq!(transport.calls(), vec![GOOGLE_URL]);
    }

    #[test]
    fn test_edit_and_delete_passthrough() {
        let actions = Arc::new(RecordingActions::default());
        let importer = Importer::new(
            &Config::default(),
            Arc::new(ScriptedTransport::new()),
            ImporterInputs {
                actions: Some(actions.clone()),
                ..ImporterInputs::default()
            },
        );
        let updates = importer.subscribe();

        assert!(importer.edit("r1"));
        assert!(updates.has_changed().unwrap());
        assert_idle(&importer);
        assert!(importer.state().pending_target_id.is_none());

        assert!(importer.delete("r2"));
        assert_idle(&importer);

        assert_eq!(
            *actions.calls.lock().unwrap(),
            vec!["edit:r1".to_string(), "delete:r2".to_string()]
        );
    }

    #[test]
    fn test_passthrough_without_actions() {
        let importer = Importer::new(
            &Config::default(),
            Arc::new(ScriptedTransport::new()),
            ImporterInputs::default(),
        );
        assert!(importer.edit("r1"));
        assert_idle(&importer);
    }
}
