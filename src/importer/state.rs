//! Import job state machine.
//!
//! All mutation goes through [`ImportState::transition`]. At most one job is
//! active at a time; there is no queue, so events arriving while a job is
//! active are dropped.

use serde::Serialize;

use crate::models::CatalogKind;

/// The job currently holding the importer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ImportJob {
    #[default]
    Idle,
    GoogleRunning,
    OpenLibraryRunning,
    PenguinRunning,
    AmazonRunning,
    Editing,
    Deleting,
}

impl ImportJob {
    /// The running state for a catalog import.
    pub fn running(kind: CatalogKind) -> Self {
        match kind {
            CatalogKind::Google => ImportJob::GoogleRunning,
            CatalogKind::OpenLibrary => ImportJob::OpenLibraryRunning,
            CatalogKind::Penguin => ImportJob::PenguinRunning,
            CatalogKind::Amazon => ImportJob::AmazonRunning,
        }
    }

    /// The catalog being imported, if this is an import job.
    pub fn source(&self) -> Option<CatalogKind> {
        match self {
            ImportJob::GoogleRunning => Some(CatalogKind::Google),
            ImportJob::OpenLibraryRunning => Some(CatalogKind::OpenLibrary),
            ImportJob::PenguinRunning => Some(CatalogKind::Penguin),
            ImportJob::AmazonRunning => Some(CatalogKind::Amazon),
            ImportJob::Idle | ImportJob::Editing | ImportJob::Deleting => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ImportJob::Idle)
    }
}

/// Events accepted by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEvent {
    /// Start importing from a catalog.
    Start(CatalogKind),
    /// Hand a record id to the host's edit callback.
    Edit(String),
    /// Hand a record id to the host's delete callback.
    Delete(String),
    /// The active job settled, successfully or not.
    Finish,
}

/// Importer state plus the guard inputs supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportState {
    pub active_job: ImportJob,
    pub is_loading: bool,

    /// Fixed at construction: no author name or no sink was supplied.
    pub disable_google_import: bool,

    pub author_name: String,
    pub has_sink: bool,
    pub open_library_keys: Vec<String>,
    pub penguin_keys: Vec<String>,

    /// Record targeted by the pending edit/delete job.
    pub pending_target_id: Option<String>,
}

impl ImportState {
    pub fn new(
        author_name: impl Into<String>,
        has_sink: bool,
        open_library_keys: Vec<String>,
        penguin_keys: Vec<String>,
    ) -> Self {
        let author_name = author_name.into();
        Self {
            disable_google_import: author_name.trim().is_empty() || !has_sink,
            author_name,
            has_sink,
            open_library_keys,
            penguin_keys,
            ..Self::default()
        }
    }

    /// Apply `event`. Returns whether the state changed.
    pub fn transition(&mut self, event: ImportEvent) -> bool {
        match event {
            ImportEvent::Start(kind) => {
                if !self.can_start(kind) {
                    return false;
                }
                self.active_job = ImportJob::running(kind);
                self.is_loading = true;
                true
            }
            ImportEvent::Edit(id) => self.enter_passthrough(ImportJob::Editing, id),
            ImportEvent::Delete(id) => self.enter_passthrough(ImportJob::Deleting, id),
            ImportEvent::Finish => {
                if self.active_job.is_idle() {
                    return false;
                }
                self.active_job = ImportJob::Idle;
                self.is_loading = false;
                self.pending_target_id = None;
                true
            }
        }
    }

    fn enter_passthrough(&mut self, job: ImportJob, target_id: String) -> bool {
        if !self.active_job.is_idle() {
            return false;
        }
        self.pending_target_id = Some(target_id);
        self.active_job = job;
        self.is_loading = true;
        true
    }
}
