//! Trigger preconditions.
//!
//! A trigger whose preconditions fail is dropped without error. The same
//! predicates drive the host's "disabled" flags, so a rejected trigger is
//! normally unreachable from the UI.

use crate::importer::ImportState;
use crate::models::CatalogKind;

impl ImportState {
    fn has_author(&self) -> bool {
        !self.author_name.trim().is_empty()
    }

    /// Inputs required by `kind` are present.
    pub fn preconditions_met(&self, kind: CatalogKind) -> bool {
        match kind {
            CatalogKind::Google => !self.disable_google_import && self.has_author(),
            CatalogKind::OpenLibrary => {
                !self.open_library_keys.is_empty() && self.has_author() && self.has_sink
            }
            CatalogKind::Penguin => !self.penguin_keys.is_empty() && self.has_sink,
            CatalogKind::Amazon => self.has_author() && self.has_sink,
        }
    }

    /// Preconditions hold and no other job is active.
    pub fn can_start(&self, kind: CatalogKind) -> bool {
        self.active_job.is_idle() && self.preconditions_met(kind)
    }

    /// Whether the host should render the trigger for `kind` as disabled.
    pub fn is_disabled(&self, kind: CatalogKind) -> bool {
        !self.can_start(kind)
    }
}
