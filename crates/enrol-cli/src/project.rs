//! Opening an initialized project: config, medium, stores and the admin gate.

use std::path::{Path, PathBuf};

use enrol_core::config::{self, ProjectConfig};
use enrol_core::error::ErrorCode;
use enrol_core::session::{Session, SessionManager};
use enrol_core::store::medium::FileMedium;
use enrol_core::store::{
    ApplicationStore, Collection, CollectionStore, LoadOutcome, StoreError, UniversityStore,
};

use crate::output::{CliError, OutputMode, fail};

/// An initialized project rooted at the directory holding `.enrol/`.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub medium: FileMedium,
}

impl Project {
    /// Find the project containing `start` and load its config.
    pub fn open(start: &Path, output: OutputMode) -> anyhow::Result<Self> {
        let Some(root) = config::find_project_root(start) else {
            return Err(fail(
                output,
                CliError::coded(
                    format!("no {} directory found from {}", config::PROJECT_DIR, start.display()),
                    ErrorCode::NotInitialized,
                ),
            ));
        };

        let config = config::load_project_config(&root).map_err(|err| {
            fail(
                output,
                CliError::coded(format!("{err:#}"), ErrorCode::ConfigParseError),
            )
        })?;
        let medium = FileMedium::new(config.data_dir(&root))
            .with_max_value_bytes(config.storage.max_value_bytes);

        tracing::debug!(root = %root.display(), data = %medium.root().display(), "project opened");
        Ok(Self {
            root,
            config,
            medium,
        })
    }

    pub fn universities(&self) -> UniversityStore<FileMedium> {
        open_store(self.medium.clone()).0
    }

    pub fn applications(&self) -> ApplicationStore<FileMedium> {
        open_store(self.medium.clone()).0
    }

    pub fn sessions(&self) -> SessionManager<FileMedium> {
        SessionManager::new(self.medium.clone(), &self.config.admin, &self.config.session)
    }

    /// Require a valid admin session, rendering the auth error otherwise.
    pub fn require_admin(&self, output: OutputMode) -> anyhow::Result<Session> {
        self.sessions()
            .current()
            .map_err(|err| fail(output, CliError::coded(err.to_string(), err.code())))
    }
}

/// Refuse edits while a store is serving defaults after a failed read,
/// so the unreadable value on disk is not overwritten.
pub fn ensure_writable<C: Collection>(
    store: &CollectionStore<C, FileMedium>,
    output: OutputMode,
) -> anyhow::Result<()> {
    match store.error() {
        Some(err @ StoreError::Read { .. }) => Err(fail(
            output,
            CliError::coded(format!("{err}; refusing to overwrite"), err.code()),
        )),
        _ => Ok(()),
    }
}

/// Load a store, surfacing non-fatal load problems as warnings.
pub fn open_store<C: Collection>(medium: FileMedium) -> (CollectionStore<C, FileMedium>, LoadOutcome) {
    let mut store = CollectionStore::new(medium);
    let outcome = store.load();
    match &outcome {
        LoadOutcome::Healed(reason) => {
            tracing::warn!(key = C::KEY, %reason, "stored data was malformed; defaults restored");
        }
        LoadOutcome::Recovered(err) => {
            tracing::warn!(key = C::KEY, error = %err, "showing defaults; run `enrol check` to retry");
        }
        LoadOutcome::Loaded | LoadOutcome::Seeded => {}
    }
    (store, outcome)
}
