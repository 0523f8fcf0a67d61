use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::config::DashboardConfig;
use crate::data::filter::{Choice, FilterSelection};
use crate::data::loader::{load_file, DataLoadError, LoadedData};
use crate::data::model::GrantDataset;
use crate::data::table::{export_csv, ExportError};
use crate::data::view::{render, DashboardView};

/// Prompt shown when a file loads but has no valid grants.
pub const EMPTY_DATASET_PROMPT: &str = "No data available to display. Please upload a dataset.";

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// A user-visible message. Nothing here is fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    /// Zero valid rows after cleaning.
    EmptyDataset(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Background load
// ---------------------------------------------------------------------------

type LoadResult = Result<LoadedData, DataLoadError>;

struct PendingLoad {
    generation: u64,
    path: PathBuf,
    receiver: Receiver<LoadResult>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full per-session UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Cleaned dataset (None until a load succeeds).
    pub dataset: Option<GrantDataset>,

    /// File the current dataset came from.
    pub source: Option<PathBuf>,

    /// Current program / strategy selection.
    pub selection: FilterSelection,

    /// Derived view for `selection` (cached until the next change).
    pub view: Option<DashboardView>,

    /// Status / error message shown in the UI.
    pub status: Option<Notice>,

    pending: Option<PendingLoad>,
    generation: u64,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            source: None,
            selection: FilterSelection::default(),
            view: None,
            status: None,
            pending: None,
            generation: 0,
        }
    }

    /// Whether a file loading operation is in progress.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn loading_path(&self) -> Option<&Path> {
        self.pending.as_ref().map(|p| p.path.as_path())
    }

    /// Start loading `path` on a worker thread. A load already in flight is
    /// superseded: its result is discarded when it arrives.
    pub fn begin_load(&mut self, path: PathBuf) {
        self.generation += 1;
        let generation = self.generation;
        if let Some(old) = &self.pending {
            log::info!("Load of {} superseded by {}", old.path.display(), path.display());
        }

        let (sender, receiver) = mpsc::channel();
        let sheet = self.config.sheet_name.clone();
        let worker_path = path.clone();
        thread::spawn(move || {
            let result = load_file(&worker_path, &sheet);
            if sender.send(result).is_err() {
                log::debug!("Discarding superseded load #{generation}");
            }
        });

        self.pending = Some(PendingLoad {
            generation,
            path,
            receiver,
        });
    }

    /// Pick up a finished load, if any. Returns `true` when state changed.
    pub fn poll_load(&mut self) -> bool {
        let Some(pending) = &self.pending else {
            return false;
        };
        let result = match pending.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                let msg = format!("Loading {} failed unexpectedly", pending.path.display());
                log::error!("{msg}");
                self.pending = None;
                self.status = Some(Notice::Error(msg));
                return true;
            }
        };

        debug_assert_eq!(pending.generation, self.generation);
        let path = pending.path.clone();
        self.pending = None;
        match result {
            Ok(loaded) => self.set_dataset(loaded),
            Err(e) => {
                // The previous dataset, if any, stays usable.
                log::error!("Failed to load {}: {e}", path.display());
                self.status = Some(Notice::Error(format!("Error loading data: {e}")));
            }
        }
        true
    }

    /// Ingest a newly loaded dataset and reset the filters.
    pub fn set_dataset(&mut self, loaded: LoadedData) {
        self.status = if loaded.dataset.is_empty() {
            log::warn!("{} has no valid grants", loaded.source.display());
            Some(Notice::EmptyDataset(EMPTY_DATASET_PROMPT.to_string()))
        } else if loaded.rows_dropped() > 0 {
            Some(Notice::Info(format!(
                "{} rows without complete data or a positive amount were skipped",
                loaded.rows_dropped()
            )))
        } else {
            None
        };
        self.source = Some(loaded.source);
        self.dataset = Some(loaded.dataset);
        self.selection.reset();
        self.refresh();
    }

    /// Recompute the view after a selection or dataset change.
    fn refresh(&mut self) {
        self.view = self
            .dataset
            .as_ref()
            .filter(|ds| !ds.is_empty())
            .map(|ds| render(ds, &self.selection, &self.config.links));
    }

    pub fn set_program(&mut self, program: Choice) {
        if let Some(ds) = &self.dataset {
            self.selection.set_program(program, ds);
            self.refresh();
        }
    }

    pub fn set_strategy(&mut self, strategy: Choice) {
        self.selection.set_strategy(strategy);
        self.refresh();
    }

    pub fn reset_filters(&mut self) {
        self.selection.reset();
        self.refresh();
    }

    /// Write the currently displayed table to `path`. The outcome is also
    /// reported through `status`.
    pub fn export_to(&mut self, path: &Path) -> Result<(), ExportError> {
        let rows = self.view.as_ref().map(|v| v.table.as_slice()).unwrap_or(&[]);
        match export_csv(rows, path) {
            Ok(()) => {
                self.status = Some(Notice::Info(format!(
                    "Exported {} rows to {}",
                    rows.len(),
                    path.display()
                )));
                Ok(())
            }
            Err(e) => {
                self.status = Some(Notice::Error(format!("Export failed: {e}")));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::data::model::tests::sample_dataset;

    const CSV: &str = "Top Level Primary Program,Primary Strategy,Organization: Organization Name,Project Title,Request: ID,Amount\n\
                       ProgA,Strat1,OrgX,Proj1,R1,100\n\
                       ProgA,Strat2,OrgY,Proj2,R2,300\n\
                       ProgB,Strat1,OrgZ,Proj3,R3,200\n";

    fn loaded_state() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(LoadedData {
            source: PathBuf::from("memory"),
            rows_read: 3,
            dataset: sample_dataset(),
        });
        state
    }

    fn wait_for_load(state: &mut AppState) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while state.is_loading() {
            state.poll_load();
            assert!(Instant::now() < deadline, "load did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn selection_changes_recompute_view() {
        let mut state = loaded_state();
        assert_eq!(state.view.as_ref().unwrap().table.len(), 3);

        state.set_program(Choice::only("ProgA"));
        assert_eq!(state.view.as_ref().unwrap().stats.filtered.total, 400.0);

        state.set_strategy(Choice::only("Strat2"));
        assert_eq!(state.view.as_ref().unwrap().table.len(), 1);

        state.set_program(Choice::only("ProgB"));
        assert_eq!(state.selection.strategy, Choice::All);

        state.reset_filters();
        assert_eq!(state.selection, FilterSelection::default());
        assert_eq!(state.view.as_ref().unwrap().table.len(), 3);
    }

    #[test]
    fn background_load_populates_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grants.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut state = AppState::new(DashboardConfig::default());
        state.begin_load(path.clone());
        assert!(state.is_loading());
        wait_for_load(&mut state);

        assert_eq!(state.dataset.as_ref().unwrap().len(), 3);
        assert_eq!(state.source.as_deref(), Some(path.as_path()));
        assert!(state.status.is_none());
    }

    #[test]
    fn newer_load_supersedes_older() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        std::fs::write(&first, CSV).unwrap();
        let first_row_only = CSV.lines().take(2).collect::<Vec<_>>().join("\n");
        std::fs::write(&second, first_row_only).unwrap();

        let mut state = AppState::new(DashboardConfig::default());
        state.begin_load(first);
        state.begin_load(second.clone());
        assert_eq!(state.loading_path(), Some(second.as_path()));
        wait_for_load(&mut state);

        assert_eq!(state.source.as_deref(), Some(second.as_path()));
        assert_eq!(state.dataset.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn failed_load_is_reported_and_keeps_previous_data() {
        let mut state = loaded_state();
        state.begin_load(PathBuf::from("/definitely/missing/grants.xlsx"));
        wait_for_load(&mut state);

        assert!(matches!(state.status, Some(Notice::Error(_))));
        assert_eq!(state.dataset.as_ref().unwrap().len(), 3);
        assert!(state.view.is_some());
    }

    #[test]
    fn empty_dataset_prompts_for_upload() {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(LoadedData {
            source: PathBuf::from("memory"),
            rows_read: 2,
            dataset: GrantDataset::default(),
        });
        assert_eq!(
            state.status,
            Some(Notice::EmptyDataset(EMPTY_DATASET_PROMPT.to_string()))
        );
        assert!(state.view.is_none());
    }

    #[test]
    fn export_writes_current_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut state = loaded_state();
        state.set_program(Choice::only("ProgA"));

        state.export_to(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(matches!(state.status, Some(Notice::Info(_))));
    }

    #[test]
    fn failed_export_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let mut state = loaded_state();

        assert!(matches!(state.export_to(&path), Err(ExportError::Io { .. })));
        assert!(matches!(state.status, Some(Notice::Error(_))));
        assert!(!path.exists());
    }
}
