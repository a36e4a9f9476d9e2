//! One plotting session: the dataset registry, the Y selection, and the load pipeline.
//!
//! Every upload runs to completion through
//! `Idle → Decoding → Detecting → Normalizing → Registering → Resolving → Rendered`.
//! A failure before `Registering` returns to `Idle` with the reason on the
//! status line and nothing committed.

use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::axis::{self, SelectionState, Series};
use crate::detect::{detect, DelimiterStrategy};
use crate::error::{LoadError, LoadResult};
use crate::normalize::normalize;
use crate::registry::{Dataset, DatasetId, DatasetRegistry, LabelMode};
use crate::source::{decode, Upload};
use crate::CompressionFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStage {
    #[default]
    Idle,
    Decoding,
    Detecting,
    Normalizing,
    Registering,
    Resolving,
    Rendered,
}

/// Per-load parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub strategy: DelimiterStrategy,
    pub skip_rows: usize,
    pub label_mode: LabelMode,
}

/// Human-readable outcome of the last operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

impl Status {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// Everything a plot surface needs to draw, always complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RedrawPayload {
    pub y_name: Option<String>,
    pub series: Vec<Series>,
}

impl RedrawPayload {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    registry: DatasetRegistry,
    selection: SelectionState,
    stage: LoadStage,
    status: Status,
    last_error: Option<String>,
}

impl Session {
    pub fn new(palette: Vec<String>) -> Self {
        Self {
            registry: DatasetRegistry::new(palette),
            ..Self::default()
        }
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn stage(&self) -> LoadStage {
        self.stage
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Kind of the last failed load (see [`LoadError::kind`]), cleared on success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Run one upload through the pipeline. Failures are reported on the status
    /// line and leave the registry and selection untouched.
    pub fn load(&mut self, upload: &Upload, options: &LoadOptions) -> Option<DatasetId> {
        if upload.is_empty() {
            // Transient per-load state only; registered datasets stay.
            debug!("empty upload, clearing transient state");
            self.stage = LoadStage::Idle;
            self.last_error = Some(LoadError::EmptyUpload.kind().to_string());
            self.status = Status::default();
            return None;
        }

        match self.ingest(upload, options) {
            Ok(id) => {
                self.last_error = None;
                Some(id)
            }
            Err(e) => {
                self.fail(upload.name.as_deref().unwrap_or("upload"), e);
                None
            }
        }
    }

    /// Read `path` (decompressing when asked or implied by its extension) and load it.
    pub fn load_file(
        &mut self,
        path: &Path,
        compression: Option<CompressionFormat>,
        options: &LoadOptions,
    ) -> Option<DatasetId> {
        self.stage = LoadStage::Decoding;
        match Upload::from_path(path, compression) {
            Ok(upload) => self.load(&upload, options),
            Err(e) => {
                self.fail(&path.display().to_string(), e);
                None
            }
        }
    }

    fn fail(&mut self, name: &str, e: LoadError) {
        warn!(kind = e.kind(), error = %e, file = name, "load failed");
        self.stage = LoadStage::Idle;
        self.last_error = Some(e.kind().to_string());
        self.status = Status::error(format!("Failed to load {name}: {e}"));
    }

    fn ingest(&mut self, upload: &Upload, options: &LoadOptions) -> LoadResult<DatasetId> {
        self.stage = LoadStage::Decoding;
        let text = decode(upload)?;

        self.stage = LoadStage::Detecting;
        let detection = detect(&text, options.strategy)?;

        self.stage = LoadStage::Normalizing;
        let table = normalize(&text, &detection, options.skip_rows)?;

        self.stage = LoadStage::Registering;
        let dataset = self
            .registry
            .register(table, options.label_mode, upload.name.as_deref());
        let id = dataset.id();
        let mut message = format!(
            "Loaded {}: {} points, {} columns (delimiter {:?}, header at line {})",
            upload.name.as_deref().unwrap_or(dataset.label()),
            dataset.table().height(),
            dataset.table().width(),
            detection.delimiter,
            detection.header_row_index + 1,
        );

        self.stage = LoadStage::Resolving;
        self.selection.recompute(&self.registry);
        if let Some(note) = self.missing_note() {
            message.push_str("; ");
            message.push_str(&note);
        }
        info!(id, "{message}");
        self.status = Status::info(message);

        self.stage = LoadStage::Rendered;
        Ok(id)
    }

    /// Non-fatal note about datasets that have no column for the current Y name.
    fn missing_note(&self) -> Option<String> {
        let name = self.selection.current()?;
        let missing = self.missing_for_current();
        if missing.is_empty() {
            return None;
        }
        for dataset in &missing {
            debug!(label = dataset.label(), y = name, "dataset has no matching column");
        }
        Some(format!("{} file(s) without '{name}'", missing.len()))
    }

    /// Datasets left out of the current plot.
    pub fn missing_for_current(&self) -> Vec<&Dataset> {
        match self.selection.current() {
            Some(name) => axis::missing_datasets(&self.registry, name),
            None => Vec::new(),
        }
    }

    /// Select a Y name (case-insensitive). Unknown names leave the selection as is.
    pub fn select_y(&mut self, name: &str) -> bool {
        let selected = self.selection.select(name);
        if selected {
            self.after_selection_change();
        } else {
            debug!(requested = name, "y name not available");
        }
        selected
    }

    /// Move to the next (`delta > 0`) or previous Y name.
    pub fn step_y(&mut self, delta: isize) {
        self.selection.step(delta);
        self.after_selection_change();
    }

    fn after_selection_change(&mut self) {
        let Some(name) = self.selection.current() else {
            return;
        };
        let series = axis::resolve(&self.registry, name).len();
        let mut message = format!("Y: {name} ({series} series)");
        if let Some(note) = self.missing_note() {
            message.push_str("; ");
            message.push_str(&note);
        }
        self.status = Status::info(message);
    }

    /// Drop all datasets and start over.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.selection.recompute(&self.registry);
        self.stage = LoadStage::Idle;
        self.last_error = None;
        self.status = Status::info("Session cleared");
    }

    /// The complete set of series for the current Y name.
    pub fn redraw(&self) -> RedrawPayload {
        let y_name = self.selection.current().map(str::to_string);
        let series = y_name
            .as_deref()
            .map(|name| axis::resolve(&self.registry, name))
            .unwrap_or_default();
        RedrawPayload { y_name, series }
    }
}
