//! Ordered, append-only collection of loaded datasets with stable labels and colors.

use csvscope_cli::LabelModeArg;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::normalize::Table;

/// Category10 palette, cycled by registry position.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

/// How a dataset's legend label is derived when it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// "File N", N being the 1-based registry position.
    #[default]
    FileCounter,
    /// Name of the table's second column.
    SecondColumn,
    /// Source file name.
    FileName,
}

impl LabelMode {
    pub const ALL: [Self; 3] = [Self::FileCounter, Self::SecondColumn, Self::FileName];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileCounter => "file_counter",
            Self::SecondColumn => "second_column",
            Self::FileName => "file_name",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == s)
    }
}

impl From<LabelModeArg> for LabelMode {
    fn from(arg: LabelModeArg) -> Self {
        match arg {
            LabelModeArg::FileCounter => Self::FileCounter,
            LabelModeArg::SecondColumn => Self::SecondColumn,
            LabelModeArg::FileName => Self::FileName,
        }
    }
}

pub type DatasetId = u64;

/// One successfully loaded file. Immutable once registered.
#[derive(Debug, Clone)]
pub struct Dataset {
    id: DatasetId,
    table: Table,
    x: Vec<f64>,
    label: String,
    color: String,
    source: Option<String>,
}

impl Dataset {
    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Column 0 of the table as numbers.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn x_name(&self) -> &str {
        self.table.x_name().unwrap_or_default()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    datasets: Vec<Dataset>,
    palette: Vec<String>,
    next_id: DatasetId,
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self::new(default_palette())
    }
}

impl DatasetRegistry {
    /// An empty palette falls back to [`DEFAULT_PALETTE`].
    pub fn new(palette: Vec<String>) -> Self {
        let palette = if palette.is_empty() {
            default_palette()
        } else {
            palette
        };
        Self {
            datasets: Vec::new(),
            palette,
            next_id: 0,
        }
    }

    /// Append a dataset. Its color is `palette[len % palette.len()]` at this moment.
    pub fn register(
        &mut self,
        table: Table,
        label_mode: LabelMode,
        source: Option<&str>,
    ) -> &Dataset {
        let position = self.datasets.len();
        let counter_label = || format!("File {}", position + 1);
        let label = match label_mode {
            LabelMode::FileCounter => counter_label(),
            LabelMode::SecondColumn => table
                .column_names()
                .get(1)
                .map(|name| name.to_string())
                .unwrap_or_else(counter_label),
            LabelMode::FileName => source
                .map(str::to_string)
                .unwrap_or_else(counter_label),
        };
        let color = self.palette[position % self.palette.len()].clone();

        let id = self.next_id;
        self.next_id += 1;

        info!(
            id,
            %label,
            %color,
            rows = table.height(),
            columns = table.width(),
            "registered dataset"
        );

        self.datasets.push(Dataset {
            id,
            x: table.x_values(),
            table,
            label,
            color,
            source: source.map(str::to_string),
        });
        &self.datasets[position]
    }

    /// Drop every dataset. Sequence numbers keep counting.
    pub fn clear(&mut self) {
        info!(dropped = self.datasets.len(), "cleared dataset registry");
        self.datasets.clear();
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dataset> {
        self.datasets.iter()
    }

    pub fn get(&self, id: DatasetId) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }
}

impl<'a> IntoIterator for &'a DatasetRegistry {
    type Item = &'a Dataset;
    type IntoIter = std::slice::Iter<'a, Dataset>;

    fn into_iter(self) -> Self::IntoIter {
        self.datasets.iter()
    }
}
