//! Case-insensitive reconciliation of Y column names across datasets.

use serde::Serialize;
use std::collections::HashSet;

use crate::registry::{Dataset, DatasetId, DatasetRegistry};

/// One plotted line: the x column of a dataset against its column matching the selected name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub dataset_id: DatasetId,
    pub label: String,
    pub color: String,
    /// Name of the matched column in this dataset's own casing.
    pub column: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    /// (x, y) pairs where both values are finite.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .map(|(&x, &y)| (x, y))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
    }

    pub fn point_count(&self) -> usize {
        self.points().count()
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// Y column names across all datasets in registry order, de-duplicated
/// case-insensitively. The first casing seen is the one reported.
pub fn available_names(registry: &DatasetRegistry) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for dataset in registry {
        for name in dataset.table().y_candidates() {
            if seen.insert(fold(name)) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// The first Y candidate column of `dataset` matching `name` case-insensitively.
pub fn find_column<'a>(dataset: &'a Dataset, name: &str) -> Option<&'a str> {
    let wanted = fold(name);
    dataset
        .table()
        .y_candidates()
        .find(|candidate| fold(candidate) == wanted)
}

/// One series per dataset that has a column matching `name`.
///
/// Datasets without a match are left out. An unknown name gives an empty vector.
pub fn resolve(registry: &DatasetRegistry, name: &str) -> Vec<Series> {
    registry
        .iter()
        .filter_map(|dataset| {
            let column = find_column(dataset, name)?;
            let y = dataset.table().values(column)?;
            Some(Series {
                dataset_id: dataset.id(),
                label: dataset.label().to_string(),
                color: dataset.color().to_string(),
                column: column.to_string(),
                x: dataset.x().to_vec(),
                y,
            })
        })
        .collect()
}

/// Datasets that [`resolve`] skips for `name`.
pub fn missing_datasets<'a>(registry: &'a DatasetRegistry, name: &str) -> Vec<&'a Dataset> {
    registry
        .iter()
        .filter(|dataset| find_column(dataset, name).is_none())
        .collect()
}

/// Choosable Y names and the active one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    available: Vec<String>,
    current: Option<String>,
}

impl SelectionState {
    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The selector is disabled when nothing can be chosen.
    pub fn is_enabled(&self) -> bool {
        !self.available.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        let current = self.current.as_deref()?;
        self.position(current)
    }

    fn position(&self, name: &str) -> Option<usize> {
        let wanted = fold(name);
        self.available.iter().position(|n| fold(n) == wanted)
    }

    /// Rebuild the name list from `registry`. The current name survives when it
    /// is still available, otherwise the first name (or none) becomes current.
    pub fn recompute(&mut self, registry: &DatasetRegistry) {
        self.available = available_names(registry);
        self.current = match self.current.take().and_then(|c| self.position(&c)) {
            Some(i) => Some(self.available[i].clone()),
            None => self.available.first().cloned(),
        };
    }

    /// Make `name` current if it is available. Returns whether it was.
    pub fn select(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => {
                self.current = Some(self.available[i].clone());
                true
            }
            None => false,
        }
    }

    /// Move the selection by `delta`, wrapping at either end.
    pub fn step(&mut self, delta: isize) {
        if self.available.is_empty() {
            return;
        }
        let len = self.available.len() as isize;
        let index = self.current_index().map(|i| i as isize).unwrap_or(0);
        let next = (index + delta).rem_euclid(len) as usize;
        self.current = Some(self.available[next].clone());
    }
}
