//! Label table loading.

use crate::core::{ClassifierError, ClassifierResult};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Ordered class names, indexed positionally to match the model output.
///
/// Labels are stored as `Arc<str>` so ranked results can share them without
/// copying.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelTable {
    labels: Vec<Arc<str>>,
}

impl LabelTable {
    /// Creates a table from owned labels.
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels: labels.into_iter().map(Arc::from).collect(),
        }
    }

    /// Parses a newline-delimited label list.
    ///
    /// Both `\n` and `\r\n` line endings are accepted. Empty lines inside the
    /// list are kept so positions stay aligned with the model output; trailing
    /// empty lines are dropped.
    pub fn parse(content: &str) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut labels: Vec<Arc<str>> = content.lines().map(Arc::from).collect();
        while labels.last().is_some_and(|l| l.trim().is_empty()) {
            labels.pop();
        }
        Self { labels }
    }

    /// Reads a label file.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::LabelLoad`] if the file cannot be read and
    /// [`ClassifierError::InvalidInput`] if it contains no labels.
    pub fn from_file(path: impl AsRef<Path>) -> ClassifierResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClassifierError::label_load_error(path, e))?;
        let table = Self::parse(&content);
        if table.is_empty() {
            return Err(ClassifierError::invalid_input(format!(
                "label file '{}' contains no labels",
                path.display()
            )));
        }
        info!("Loaded {} labels from {}", table.len(), path.display());
        Ok(table)
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the table holds no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the label at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|l| l.as_ref())
    }

    /// Returns a shared handle to the label at `index`.
    pub fn get_shared(&self, index: usize) -> Option<Arc<str>> {
        self.labels.get(index).cloned()
    }

    /// Iterates over the labels in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|l| l.as_ref())
    }
}

impl<S: AsRef<str>> FromIterator<S> for LabelTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(|s| Arc::from(s.as_ref())).collect(),
        }
    }
}
