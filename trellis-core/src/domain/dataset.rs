//! In-memory tabular dataset
//!
//! The value passed between codecs, the IO controller, and plugins. The core
//! is agnostic to cell types beyond JSON values; codecs own the byte
//! representation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A single column of cell values
pub type Column = Vec<Value>;

/// Tabular data: named columns over rows of JSON values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Creates a dataset, checking that every row matches the column count
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let width = columns.len();
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(Error::DataProcessing(format!(
                    "row {idx} has {} cells, expected {width}",
                    row.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Creates an empty dataset with the given header
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row, checking its width
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::DataProcessing(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Position of a named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Removes a named column, returning the remaining dataset and the
    /// extracted column values
    pub fn take_column(mut self, name: &str) -> Result<(Dataset, Column)> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| Error::DataProcessing(format!("dataset has no column `{name}`")))?;
        self.columns.remove(idx);
        let mut column = Vec::with_capacity(self.rows.len());
        for row in &mut self.rows {
            column.push(row.remove(idx));
        }
        Ok((self, column))
    }

    /// New dataset containing only the rows at the given indices
    pub fn select_rows(&self, indices: &[usize]) -> Result<Dataset> {
        let mut rows = Vec::with_capacity(indices.len());
        for &idx in indices {
            let row = self
                .rows
                .get(idx)
                .ok_or_else(|| Error::DataProcessing(format!("row index {idx} out of bounds")))?;
            rows.push(row.clone());
        }
        Ok(Dataset {
            columns: self.columns.clone(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["a".into(), "b".into(), "label".into()],
            vec![
                vec![json!(1.5), json!(10), json!("x")],
                vec![json!(2.5), json!(20), json!("y")],
                vec![json!(3.5), json!(30), json!("x")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![json!(1)], vec![json!(1), json!(2)]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_take_column() {
        let (rest, label) = sample().take_column("label").unwrap();
        assert_eq!(rest.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(label, vec![json!("x"), json!("y"), json!("x")]);
        assert_eq!(rest.len(), 3);
        assert_eq!(rest.rows()[0], vec![json!(1.5), json!(10)]);
    }

    #[test]
    fn test_take_missing_column() {
        assert!(sample().take_column("nope").is_err());
    }

    #[test]
    fn test_select_rows() {
        let picked = sample().select_rows(&[2, 0]).unwrap();
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.rows()[0][2], json!("x"));
        assert_eq!(picked.rows()[1][0], json!(1.5));
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut ds = Dataset::with_columns(vec!["a".into()]);
        assert!(ds.push_row(vec![json!(1), json!(2)]).is_err());
        assert!(ds.push_row(vec![json!(1)]).is_ok());
        assert_eq!(ds.len(), 1);
    }
}
