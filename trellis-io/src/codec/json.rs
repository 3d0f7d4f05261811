//! JSON dataset codec

use serde_json::{Map, Value};

use trellis_core::domain::dataset::Dataset;
use trellis_core::{Error, Result};

use super::DatasetCodec;

/// Encodes/decodes datasets as a JSON array of row objects
///
/// Columns keep their first-seen order; keys missing from a row decode as
/// null.
pub struct JsonCodec;

impl DatasetCodec for JsonCodec {
    fn format(&self) -> &'static str {
        "json"
    }

    fn decode(&self, raw: &[u8]) -> Result<Dataset> {
        let value: Value =
            serde_json::from_slice(raw).map_err(|e| decode_err(e.to_string()))?;
        let records = value
            .as_array()
            .ok_or_else(|| decode_err("expected a top-level array of records".to_string()))?;

        let mut columns: Vec<String> = Vec::new();
        for record in records {
            let object = record
                .as_object()
                .ok_or_else(|| decode_err("expected every record to be an object".to_string()))?;
            for key in object.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut dataset = Dataset::with_columns(columns.clone());
        for record in records {
            let object = record
                .as_object()
                .ok_or_else(|| decode_err("expected every record to be an object".to_string()))?;
            let row: Vec<Value> = columns
                .iter()
                .map(|c| object.get(c).cloned().unwrap_or(Value::Null))
                .collect();
            dataset
                .push_row(row)
                .map_err(|e| decode_err(e.to_string()))?;
        }
        Ok(dataset)
    }

    fn encode(&self, dataset: &Dataset) -> Result<Vec<u8>> {
        let records: Vec<Value> = dataset
            .rows()
            .iter()
            .map(|row| {
                let mut object = Map::new();
                for (column, cell) in dataset.columns().iter().zip(row) {
                    object.insert(column.clone(), cell.clone());
                }
                Value::Object(object)
            })
            .collect();
        serde_json::to_vec(&records).map_err(|e| Error::Encoding {
            format: "json".to_string(),
            message: e.to_string(),
        })
    }
}

fn decode_err(message: String) -> Error {
    Error::Decoding {
        format: "json".to_string(),
        message,
    }
}
