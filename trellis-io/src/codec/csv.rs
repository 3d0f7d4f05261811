//! CSV dataset codec

use serde_json::Value;

use trellis_core::domain::dataset::Dataset;
use trellis_core::{Error, Result};

use super::DatasetCodec;

/// Encodes/decodes datasets as headered CSV
///
/// Cell types are inferred on decode: empty → null, then integer, float,
/// boolean, and finally string.
pub struct CsvCodec;

impl DatasetCodec for CsvCodec {
    fn format(&self) -> &'static str {
        "csv"
    }

    fn decode(&self, raw: &[u8]) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new().from_reader(raw);
        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| decode_err(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut dataset = Dataset::with_columns(columns);
        for record in reader.records() {
            let record = record.map_err(|e| decode_err(e.to_string()))?;
            let row: Vec<Value> = record.iter().map(parse_cell).collect();
            dataset
                .push_row(row)
                .map_err(|e| decode_err(e.to_string()))?;
        }
        Ok(dataset)
    }

    fn encode(&self, dataset: &Dataset) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer
            .write_record(dataset.columns())
            .map_err(|e| encode_err(e.to_string()))?;
        for row in dataset.rows() {
            let fields: Vec<String> = row.iter().map(render_cell).collect();
            writer
                .write_record(&fields)
                .map_err(|e| encode_err(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| encode_err(e.to_string()))
    }
}

fn parse_cell(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = field.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = field.parse::<f64>() {
        return Value::from(float);
    }
    match field {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_string()),
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn decode_err(message: String) -> Error {
    Error::Decoding {
        format: "csv".to_string(),
        message,
    }
}

fn encode_err(message: String) -> Error {
    Error::Encoding {
        format: "csv".to_string(),
        message,
    }
}
