//! Dataset codec registry
//!
//! Maps a file extension to an encode/decode pair for tabular data. The
//! lookup strips one trailing `.gz` (compression is the storage layer's
//! side channel) and resolves the remaining extension against a static
//! table. Codecs either fully succeed or fail; there are no partial
//! reads/writes.

mod csv;
mod json;

pub use csv::CsvCodec;
pub use json::JsonCodec;

use trellis_core::domain::dataset::Dataset;
use trellis_core::{Error, Result};

/// Bidirectional bytes ↔ dataset converter
pub trait DatasetCodec: Send + Sync {
    /// Format name used in error messages, e.g. `csv`
    fn format(&self) -> &'static str;

    fn decode(&self, raw: &[u8]) -> Result<Dataset>;

    fn encode(&self, dataset: &Dataset) -> Result<Vec<u8>>;
}

static CODECS: [(&str, &'static dyn DatasetCodec); 2] =
    [("csv", &CsvCodec), ("json", &JsonCodec)];

/// Resolves the codec for a dataset filename
///
/// The extension is taken after stripping one trailing `.gz`.
pub fn codec_for(filename: &str) -> Result<&'static dyn DatasetCodec> {
    let name = filename.strip_suffix(".gz").unwrap_or(filename);
    let extension = name.rsplit('.').next().unwrap_or(name);
    CODECS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, codec)| *codec)
        .ok_or_else(|| Error::UnsupportedFormat {
            extension: extension.to_string(),
            supported: CODECS
                .iter()
                .map(|(ext, _)| *ext)
                .collect::<Vec<_>>()
                .join(", "),
        })
}
