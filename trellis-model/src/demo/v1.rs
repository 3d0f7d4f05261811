//! Demo plugin v1
//!
//! Iris-style data preparation and a k-NN classifier. Small enough to run
//! inside tests, complete enough to exercise every capability the runner
//! drives: seeded train/test split, accuracy/f1 metrics, model
//! serialization, and single-column prediction output.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use trellis_core::domain::dataset::{Column, Dataset};
use trellis_core::{Error, Result};

use crate::plugin::{DataPreparation, Model, PluginModule, PreparedData};

/// Version string this module registers under
pub const VERSION: &str = "trellis_demo.v1";

const REQUIRED_COLUMNS: [&str; 5] = [
    "sepal_length_cm",
    "sepal_width_cm",
    "petal_length_cm",
    "petal_width_cm",
    "class",
];

const TARGET_COLUMN: &str = "class";

const DEFAULT_TEST_SIZE: f64 = 0.25;
const DEFAULT_SEED: u64 = 2020;
const DEFAULT_NEIGHBORS: usize = 5;

/// The demo plugin module
pub struct DemoV1;

impl PluginModule for DemoV1 {
    fn data_preparation(&self, config: &Map<String, Value>) -> Result<Box<dyn DataPreparation>> {
        let test_size = match config.get("test_size") {
            None => DEFAULT_TEST_SIZE,
            Some(value) => value.as_f64().ok_or_else(|| {
                Error::ModelDefinition(format!("test_size must be a number, got {value}"))
            })?,
        };
        if !(0.0..=1.0).contains(&test_size) {
            return Err(Error::ModelDefinition(format!(
                "test_size must be within [0, 1], got {test_size}"
            )));
        }
        let seed = read_seed(config)?;
        Ok(Box::new(IrisPreparation { test_size, seed }))
    }

    fn model(&self, hyperparameters: &Map<String, Value>) -> Result<Box<dyn Model>> {
        let n_neighbors = match hyperparameters.get("n_neighbors") {
            None => DEFAULT_NEIGHBORS,
            Some(value) => value
                .as_u64()
                .filter(|n| *n > 0)
                .map(|n| n as usize)
                .ok_or_else(|| {
                    Error::ModelDefinition(format!(
                        "n_neighbors must be a positive integer, got {value}"
                    ))
                })?,
        };
        // seed is accepted for config parity; k-NN itself is deterministic
        let _ = read_seed(hyperparameters)?;
        Ok(Box::new(KnnClassifier::new(n_neighbors)))
    }

    fn model_from_bytes(&self, model_obj: &[u8]) -> Result<Box<dyn Model>> {
        let model: KnnClassifier = serde_json::from_slice(model_obj).map_err(|e| {
            Error::ModelDefinition(format!("failed to deserialize the model: {e}"))
        })?;
        Ok(Box::new(model))
    }
}

fn read_seed(config: &Map<String, Value>) -> Result<u64> {
    match config.get("seed") {
        None => Ok(DEFAULT_SEED),
        Some(value) => value.as_u64().ok_or_else(|| {
            Error::ModelDefinition(format!("seed must be a non-negative integer, got {value}"))
        }),
    }
}

/// Validates the iris schema, splits off the target column, and produces a
/// seeded train/test split
struct IrisPreparation {
    test_size: f64,
    seed: u64,
}

impl DataPreparation for IrisPreparation {
    fn run(&self, dataset: Dataset) -> Result<PreparedData> {
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| dataset.column_index(c).is_none())
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(Error::DataProcessing(format!(
                "data set is missing the columns: {}",
                missing.join(", ")
            )));
        }
        if dataset.is_empty() {
            return Err(Error::DataProcessing("data set has no rows".to_string()));
        }

        let (features, target) = dataset.take_column(TARGET_COLUMN)?;

        let mut indices: Vec<usize> = (0..features.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let test_count = ((features.len() as f64) * self.test_size).round() as usize;
        let test_count = test_count.min(features.len());
        let (test_idx, train_idx) = indices.split_at(test_count);

        let pick = |idx: &[usize]| -> Result<(Dataset, Column)> {
            let rows = features.select_rows(idx)?;
            let labels = idx.iter().map(|&i| target[i].clone()).collect();
            Ok((rows, labels))
        };
        let (x_train, y_train) = pick(train_idx)?;
        let (x_test, y_test) = pick(test_idx)?;

        Ok(PreparedData {
            features: (x_train, x_test),
            target: (y_train, y_test),
        })
    }
}

/// k-nearest-neighbours classifier over numeric feature rows
#[derive(Debug, Serialize, Deserialize)]
pub struct KnnClassifier {
    n_neighbors: usize,
    points: Vec<Vec<f64>>,
    labels: Vec<String>,
}

impl KnnClassifier {
    fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            points: Vec::new(),
            labels: Vec::new(),
        }
    }

    fn classify(&self, point: &[f64]) -> Result<String> {
        if self.points.is_empty() {
            return Err(Error::Running(
                "the model has not been trained".to_string(),
            ));
        }
        let mut neighbours: Vec<(f64, &str)> = self
            .points
            .iter()
            .zip(&self.labels)
            .map(|(p, label)| (squared_distance(point, p), label.as_str()))
            .collect();
        neighbours.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes: HashMap<&str, usize> = HashMap::new();
        for &(_, label) in neighbours.iter().take(self.n_neighbors) {
            *votes.entry(label).or_insert(0) += 1;
        }
        // ties break towards the lexicographically smallest label
        let winner = votes
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(label, _)| label.to_string())
            .ok_or_else(|| Error::Running("no neighbours to vote".to_string()))?;
        Ok(winner)
    }
}

impl Model for KnnClassifier {
    fn train(
        &mut self,
        features: &(Dataset, Dataset),
        target: &(Column, Column),
    ) -> Result<(Vec<u8>, Vec<Value>)> {
        let (x_train, x_test) = features;
        let (y_train, y_test) = target;

        self.points = numeric_rows(x_train)?;
        self.labels = y_train.iter().map(label_of).collect();

        let test_points = numeric_rows(x_test)?;
        let mut predicted = Vec::with_capacity(test_points.len());
        for point in &test_points {
            predicted.push(self.classify(point)?);
        }
        let truth: Vec<String> = y_test.iter().map(label_of).collect();

        let metrics = vec![
            json!({"accuracy": accuracy(&truth, &predicted)}),
            json!({"f1_score": macro_f1(&truth, &predicted)}),
        ];

        let bytes = serde_json::to_vec(self)
            .map_err(|e| Error::Running(format!("failed to serialize the model: {e}")))?;
        Ok((bytes, metrics))
    }

    fn predict(&self, dataset: &Dataset) -> Result<Dataset> {
        let rows = numeric_rows(dataset)?;
        let mut output = Dataset::with_columns(vec![TARGET_COLUMN.to_string()]);
        for point in &rows {
            let label = self.classify(point)?;
            output.push_row(vec![Value::String(label)])?;
        }
        Ok(output)
    }
}

fn numeric_rows(dataset: &Dataset) -> Result<Vec<Vec<f64>>> {
    dataset
        .rows()
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            row.iter()
                .map(|cell| {
                    cell.as_f64().ok_or_else(|| {
                        Error::Running(format!("row {idx} holds a non-numeric feature: {cell}"))
                    })
                })
                .collect()
        })
        .collect()
}

fn label_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

fn accuracy(truth: &[String], predicted: &[String]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    hits as f64 / truth.len() as f64
}

/// Unweighted mean of per-class f1 scores
fn macro_f1(truth: &[String], predicted: &[String]) -> f64 {
    let mut classes: Vec<&String> = truth.iter().chain(predicted).collect();
    classes.sort();
    classes.dedup();
    if classes.is_empty() {
        return 0.0;
    }

    let mut total = 0.0;
    for class in &classes {
        let tp = truth
            .iter()
            .zip(predicted)
            .filter(|(t, p)| *t == *class && *p == *class)
            .count() as f64;
        let fp = truth
            .iter()
            .zip(predicted)
            .filter(|(t, p)| *t != *class && *p == *class)
            .count() as f64;
        let fn_ = truth
            .iter()
            .zip(predicted)
            .filter(|(t, p)| *t == *class && *p != *class)
            .count() as f64;

        let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
        let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        total += f1;
    }
    total / classes.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iris_dataset(rows: usize) -> Dataset {
        let mut dataset = Dataset::with_columns(
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        );
        for i in 0..rows {
            // two well-separated clusters
            let (base, class) = if i % 2 == 0 {
                (1.0, "setosa")
            } else {
                (10.0, "virginica")
            };
            let jitter = (i % 5) as f64 * 0.1;
            dataset
                .push_row(vec![
                    json!(base + jitter),
                    json!(base - jitter),
                    json!(base + 0.5),
                    json!(base - 0.5),
                    json!(class),
                ])
                .unwrap();
        }
        dataset
    }

    fn prep_config(test_size: f64, seed: u64) -> Map<String, Value> {
        let mut config = Map::new();
        config.insert("test_size".to_string(), json!(test_size));
        config.insert("seed".to_string(), json!(seed));
        config
    }

    #[test]
    fn test_preparation_splits_sizes() {
        let prep = DemoV1
            .data_preparation(&prep_config(0.25, 42))
            .unwrap();
        let prepared = prep.run(iris_dataset(100)).unwrap();
        assert_eq!(prepared.features.1.len(), 25);
        assert_eq!(prepared.features.0.len(), 75);
        assert_eq!(prepared.target.0.len(), 75);
        assert_eq!(prepared.target.1.len(), 25);
        // target column removed from the features
        assert!(prepared.features.0.column_index("class").is_none());
    }

    #[test]
    fn test_preparation_is_seeded() {
        let prep = DemoV1.data_preparation(&prep_config(0.3, 7)).unwrap();
        let first = prep.run(iris_dataset(40)).unwrap();
        let second = prep.run(iris_dataset(40)).unwrap();
        assert_eq!(first.features.0, second.features.0);
        assert_eq!(first.target.1, second.target.1);
    }

    #[test]
    fn test_preparation_missing_columns() {
        let prep = DemoV1.data_preparation(&Map::new()).unwrap();
        let dataset = Dataset::new(
            vec!["sepal_length_cm".into(), "class".into()],
            vec![vec![json!(1.0), json!("setosa")]],
        )
        .unwrap();
        let err = prep.run(dataset).unwrap_err();
        assert!(matches!(err, Error::DataProcessing(_)));
        assert!(err.to_string().contains("petal_width_cm"));
    }

    #[test]
    fn test_train_reports_accuracy_and_f1() {
        let prep = DemoV1.data_preparation(&prep_config(0.25, 42)).unwrap();
        let prepared = prep.run(iris_dataset(100)).unwrap();

        let mut hp = Map::new();
        hp.insert("n_neighbors".to_string(), json!(3));
        let mut model = DemoV1.model(&hp).unwrap();

        let (bytes, metrics) = model.train(&prepared.features, &prepared.target).unwrap();
        assert!(!bytes.is_empty());

        let rendered = serde_json::to_string(&metrics).unwrap();
        assert!(rendered.contains("accuracy"));
        assert!(rendered.contains("f1_score"));
        // the clusters are trivially separable
        assert_eq!(metrics[0]["accuracy"], json!(1.0));
    }

    #[test]
    fn test_model_round_trip_and_predict() {
        let prep = DemoV1.data_preparation(&prep_config(0.25, 42)).unwrap();
        let prepared = prep.run(iris_dataset(100)).unwrap();

        let mut hp = Map::new();
        hp.insert("n_neighbors".to_string(), json!(3));
        let mut model = DemoV1.model(&hp).unwrap();
        let (bytes, _) = model.train(&prepared.features, &prepared.target).unwrap();

        let reloaded = DemoV1.model_from_bytes(&bytes).unwrap();
        let input = Dataset::new(
            vec![
                "sepal_length_cm".into(),
                "sepal_width_cm".into(),
                "petal_length_cm".into(),
                "petal_width_cm".into(),
            ],
            vec![
                vec![json!(1.0), json!(1.0), json!(1.5), json!(0.5)],
                vec![json!(10.0), json!(10.0), json!(10.5), json!(9.5)],
            ],
        )
        .unwrap();
        let output = reloaded.predict(&input).unwrap();
        assert_eq!(output.columns(), &["class"]);
        assert_eq!(output.len(), 2);
        assert_eq!(output.rows()[0][0], json!("setosa"));
        assert_eq!(output.rows()[1][0], json!("virginica"));
    }

    #[test]
    fn test_bad_hyperparameters() {
        let mut hp = Map::new();
        hp.insert("n_neighbors".to_string(), json!(0));
        assert!(matches!(
            DemoV1.model(&hp).map(|_| ()),
            Err(Error::ModelDefinition(_))
        ));
    }

    #[test]
    fn test_bad_model_bytes() {
        assert!(matches!(
            DemoV1.model_from_bytes(b"not json").map(|_| ()),
            Err(Error::ModelDefinition(_))
        ));
    }

    #[test]
    fn test_macro_f1_perfect_and_zero() {
        let truth: Vec<String> = ["a", "b", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(macro_f1(&truth, &truth), 1.0);
        let wrong: Vec<String> = ["b", "a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(macro_f1(&truth, &wrong), 0.0);
    }
}
