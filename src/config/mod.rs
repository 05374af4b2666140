mod adapter;

use std::{fs::File, io::BufReader, path::Path};

use serde::Deserialize;

use crate::error::SessionErr;

pub use adapter::{Adapter, RunPlan};

fn default_workers() -> usize {
    1
}

fn default_learning_rate() -> f64 {
    machine_learning::engine::LEARN_RATE
}

fn default_max_iterations() -> usize {
    machine_learning::training::MAX_ITERATIONS
}

/// The function turning the output layer's sums into outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawConfig {
    #[default]
    SquaredError,
    Softmax,
}

/// The linear algebra implementation every worker runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendConfig {
    #[default]
    Reference,
    Vector,
    Matrix,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub inputs: usize,
    pub hiddens: Vec<usize>,
    pub outputs: usize,
    #[serde(default)]
    pub law: LawConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    pub threshold: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Enables the momentum update with this coefficient.
    #[serde(default)]
    pub momentum: Option<f64>,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

/// A single training sample.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sample {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

/// Everything a run needs, as read from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub network: NetworkConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Size of the global rayon pool, left to rayon when missing.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Seed for the initial weights, drawn at random when missing.
    #[serde(default)]
    pub seed: Option<u64>,
    pub training: TrainingConfig,
    pub samples: Vec<Sample>,
}

impl RunConfig {
    /// Reads a config from a JSON file.
    ///
    /// # Errors
    /// `SessionErr::Io` if the file can't be opened, `SessionErr::Json` if it can't be parsed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SessionErr> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Parses a config from a JSON string.
    pub fn parse(json: &str) -> Result<Self, SessionErr> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "network": { "inputs": 2, "hiddens": [3], "outputs": 2 },
        "training": { "threshold": 1e-5 },
        "samples": [ { "input": [1.0, -1.0], "target": [0.0, 1.0] } ]
    }"#;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = RunConfig::parse(MINIMAL).unwrap();

        assert_eq!(config.network.law, LawConfig::SquaredError);
        assert_eq!(config.backend, BackendConfig::Reference);
        assert_eq!(config.workers, 1);
        assert_eq!(config.threads, None);
        assert_eq!(config.seed, None);
        assert_eq!(config.training.learning_rate, 0.01);
        assert_eq!(config.training.momentum, None);
        assert_eq!(config.training.max_iterations, 10240);
        assert_eq!(config.samples.len(), 1);
    }

    #[test]
    fn test_every_field_is_read() {
        let json = r#"{
            "network": { "inputs": 4, "hiddens": [8, 6], "outputs": 3, "law": "softmax" },
            "backend": "matrix",
            "workers": 3,
            "threads": 2,
            "seed": 77,
            "training": {
                "threshold": 0.001,
                "learning_rate": 0.05,
                "momentum": 0.2,
                "max_iterations": 500
            },
            "samples": []
        }"#;

        let config = RunConfig::parse(json).unwrap();

        assert_eq!(config.network.hiddens, vec![8, 6]);
        assert_eq!(config.network.law, LawConfig::Softmax);
        assert_eq!(config.backend, BackendConfig::Matrix);
        assert_eq!(config.workers, 3);
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.seed, Some(77));
        assert_eq!(config.training.learning_rate, 0.05);
        assert_eq!(config.training.momentum, Some(0.2));
        assert_eq!(config.training.max_iterations, 500);
    }

    #[test]
    fn test_unknown_backend_is_a_json_error() {
        let json = MINIMAL.replace(r#""samples""#, r#""backend": "gpu", "samples""#);
        assert!(matches!(RunConfig::parse(&json), Err(SessionErr::Json(_))));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = RunConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SessionErr::Io(_)));
    }
}
