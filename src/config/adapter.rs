use std::num::NonZeroUsize;

use log::info;
use machine_learning::{
    arch::{OutputLaw, Shape},
    backend::BackendKind,
    training::Mode,
};

use super::{BackendConfig, LawConfig, NetworkConfig, RunConfig, Sample, TrainingConfig};
use crate::error::SessionErr;

/// A validated run, expressed in the engine's own types.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub shape: Shape,
    pub law: OutputLaw,
    pub backend: BackendKind,
    pub workers: NonZeroUsize,
    pub threads: Option<NonZeroUsize>,
    pub seed: u64,
    pub mode: Mode,
    pub threshold: f64,
    pub learning_rate: f64,
    pub max_iterations: usize,
    pub samples: Vec<Sample>,
}

/// Turns a `RunConfig` into a `RunPlan`, refusing anything the engine can't train.
pub struct Adapter;

impl Adapter {
    pub fn new() -> Self {
        Self
    }

    pub fn adapt(&self, config: RunConfig) -> Result<RunPlan, SessionErr> {
        self.validate_network(&config.network)?;
        self.validate_training(&config.training)?;
        self.validate_samples(&config.network, &config.samples)?;

        let workers = NonZeroUsize::new(config.workers)
            .ok_or_else(|| invalid("at least one worker is needed".into()))?;

        let threads = match config.threads {
            Some(threads) => Some(
                NonZeroUsize::new(threads)
                    .ok_or_else(|| invalid("the thread pool can't be empty".into()))?,
            ),
            None => None,
        };

        let seed = config.seed.unwrap_or_else(|| {
            let seed = rand::random();
            info!("no seed given, using {seed}");
            seed
        });

        let NetworkConfig {
            inputs,
            hiddens,
            outputs,
            law,
        } = config.network;

        Ok(RunPlan {
            shape: Shape::new(inputs, hiddens, outputs),
            law: self.adapt_law(law),
            backend: self.adapt_backend(config.backend),
            workers,
            threads,
            seed,
            mode: self.adapt_mode(config.training.momentum),
            threshold: config.training.threshold,
            learning_rate: config.training.learning_rate,
            max_iterations: config.training.max_iterations,
            samples: config.samples,
        })
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    fn validate_network(&self, network: &NetworkConfig) -> Result<(), SessionErr> {
        if network.inputs == 0 || network.outputs == 0 {
            return Err(invalid("the network needs inputs and outputs".into()));
        }

        if network.hiddens.is_empty() {
            return Err(invalid("the network needs at least one hidden layer".into()));
        }

        if let Some(i) = network.hiddens.iter().position(|&n| n == 0) {
            return Err(invalid(format!("hidden layer {i} has no neurons")));
        }

        Ok(())
    }

    fn validate_training(&self, training: &TrainingConfig) -> Result<(), SessionErr> {
        if !training.threshold.is_finite() || training.threshold < 0.0 {
            return Err(invalid(format!(
                "threshold must be a non negative number, got {}",
                training.threshold
            )));
        }

        if !training.learning_rate.is_finite() || training.learning_rate <= 0.0 {
            return Err(invalid(format!(
                "learning rate must be positive, got {}",
                training.learning_rate
            )));
        }

        if let Some(alpha) = training.momentum
            && (!alpha.is_finite() || alpha < 0.0)
        {
            return Err(invalid(format!(
                "momentum must be a non negative number, got {alpha}"
            )));
        }

        if training.max_iterations == 0 {
            return Err(invalid("max iterations must be at least one".into()));
        }

        Ok(())
    }

    fn validate_samples(
        &self,
        network: &NetworkConfig,
        samples: &[Sample],
    ) -> Result<(), SessionErr> {
        if samples.is_empty() {
            return Err(invalid("there are no samples to train on".into()));
        }

        for (i, sample) in samples.iter().enumerate() {
            if sample.input.len() != network.inputs {
                return Err(invalid(format!(
                    "sample {i}: input has {} values, the network takes {}",
                    sample.input.len(),
                    network.inputs
                )));
            }

            if sample.target.len() != network.outputs {
                return Err(invalid(format!(
                    "sample {i}: target has {} values, the network gives {}",
                    sample.target.len(),
                    network.outputs
                )));
            }

            if sample.input.iter().chain(&sample.target).any(|v| !v.is_finite()) {
                return Err(invalid(format!("sample {i} holds a non finite value")));
            }
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Conversion
    // -------------------------------------------------------------------------

    fn adapt_law(&self, law: LawConfig) -> OutputLaw {
        match law {
            LawConfig::SquaredError => OutputLaw::SquaredError,
            LawConfig::Softmax => OutputLaw::Softmax,
        }
    }

    fn adapt_backend(&self, backend: BackendConfig) -> BackendKind {
        match backend {
            BackendConfig::Reference => BackendKind::Reference,
            BackendConfig::Vector => BackendKind::Vector,
            BackendConfig::Matrix => BackendKind::Matrix,
        }
    }

    fn adapt_mode(&self, momentum: Option<f64>) -> Mode {
        match momentum {
            Some(alpha) => Mode::Momentum { alpha },
            None => Mode::Plain,
        }
    }
}

fn invalid(msg: String) -> SessionErr {
    SessionErr::InvalidConfig(msg)
}
