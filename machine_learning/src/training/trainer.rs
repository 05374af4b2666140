use log::debug;

use crate::{Result, arch::Network, engine::Engine};

/// The amount of steps after which a sample is given up on.
pub const MAX_ITERATIONS: usize = 10240;

/// How the weights get updated on every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Plain,
    Momentum { alpha: f64 },
}

/// What training a single sample ended with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOutcome {
    /// The loss right after the first forward pass.
    pub initial_error: f64,
    /// The value returned by the last step, the loss it removed.
    pub error: f64,
    /// The amount of steps taken.
    pub iterations: usize,
    /// Whether the output classified the sample right after the first step.
    pub first_matched: bool,
    /// Whether the output classified the sample right when training stopped.
    pub matched: bool,
}

/// Trains a network on one sample at a time until it converges or the step budget runs out.
///
/// A sample converges once a step lowers the loss by no more than `threshold` and the output
/// classifies it right. Running out of steps is reported in the outcome, never as an error.
pub struct Trainer<E: Engine> {
    engine: E,
    mode: Mode,
    threshold: f64,
    max_iterations: usize,
}

impl<E: Engine> Trainer<E> {
    /// Creates a new `Trainer` capped at `MAX_ITERATIONS` steps per sample.
    ///
    /// # Arguments
    /// * `engine` - The engine running every step.
    /// * `mode` - How the weights get updated.
    /// * `threshold` - The loss improvement under which a step counts as converged.
    pub fn new(engine: E, mode: Mode, threshold: f64) -> Self {
        Self {
            engine,
            mode,
            threshold,
            max_iterations: MAX_ITERATIONS,
        }
    }

    /// Sets the amount of steps per sample, at least one step is always taken.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Trains `net` on a single sample.
    ///
    /// In momentum mode the momentum buffers are zeroed first, allocating them if needed.
    ///
    /// # Arguments
    /// * `net` - The network to train.
    /// * `input` - The sample's input.
    /// * `target` - The sample's expected output.
    ///
    /// # Returns
    /// The outcome of the run, or an error if the network or the sample is malformed.
    pub fn train_sample(
        &self,
        net: &mut Network,
        input: &[f64],
        target: &[f64],
    ) -> Result<TrainOutcome> {
        net.set_input(input)?;

        if let Mode::Momentum { .. } = self.mode {
            if net.momentum().is_none() {
                net.init_momentum();
            }

            self.engine.reset_momentum(net)?;
        }

        self.engine.forward(net)?;
        let initial_error = self.engine.compute_error(net, target)?;
        debug!("initial error {initial_error:.10}");

        let law = net.law();
        let mut iterations = 0;
        let mut first_matched = false;

        let (error, matched) = loop {
            let error = match self.mode {
                Mode::Plain => self.engine.train_step(net, target)?,
                Mode::Momentum { alpha } => self.engine.train_step_momentum(net, target, alpha)?,
            };

            iterations += 1;
            let matched = law.matches(net.output(), target);

            if iterations == 1 {
                first_matched = matched;
                debug!("first step {}", if matched { "OK" } else { "NO" });
            }

            if iterations >= self.max_iterations || (error <= self.threshold && matched) {
                break (error, matched);
            }
        };

        debug!(
            "init={initial_error:.10} {} N_ITER={iterations} {}",
            if first_matched { "OK" } else { "NO" },
            if matched { "SUCCESS" } else { "FAIL" }
        );

        Ok(TrainOutcome {
            initial_error,
            error,
            iterations,
            first_matched,
            matched,
        })
    }
}

#[cfg(test)]
mod tests {
    use comms::Solo;
    use ndarray::array;

    use super::*;
    use crate::{
        arch::OutputLaw,
        backend::BackendKind,
        engine::CpuEngine,
    };

    fn fixed_network(law: OutputLaw) -> Network {
        let hidden = array![[0.1, 0.2], [-0.3, 0.4], [0.5, -0.6]];
        let output = array![[0.7, -0.8, 0.9], [-1.0, 1.1, -1.2]];
        Network::from_weights(vec![hidden, output], law).unwrap()
    }

    fn trainer(mode: Mode) -> Trainer<CpuEngine<Solo>> {
        Trainer::new(CpuEngine::new(Solo, BackendKind::Reference), mode, 1e-6)
    }

    #[test]
    fn plain_training_flips_the_predicted_class() {
        let mut net = fixed_network(OutputLaw::SquaredError);
        let outcome = trainer(Mode::Plain)
            .train_sample(&mut net, &[1., -1.], &[0., 1.])
            .unwrap();

        assert!(!outcome.first_matched);
        assert!(outcome.matched);
        assert!(outcome.iterations < MAX_ITERATIONS);
        assert!(outcome.error <= 1e-6);
        assert!(net.output()[1] > net.output()[0]);
    }

    #[test]
    fn momentum_training_converges_and_allocates_buffers() {
        let mut net = fixed_network(OutputLaw::SquaredError);
        let outcome = trainer(Mode::Momentum { alpha: 0.2 })
            .train_sample(&mut net, &[1., -1.], &[1., 0.])
            .unwrap();

        assert!(outcome.matched);
        assert!(outcome.iterations < MAX_ITERATIONS);
        assert!(net.momentum().is_some());
    }

    #[test]
    fn cap_ends_the_run_without_an_error() {
        let mut net = fixed_network(OutputLaw::SquaredError);
        let outcome = trainer(Mode::Plain)
            .with_max_iterations(3)
            .train_sample(&mut net, &[1., -1.], &[0., 1.])
            .unwrap();

        assert_eq!(outcome.iterations, 3);
        assert!(!outcome.matched);
    }

    #[test]
    fn softmax_outputs_inside_the_margin_never_match() {
        let mut net = fixed_network(OutputLaw::Softmax);
        let outcome = trainer(Mode::Plain)
            .with_max_iterations(50)
            .train_sample(&mut net, &[1., -1.], &[1., 0.])
            .unwrap();

        assert_eq!(outcome.iterations, 50);
        assert!(!outcome.matched);
        assert!(outcome.initial_error > 0.);
    }

    #[test]
    fn malformed_samples_are_errors() {
        let mut net = fixed_network(OutputLaw::SquaredError);
        let trainer = trainer(Mode::Plain);

        assert!(trainer.train_sample(&mut net, &[1.], &[1., 0.]).is_err());
        assert!(trainer.train_sample(&mut net, &[1., -1.], &[1.]).is_err());
    }
}
