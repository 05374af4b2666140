mod delta;
mod forward;
mod loss;
mod sync;
mod update;

use comms::Collective;

use crate::{MlErr, Result, arch::Network, backend::BackendKind};

/// The learning rate used unless an engine is configured otherwise.
pub const LEARN_RATE: f64 = 0.01;

/// Runs the forward pass, the loss and the training steps over a network.
///
/// A training driver only talks to an `Engine`, so any implementation can stand in for the
/// whole pipeline.
pub trait Engine {
    /// Refreshes every layer's activation from the network's current input.
    fn forward(&self, net: &mut Network) -> Result<()>;

    /// The loss of the latest output against `target`.
    fn compute_error(&self, net: &Network, target: &[f64]) -> Result<f64>;

    /// Back-propagates the latest output's error, updates every weight and runs forward again.
    ///
    /// # Returns
    /// The loss before the step minus the loss after it.
    fn train_step(&self, net: &mut Network, target: &[f64]) -> Result<f64>;

    /// Like `train_step`, accumulating the updates in the momentum buffers.
    ///
    /// # Arguments
    /// * `net` - A network with its momentum buffers initialized.
    /// * `target` - The expected output.
    /// * `alpha` - The decay applied to the momentum after every step.
    fn train_step_momentum(&self, net: &mut Network, target: &[f64], alpha: f64) -> Result<f64>;

    /// Zeroes the momentum buffers before a fresh training run.
    fn reset_momentum(&self, net: &mut Network) -> Result<()>;
}

/// The engine running on this worker's cores, sharing the work of every layer with the rest
/// of the group.
///
/// Every worker of a group must drive its own engine through the same calls on identical
/// networks.
pub struct CpuEngine<C: Collective> {
    comm: C,
    backend: BackendKind,
    learning_rate: f64,
}

impl<C: Collective> CpuEngine<C> {
    /// Creates a new `CpuEngine` with the default learning rate.
    ///
    /// # Arguments
    /// * `comm` - This worker's handle into its group.
    /// * `backend` - The linear algebra implementation to use.
    pub fn new(comm: C, backend: BackendKind) -> Self {
        Self {
            comm,
            backend,
            learning_rate: LEARN_RATE,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn comm(&self) -> &C {
        &self.comm
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Overwrites every worker's weights with the first worker's.
    pub fn broadcast_weights(&self, net: &mut Network) -> Result<()> {
        net.validate()?;

        for layer in net.layers.iter_mut() {
            self.comm.broadcast(sync::contiguous(&mut layer.weights)?, 0)?;
        }

        Ok(())
    }

    fn check_target(net: &Network, target: &[f64]) -> Result<()> {
        if target.len() != net.n_outputs() {
            return Err(MlErr::SizeMismatch {
                a: "target",
                b: "network outputs",
                got: target.len(),
                expected: net.n_outputs(),
            });
        }

        Ok(())
    }
}

impl<C: Collective> Engine for CpuEngine<C> {
    fn forward(&self, net: &mut Network) -> Result<()> {
        net.validate()?;
        self.run_forward(net)
    }

    fn compute_error(&self, net: &Network, target: &[f64]) -> Result<f64> {
        net.validate()?;
        Self::check_target(net, target)?;
        self.error(net, target)
    }

    fn train_step(&self, net: &mut Network, target: &[f64]) -> Result<f64> {
        net.validate()?;
        Self::check_target(net, target)?;

        let before = self.error(net, target)?;
        let deltas = self.deltas(net, target)?;
        self.update(net, &deltas)?;

        self.run_forward(net)?;
        let after = self.error(net, target)?;
        Ok(before - after)
    }

    fn train_step_momentum(&self, net: &mut Network, target: &[f64], alpha: f64) -> Result<f64> {
        net.validate()?;
        Self::check_target(net, target)?;

        if net.momentum().is_none() {
            return Err(MlErr::InvalidNetwork(
                "momentum buffers were never initialized".into(),
            ));
        }

        let before = self.error(net, target)?;
        let deltas = self.deltas(net, target)?;
        self.update_momentum(net, &deltas, alpha)?;

        self.run_forward(net)?;
        let after = self.error(net, target)?;
        Ok(before - after)
    }

    fn reset_momentum(&self, net: &mut Network) -> Result<()> {
        net.reset_momentum()
    }
}
