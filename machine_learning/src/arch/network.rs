use std::{cell::RefCell, mem::size_of, rc::Rc};

use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1};
use rand::{SeedableRng, rngs::StdRng};

use super::{Layer, OutputLaw};
use crate::{
    MlErr, Result,
    initialization::{ChainedParamGen, ParamGen, RandErr, RandParamGen},
};

/// The widths a network is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub inputs: usize,
    pub hiddens: Vec<usize>,
    pub outputs: usize,
}

impl Shape {
    /// Creates a new `Shape`.
    ///
    /// # Arguments
    /// * `inputs` - The width of the input vector.
    /// * `hiddens` - The amount of neurons of every hidden layer, in order.
    /// * `outputs` - The width of the output layer.
    pub fn new(inputs: usize, hiddens: impl Into<Vec<usize>>, outputs: usize) -> Self {
        Self {
            inputs,
            hiddens: hiddens.into(),
            outputs,
        }
    }

    /// The `(n_neurons, n_inputs)` pair of every layer, hidden layers first.
    pub fn layer_dims(&self) -> Vec<(usize, usize)> {
        let widths: Vec<_> = std::iter::once(self.inputs)
            .chain(self.hiddens.iter().copied())
            .chain(std::iter::once(self.outputs))
            .collect();

        widths.windows(2).map(|w| (w[1], w[0])).collect()
    }
}

/// A multi-layer perceptron: an input buffer, the hidden layers followed by the output layer,
/// and the optional momentum buffers mirroring every weight matrix.
///
/// Every engine call mutates the network in place, the whole network is released at once.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) input: Array1<f64>,
    pub(crate) layers: Vec<Layer>,
    pub(crate) momentum: Option<Vec<Array2<f64>>>,
    law: OutputLaw,
}

impl Network {
    /// Creates a new `Network` with every weight set to zero.
    ///
    /// # Arguments
    /// * `shape` - The widths of the network.
    /// * `law` - The behavior of the output layer.
    ///
    /// # Returns
    /// An error if the shape has no hidden layer or any zero sized layer.
    pub fn new(shape: &Shape, law: OutputLaw) -> Result<Self> {
        let weights = shape
            .layer_dims()
            .into_iter()
            .map(|dim| Array2::zeros(dim))
            .collect();

        Self::from_weights(weights, law)
    }

    /// Creates a new `Network` from the weight matrices of its layers.
    ///
    /// # Arguments
    /// * `weights` - One `n_neurons x n_inputs` matrix per layer, the output layer last.
    /// * `law` - The behavior of the output layer.
    ///
    /// # Returns
    /// An error if adjacent matrices don't chain or the network fails validation.
    pub fn from_weights(weights: Vec<Array2<f64>>, law: OutputLaw) -> Result<Self> {
        if weights.len() < 2 {
            return Err(MlErr::InvalidNetwork(
                "a network needs at least one hidden layer and an output layer".into(),
            ));
        }

        for pair in weights.windows(2) {
            if pair[1].ncols() != pair[0].nrows() {
                return Err(MlErr::SizeMismatch {
                    a: "layer inputs",
                    b: "previous layer neurons",
                    got: pair[1].ncols(),
                    expected: pair[0].nrows(),
                });
            }
        }

        let net = Self {
            input: Array1::zeros(weights[0].ncols()),
            layers: weights.into_iter().map(Layer::new).collect(),
            momentum: None,
            law,
        };

        net.validate()?;
        debug!("network allocation: {} bytes", net.allocation_bytes());
        Ok(net)
    }

    /// Creates a new `Network` drawing every weight from a generator.
    ///
    /// Layers are filled in order, each one row by row.
    ///
    /// # Arguments
    /// * `shape` - The widths of the network.
    /// * `law` - The behavior of the output layer.
    /// * `param_gen` - The source of the initial weights.
    ///
    /// # Returns
    /// An error if the shape is invalid or the generator runs out of values.
    pub fn generate(shape: &Shape, law: OutputLaw, param_gen: &mut dyn ParamGen) -> Result<Self> {
        let mut net = Self::new(shape, law)?;

        for (k, layer) in net.layers.iter_mut().enumerate() {
            let len = layer.weights.len();
            let mut values = Vec::with_capacity(len);

            while values.len() < len {
                match param_gen.sample(len - values.len()) {
                    Some(sample) if !sample.is_empty() => values.extend(sample),
                    _ => {
                        return Err(MlErr::InvalidParams(format!(
                            "generator exhausted after {} of the {len} weights of layer {k}",
                            values.len()
                        )));
                    }
                }
            }

            layer.weights.iter_mut().zip(values).for_each(|(w, v)| *w = v);
        }

        Ok(net)
    }

    /// Creates a new `Network` with random weights.
    ///
    /// The weights of a layer with `n_inputs` inputs are uniform in `[-1/√n_inputs,
    /// 1/√n_inputs)`, all layers draw from a single stream seeded with `seed`.
    ///
    /// # Arguments
    /// * `shape` - The widths of the network.
    /// * `law` - The behavior of the output layer.
    /// * `seed` - The seed of the random number generator.
    pub fn random(shape: &Shape, law: OutputLaw, seed: u64) -> Result<Self> {
        let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(seed)));

        let param_gens = shape
            .layer_dims()
            .into_iter()
            .map(|(n, m)| {
                let param_gen = RandParamGen::fan_in_uniform(Rc::clone(&rng), n * m, m)?;
                Ok(Box::new(param_gen) as Box<dyn ParamGen>)
            })
            .collect::<std::result::Result<Vec<_>, RandErr>>()?;

        let net = Self::generate(shape, law, &mut ChainedParamGen::new(param_gens))?;
        info!(
            "generated a {:?} network with seed {seed}, total allocation: {} bytes",
            shape,
            net.allocation_bytes()
        );

        Ok(net)
    }

    /// Checks that every buffer is present and that adjacent layers chain.
    ///
    /// Read only, calling it again on an untouched network gives the same answer.
    ///
    /// # Returns
    /// `MlErr::InvalidNetwork` naming the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(MlErr::InvalidNetwork(reason));

        if self.input.is_empty() {
            return invalid("the network has no inputs".into());
        }

        if self.layers.len() < 2 {
            return invalid("a network needs at least one hidden layer and an output layer".into());
        }

        let mut width = self.input.len();
        for (k, layer) in self.layers.iter().enumerate() {
            if layer.n_neurons() == 0 || layer.n_inputs() == 0 {
                return invalid(format!("layer {k} has a zero sized dimension"));
            }

            if layer.n_inputs() != width {
                return invalid(format!(
                    "layer {k} takes {} inputs but receives {width}",
                    layer.n_inputs()
                ));
            }

            if layer.activation.len() != layer.n_neurons() {
                return invalid(format!(
                    "layer {k} holds {} activations for {} neurons",
                    layer.activation.len(),
                    layer.n_neurons()
                ));
            }

            if !layer.weights.is_standard_layout() {
                return invalid(format!("layer {k} weights are not stored row-major"));
            }

            width = layer.n_neurons();
        }

        if let Some(momentum) = &self.momentum {
            if momentum.len() != self.layers.len() {
                return invalid(format!(
                    "{} momentum buffers for {} layers",
                    momentum.len(),
                    self.layers.len()
                ));
            }

            for (k, (dw, layer)) in momentum.iter().zip(&self.layers).enumerate() {
                if dw.dim() != layer.weights.dim() || !dw.is_standard_layout() {
                    return invalid(format!(
                        "momentum buffer {k} is {:?}, its weights are {:?}",
                        dw.dim(),
                        layer.weights.dim()
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn law(&self) -> OutputLaw {
        self.law
    }

    pub fn shape(&self) -> Shape {
        Shape {
            inputs: self.input.len(),
            hiddens: self.hiddens().iter().map(Layer::n_neurons).collect(),
            outputs: self.n_outputs(),
        }
    }

    pub fn n_inputs(&self) -> usize {
        self.input.len()
    }

    pub fn n_outputs(&self) -> usize {
        self.output_layer().n_neurons()
    }

    /// Every layer, the output layer last.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn hiddens(&self) -> &[Layer] {
        &self.layers[..self.layers.len() - 1]
    }

    pub fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    pub fn layer_mut(&mut self, idx: usize) -> Option<&mut Layer> {
        self.layers.get_mut(idx)
    }

    pub fn input(&self) -> ArrayView1<'_, f64> {
        self.input.view()
    }

    /// The activation of the output layer after the latest forward pass.
    pub fn output(&self) -> ArrayView1<'_, f64> {
        self.output_layer().activation()
    }

    /// Copies `input` into the network's input buffer.
    ///
    /// # Returns
    /// An error if `input` doesn't have exactly `n_inputs` values.
    pub fn set_input(&mut self, input: &[f64]) -> Result<()> {
        if input.len() != self.input.len() {
            return Err(MlErr::SizeMismatch {
                a: "input",
                b: "network inputs",
                got: input.len(),
                expected: self.input.len(),
            });
        }

        self.input.iter_mut().zip(input).for_each(|(x, &v)| *x = v);
        Ok(())
    }

    /// Allocates one zeroed momentum buffer per layer, replacing any previous ones.
    pub fn init_momentum(&mut self) {
        let momentum = self
            .layers
            .iter()
            .map(|layer| Array2::zeros(layer.weights.raw_dim()))
            .collect();

        self.momentum = Some(momentum);
        debug!("momentum allocated, total allocation: {} bytes", self.allocation_bytes());
    }

    /// Zeroes every momentum buffer.
    ///
    /// # Returns
    /// An error if the momentum buffers were never allocated.
    pub fn reset_momentum(&mut self) -> Result<()> {
        let Some(momentum) = &mut self.momentum else {
            return Err(MlErr::InvalidNetwork(
                "momentum buffers were never initialized".into(),
            ));
        };

        momentum.iter_mut().for_each(|dw| dw.fill(0.));
        Ok(())
    }

    pub fn drop_momentum(&mut self) {
        self.momentum = None;
    }

    pub fn momentum(&self) -> Option<&[Array2<f64>]> {
        self.momentum.as_deref()
    }

    /// The amount of trainable weights.
    pub fn param_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.weights.len()).sum()
    }

    /// The size of every buffer held by the network.
    pub fn allocation_bytes(&self) -> usize {
        let activations: usize = self.layers.iter().map(|l| l.activation.len()).sum();
        let momentum = self.momentum.as_ref().map_or(0, |_| self.param_count());

        (self.input.len() + self.param_count() + activations + momentum) * size_of::<f64>()
    }
}
