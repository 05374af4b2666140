use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// A fully connected layer: the incoming weights of every neuron and its latest output.
///
/// Row `i` of the weights holds the incoming weights of neuron `i`.
#[derive(Debug, Clone)]
pub struct Layer {
    pub(crate) weights: Array2<f64>,
    pub(crate) activation: Array1<f64>,
}

impl Layer {
    /// Creates a new `Layer` from its weights, with a zeroed activation.
    ///
    /// # Arguments
    /// * `weights` - A `n_neurons x n_inputs` matrix.
    pub fn new(weights: Array2<f64>) -> Self {
        let weights = weights.as_standard_layout().into_owned();
        let activation = Array1::zeros(weights.nrows());

        Self {
            weights,
            activation,
        }
    }

    pub fn n_neurons(&self) -> usize {
        self.weights.nrows()
    }

    pub fn n_inputs(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    pub fn weights_mut(&mut self) -> &mut Array2<f64> {
        &mut self.weights
    }

    pub fn activation(&self) -> ArrayView1<'_, f64> {
        self.activation.view()
    }
}
