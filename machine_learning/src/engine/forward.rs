use std::ops::Range;

use comms::Collective;
use ndarray::{ArrayView1, s};

use super::{
    CpuEngine,
    sync::{RowSync, contiguous},
};
use crate::{
    Result,
    arch::{
        Layer, Network, OutputLaw,
        activations::{activate, softmax_shift, softmax_term},
    },
    backend::Backend,
};

impl<C: Collective> CpuEngine<C> {
    /// Refreshes the activation of every layer, from the first hidden layer to the output.
    pub(crate) fn run_forward(&self, net: &mut Network) -> Result<()> {
        let softmax = net.law() == OutputLaw::Softmax;
        let n_layers = net.layers.len();

        for k in 0..n_layers {
            let (done, rest) = net.layers.split_at_mut(k);
            let input = done
                .last()
                .map_or(net.input.view(), |prev| prev.activation.view());

            if softmax && k + 1 == n_layers {
                self.softmax_layer(&mut rest[0], input)?;
            } else {
                self.activate_layer(&mut rest[0], input)?;
            }
        }

        Ok(())
    }

    fn activate_layer(&self, layer: &mut Layer, input: ArrayView1<f64>) -> Result<()> {
        let sync = RowSync::new(&self.comm, layer.n_neurons());

        self.activate_rows(layer, input, sync.owned());
        sync.gather(contiguous(&mut layer.activation)?, 1)?;

        if let Some(rem) = sync.remainder() {
            self.activate_rows(layer, input, rem);
        }

        sync.share_remainder(contiguous(&mut layer.activation)?, 1)
    }

    fn activate_rows(&self, layer: &mut Layer, input: ArrayView1<f64>, rows: Range<usize>) {
        let weights = layer.weights.slice(s![rows.clone(), ..]);
        let mut out = layer.activation.slice_mut(s![rows]);

        self.backend.matvec(weights, input, out.view_mut());
        activate(out);
    }

    /// The output layer of a softmax network.
    ///
    /// The raw logits are merged first so every worker picks the same shift, then rows hold
    /// `e^(v - shift)` and get divided by the sum over every row once all the partial sums
    /// are known.
    fn softmax_layer(&self, layer: &mut Layer, input: ArrayView1<f64>) -> Result<()> {
        let sync = RowSync::new(&self.comm, layer.n_neurons());
        let owned = sync.owned();
        let rem = sync.remainder();

        self.logits(layer, input, owned.clone());
        sync.gather(contiguous(&mut layer.activation)?, 1)?;

        if let Some(rows) = &rem {
            self.logits(layer, input, rows.clone());
        }

        sync.share_remainder(contiguous(&mut layer.activation)?, 1)?;

        let max = layer.activation.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        let shift = softmax_shift(max, layer.n_neurons());

        let partial = exp_rows(layer, owned.clone(), shift);
        let mut dv = sync.reduce_sum(partial)?;

        let rem_partial = match &rem {
            Some(rows) => exp_rows(layer, rows.clone(), shift),
            None => 0.,
        };
        dv += sync.share_remainder_value(rem_partial)?;

        layer.activation.slice_mut(s![owned]).par_mapv_inplace(|v| v / dv);
        sync.gather(contiguous(&mut layer.activation)?, 1)?;

        if let Some(rows) = rem {
            layer.activation.slice_mut(s![rows]).mapv_inplace(|v| v / dv);
        }

        sync.share_remainder(contiguous(&mut layer.activation)?, 1)
    }

    /// Fills `rows` with their raw weighted sums.
    fn logits(&self, layer: &mut Layer, input: ArrayView1<f64>, rows: Range<usize>) {
        let weights = layer.weights.slice(s![rows.clone(), ..]);
        let out = layer.activation.slice_mut(s![rows]);

        self.backend.matvec(weights, input, out);
    }
}

/// Turns the logits in `rows` into their softmax terms and returns their sum.
fn exp_rows(layer: &mut Layer, rows: Range<usize>, shift: f64) -> f64 {
    let mut out = layer.activation.slice_mut(s![rows]);

    out.par_mapv_inplace(|v| softmax_term(v, shift));
    out.iter().sum()
}
