use std::ops::Range;

use comms::Collective;
use ndarray::{Array1, ArrayView1, Zip, s};

use super::{
    CpuEngine,
    sync::{RowSync, contiguous},
};
use crate::{
    Result,
    arch::{Layer, Network, activations::dact},
    backend::Backend,
};

impl<C: Collective> CpuEngine<C> {
    /// Back-propagates the error of the current output, one delta vector per layer.
    ///
    /// # Returns
    /// The deltas, the output layer's last.
    pub(crate) fn deltas(&self, net: &Network, target: &[f64]) -> Result<Vec<Array1<f64>>> {
        let n_layers = net.layers.len();
        let mut deltas: Vec<_> = net
            .layers
            .iter()
            .map(|layer| Array1::zeros(layer.n_neurons()))
            .collect();

        self.output_deltas(net, target, &mut deltas[n_layers - 1])?;

        for k in (0..n_layers - 1).rev() {
            let (head, tail) = deltas.split_at_mut(k + 1);
            let (layer, next) = (&net.layers[k], &net.layers[k + 1]);
            self.hidden_deltas(layer, next, tail[0].view(), &mut head[k])?;
        }

        Ok(deltas)
    }

    fn output_deltas(&self, net: &Network, target: &[f64], delta: &mut Array1<f64>) -> Result<()> {
        let law = net.law();
        let output = net.output();
        let sync = RowSync::new(&self.comm, delta.len());

        let fill = |delta: &mut Array1<f64>, rows: Range<usize>| {
            for i in rows {
                delta[i] = law.output_delta(target[i], output[i]);
            }
        };

        fill(delta, sync.owned());
        sync.gather(contiguous(delta)?, 1)?;

        if let Some(rem) = sync.remainder() {
            fill(delta, rem);
        }

        sync.share_remainder(contiguous(delta)?, 1)
    }

    /// `delta = (Wᵀ next_delta) ⊙ dact(activation)` for a hidden layer, `W` being the weights
    /// of the layer after it. Columns of `W` are sharded like rows anywhere else.
    fn hidden_deltas(
        &self,
        layer: &Layer,
        next: &Layer,
        next_delta: ArrayView1<f64>,
        delta: &mut Array1<f64>,
    ) -> Result<()> {
        let sync = RowSync::new(&self.comm, layer.n_neurons());

        let fill = |delta: &mut Array1<f64>, cols: Range<usize>| {
            let transposed = next.weights.slice(s![.., cols.clone()]).reversed_axes();
            let mut out = delta.slice_mut(s![cols.clone()]);

            self.backend.matvec(transposed, next_delta, out.view_mut());
            Zip::from(&mut out)
                .and(layer.activation.slice(s![cols]))
                .par_for_each(|d, &y| *d *= dact(y));
        };

        fill(delta, sync.owned());
        sync.gather(contiguous(delta)?, 1)?;

        if let Some(rem) = sync.remainder() {
            fill(delta, rem);
        }

        sync.share_remainder(contiguous(delta)?, 1)
    }
}
