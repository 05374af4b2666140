use std::ops::Range;

use comms::Collective;
use ndarray::{Array1, Array2, ArrayView1, s};

use super::{
    CpuEngine,
    sync::{RowSync, contiguous},
};
use crate::{MlErr, Result, arch::Network, backend::Backend};

impl<C: Collective> CpuEngine<C> {
    /// `W_k += lr * delta_k x_kᵀ` for every layer, `x_k` being the layer's input.
    pub(crate) fn update(&self, net: &mut Network, deltas: &[Array1<f64>]) -> Result<()> {
        for k in (0..net.layers.len()).rev() {
            let (done, rest) = net.layers.split_at_mut(k);
            let input = done
                .last()
                .map_or(net.input.view(), |prev| prev.activation.view());

            self.update_layer(&mut rest[0].weights, deltas[k].view(), input)?;
        }

        Ok(())
    }

    /// The momentum variant of `update`, for every layer:
    /// `dw += lr * delta xᵀ`, then `W += dw`, then `dw *= alpha`.
    pub(crate) fn update_momentum(
        &self,
        net: &mut Network,
        deltas: &[Array1<f64>],
        alpha: f64,
    ) -> Result<()> {
        let Some(momentum) = net.momentum.as_mut() else {
            return Err(MlErr::InvalidNetwork(
                "momentum buffers were never initialized".into(),
            ));
        };

        for k in (0..net.layers.len()).rev() {
            let (done, rest) = net.layers.split_at_mut(k);
            let input = done
                .last()
                .map_or(net.input.view(), |prev| prev.activation.view());

            let weights = &mut rest[0].weights;
            self.update_layer_momentum(weights, &mut momentum[k], deltas[k].view(), input, alpha)?;
        }

        Ok(())
    }

    fn update_layer(
        &self,
        weights: &mut Array2<f64>,
        delta: ArrayView1<f64>,
        input: ArrayView1<f64>,
    ) -> Result<()> {
        let stride = weights.ncols();
        let sync = RowSync::new(&self.comm, weights.nrows());

        let apply = |weights: &mut Array2<f64>, rows: Range<usize>| {
            self.backend.outer_update(
                self.learning_rate,
                delta.slice(s![rows.clone()]),
                input,
                weights.slice_mut(s![rows, ..]),
            );
        };

        apply(weights, sync.owned());
        sync.gather(contiguous(weights)?, stride)?;

        if let Some(rem) = sync.remainder() {
            apply(weights, rem);
        }

        sync.share_remainder(contiguous(weights)?, stride)
    }

    fn update_layer_momentum(
        &self,
        weights: &mut Array2<f64>,
        dw: &mut Array2<f64>,
        delta: ArrayView1<f64>,
        input: ArrayView1<f64>,
        alpha: f64,
    ) -> Result<()> {
        let stride = weights.ncols();
        let sync = RowSync::new(&self.comm, weights.nrows());

        let apply = |weights: &mut Array2<f64>, dw: &mut Array2<f64>, rows: Range<usize>| {
            let mut dw_rows = dw.slice_mut(s![rows.clone(), ..]);

            self.backend.outer_update(
                self.learning_rate,
                delta.slice(s![rows.clone()]),
                input,
                dw_rows.view_mut(),
            );
            self.backend
                .add_scaled(1.0, dw_rows.view(), weights.slice_mut(s![rows, ..]));
            self.backend.scale(dw_rows, alpha);
        };

        apply(weights, dw, sync.owned());
        sync.gather(contiguous(weights)?, stride)?;
        sync.gather(contiguous(dw)?, stride)?;

        if let Some(rem) = sync.remainder() {
            apply(weights, dw, rem);
        }

        sync.share_remainder(contiguous(weights)?, stride)?;
        sync.share_remainder(contiguous(dw)?, stride)
    }
}
