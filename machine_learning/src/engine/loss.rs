use std::ops::Range;

use comms::Collective;

use super::{CpuEngine, sync::RowSync};
use crate::{Result, arch::Network};

impl<C: Collective> CpuEngine<C> {
    /// The loss of the current output against `target`, as defined by the network's law.
    ///
    /// Every owner sums its rows, the partial sums are reduced, then the remainder rows are
    /// summed by their owner and added on top.
    pub(crate) fn error(&self, net: &Network, target: &[f64]) -> Result<f64> {
        let law = net.law();
        let output = net.output();
        let sync = RowSync::new(&self.comm, output.len());

        let term_sum = |rows: Range<usize>| -> f64 {
            rows.map(|i| law.loss_term(target[i], output[i])).sum()
        };

        let mut total = sync.reduce_sum(term_sum(sync.owned()))?;
        let rem = sync.remainder().map_or(0., term_sum);
        total += sync.share_remainder_value(rem)?;

        Ok(law.loss_scale() * total)
    }
}
