use std::ops::Range;

use comms::Collective;
use ndarray::{Array, Dimension};

use crate::{MlErr, Result, shard::ShardPlan};

/// Binds a `ShardPlan` to this worker's collective and performs the merges that follow every
/// sharded computation.
pub(crate) struct RowSync<'a, C: Collective> {
    comm: &'a C,
    plan: ShardPlan,
}

impl<'a, C: Collective> RowSync<'a, C> {
    pub fn new(comm: &'a C, rows: usize) -> Self {
        Self {
            comm,
            plan: ShardPlan::new(rows, comm.size()),
        }
    }

    /// The rows this worker computes first.
    pub fn owned(&self) -> Range<usize> {
        self.plan.owned(self.comm.rank())
    }

    /// The remainder rows, only for the worker in charge of them.
    pub fn remainder(&self) -> Option<Range<usize>> {
        self.plan
            .owns_remainder(self.comm.rank())
            .then(|| self.plan.remainder())
    }

    /// Merges every owner's rows, each row spanning `stride` elements of `buf`.
    pub fn gather(&self, buf: &mut [f64], stride: usize) -> Result<()> {
        self.comm.all_gather_rows(buf, self.plan.quotient() * stride)?;
        Ok(())
    }

    /// Copies the remainder rows from their owner into every worker's `buf`.
    pub fn share_remainder(&self, buf: &mut [f64], stride: usize) -> Result<()> {
        if !self.plan.has_remainder() {
            return Ok(());
        }

        let rem = self.plan.remainder();
        let slice = &mut buf[rem.start * stride..rem.end * stride];
        self.comm.broadcast(slice, ShardPlan::REMAINDER_OWNER)?;
        Ok(())
    }

    /// The sum of every worker's `partial`.
    pub fn reduce_sum(&self, partial: f64) -> Result<f64> {
        let mut buf = [partial];
        self.comm.all_reduce_sum(&mut buf)?;
        Ok(buf[0])
    }

    /// The remainder owner's `value` on every worker, zero when there are no remainder rows.
    pub fn share_remainder_value(&self, value: f64) -> Result<f64> {
        if !self.plan.has_remainder() {
            return Ok(0.);
        }

        let mut buf = [value];
        self.comm.broadcast(&mut buf, ShardPlan::REMAINDER_OWNER)?;
        Ok(buf[0])
    }
}

/// The elements of `a` as one row-major slice.
pub(crate) fn contiguous<D: Dimension>(a: &mut Array<f64, D>) -> Result<&mut [f64]> {
    a.as_slice_mut()
        .ok_or_else(|| MlErr::InvalidNetwork("buffer is not stored row-major".into()))
}
