use crate::{CommErr, Result};

/// A fixed group of workers exchanging `f64` buffers through blocking collective operations.
///
/// Every worker of the group must issue the same operations in the same order with buffers of
/// the same length. Each call returns once every worker has reached it.
pub trait Collective: Send {
    /// The position of this worker inside the group, in `0..size`.
    fn rank(&self) -> usize;

    /// The amount of workers in the group.
    fn size(&self) -> usize;

    /// Overwrites every worker's `buf` with the contents of `root`'s.
    ///
    /// # Arguments
    /// * `buf` - The buffer to send when this worker is the root, or to fill otherwise.
    /// * `root` - The rank of the worker holding the data.
    fn broadcast(&self, buf: &mut [f64], root: usize) -> Result<()>;

    /// Merges equally sized row blocks so every worker ends with all of them.
    ///
    /// Worker `r` contributes `buf[r * block..(r + 1) * block]`, the elements past
    /// `size * block` are left untouched.
    ///
    /// # Arguments
    /// * `buf` - The buffer holding this worker's block in place.
    /// * `block` - The amount of elements owned by each worker.
    fn all_gather_rows(&self, buf: &mut [f64], block: usize) -> Result<()>;

    /// Replaces every worker's `buf` with the elementwise sum of all of them.
    ///
    /// Terms are added in rank order, so every worker gets the same bits back.
    fn all_reduce_sum(&self, buf: &mut [f64]) -> Result<()>;

    /// Blocks until every worker of the group reaches this call.
    fn barrier(&self) -> Result<()>;
}

pub(crate) fn check_root(root: usize, size: usize) -> Result<()> {
    if root >= size {
        return Err(CommErr::InvalidRoot { root, size });
    }

    Ok(())
}

pub(crate) fn check_gather(len: usize, block: usize, size: usize) -> Result<()> {
    let expected = block * size;
    if expected > len {
        return Err(CommErr::LengthMismatch { expected, got: len });
    }

    Ok(())
}
