use crate::{
    Collective, Result,
    collective::{check_gather, check_root},
};

/// A group made of a single worker, every collective is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct Solo;

impl Collective for Solo {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn broadcast(&self, _buf: &mut [f64], root: usize) -> Result<()> {
        check_root(root, 1)
    }

    fn all_gather_rows(&self, buf: &mut [f64], block: usize) -> Result<()> {
        check_gather(buf.len(), block, 1)
    }

    fn all_reduce_sum(&self, _buf: &mut [f64]) -> Result<()> {
        Ok(())
    }

    fn barrier(&self) -> Result<()> {
        Ok(())
    }
}
