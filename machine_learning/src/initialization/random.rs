use std::{cell::RefCell, rc::Rc};

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use super::{ParamGen, RandErr};

/// Draws weights from a distribution `D` using a shared random number generator.
///
/// Generators built over the same `Rc` keep consuming one seeded stream, so a whole network
/// is reproducible from a single seed.
pub struct RandParamGen<R: Rng, D: Distribution<f64>> {
    rng: Rc<RefCell<R>>,
    distribution: D,
    left: usize,
}

impl<R: Rng, D: Distribution<f64>> RandParamGen<R, D> {
    /// # Arguments
    /// * `rng` - The shared random number generator.
    /// * `distribution` - Where the values come from.
    /// * `count` - How many values it can draw before running dry.
    pub fn new(rng: Rc<RefCell<R>>, distribution: D, count: usize) -> Self {
        Self {
            rng,
            distribution,
            left: count,
        }
    }
}

impl<R: Rng> RandParamGen<R, Uniform<f64>> {
    /// Draws `count` values uniformly from `[low, high)`.
    ///
    /// # Returns
    /// `RandErr::EmptyRange` unless `low < high` and both are finite.
    pub fn uniform(
        rng: Rc<RefCell<R>>,
        count: usize,
        low: f64,
        high: f64,
    ) -> Result<Self, RandErr> {
        let uniform = Uniform::new(low, high).map_err(|_| RandErr::EmptyRange { low, high })?;
        Ok(Self::new(rng, uniform, count))
    }

    /// Draws `count` values uniformly from `[-1/√fan_in, 1/√fan_in)`, the default range for
    /// a layer with `fan_in` inputs.
    pub fn fan_in_uniform(
        rng: Rc<RefCell<R>>,
        count: usize,
        fan_in: usize,
    ) -> Result<Self, RandErr> {
        let bound = (fan_in as f64).sqrt().recip();
        Self::uniform(rng, count, -bound, bound)
    }
}

impl<R: Rng, D: Distribution<f64>> ParamGen for RandParamGen<R, D> {
    fn sample(&mut self, n: usize) -> Option<Vec<f64>> {
        if self.left == 0 {
            return None;
        }

        let take = n.min(self.left);
        self.left -= take;

        let mut rng = self.rng.borrow_mut();
        let values = (&self.distribution).sample_iter(&mut *rng).take(take);
        Some(values.collect())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn seeded_rng() -> Rc<RefCell<StdRng>> {
        Rc::new(RefCell::new(StdRng::seed_from_u64(42)))
    }

    #[test]
    fn fan_in_uniform_bounds() {
        const FAN_IN: usize = 16;

        let mut param_gen = RandParamGen::fan_in_uniform(seeded_rng(), 1000, FAN_IN).unwrap();
        let sample = param_gen.sample(1000).unwrap();

        assert_eq!(sample.len(), 1000);
        assert!(sample.iter().all(|&w| (-0.25..0.25).contains(&w)));
        assert!(param_gen.sample(1).is_none());
    }

    #[test]
    fn same_seed_same_sample() {
        let mut a = RandParamGen::uniform(seeded_rng(), 8, -1., 1.).unwrap();
        let mut b = RandParamGen::uniform(seeded_rng(), 8, -1., 1.).unwrap();

        assert_eq!(a.sample(8), b.sample(8));
    }

    #[test]
    fn shared_rng_keeps_the_stream_going() {
        let rng = seeded_rng();
        let mut first = RandParamGen::uniform(Rc::clone(&rng), 4, -1., 1.).unwrap();
        let mut second = RandParamGen::uniform(rng, 4, -1., 1.).unwrap();

        let mut whole = RandParamGen::uniform(seeded_rng(), 8, -1., 1.).unwrap();
        let mut joined = first.sample(4).unwrap();
        joined.extend(second.sample(4).unwrap());

        assert_eq!(whole.sample(8).unwrap(), joined);
    }

    #[test]
    fn empty_fan_in_is_rejected() {
        let res = RandParamGen::fan_in_uniform(seeded_rng(), 1, 0);
        assert!(matches!(res, Err(RandErr::EmptyRange { .. })));
    }
}
