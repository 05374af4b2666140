use super::ParamGen;

/// Repeats one value a fixed amount of times.
pub struct ConstParamGen {
    value: f64,
    left: usize,
}

impl ConstParamGen {
    /// # Arguments
    /// * `value` - The value every weight gets.
    /// * `count` - How many weights it can fill.
    pub fn new(value: f64, count: usize) -> Self {
        Self { value, left: count }
    }
}

impl ParamGen for ConstParamGen {
    fn sample(&mut self, n: usize) -> Option<Vec<f64>> {
        (self.left > 0).then(|| {
            let take = n.min(self.left);
            self.left -= take;
            vec![self.value; take]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_dry() {
        let mut zeros = ConstParamGen::new(0., 0);
        assert_eq!(zeros.sample(4), None);
    }

    #[test]
    fn hands_out_what_is_left() {
        let mut halves = ConstParamGen::new(0.5, 5);

        assert_eq!(halves.sample(2), Some(vec![0.5; 2]));
        assert_eq!(halves.sample(10), Some(vec![0.5; 3]));
        assert_eq!(halves.sample(1), None);
    }
}
