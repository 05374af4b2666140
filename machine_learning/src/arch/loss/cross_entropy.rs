/// The cross entropy against a softmax output, `E = -Σ t * ln(o)`.
pub struct CrossEntropy;

impl CrossEntropy {
    pub const SCALE: f64 = -1.0;

    /// A zero target contributes nothing, even when its output underflowed to zero.
    pub fn term(target: f64, output: f64) -> f64 {
        if target == 0.0 {
            0.0
        } else {
            target * output.ln()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_target_ignores_a_zero_output() {
        assert_eq!(CrossEntropy::term(0., 0.), 0.);
        assert_eq!(CrossEntropy::term(1., 1.), 0.);
        assert!((CrossEntropy::term(1., 0.5) - 0.5f64.ln()).abs() < 1e-15);
    }
}
