/// The shift of the softmax numerator, `e^(v - 1)`.
///
/// The unit shift is part of the output law, trained weights depend on it.
pub const SOFTMAX_BIAS: f64 = 1.0;

/// The value subtracted from every logit of a layer before exponentiating it.
///
/// Stays at `SOFTMAX_BIAS` while `n` terms of `e^(max - 1)` fit in an `f64`, and moves to
/// `max` otherwise, which leaves the normalized output unchanged.
///
/// # Arguments
/// * `max` - The largest logit of the layer.
/// * `n` - The amount of logits in the layer.
pub fn softmax_shift(max: f64, n: usize) -> f64 {
    let limit = f64::MAX.ln() - (n.max(1) as f64).ln();

    if max - SOFTMAX_BIAS < limit {
        SOFTMAX_BIAS
    } else {
        max
    }
}

/// The unnormalized softmax term `e^(v - shift)`.
pub fn softmax_term(v: f64, shift: f64) -> f64 {
    (v - shift).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderate_logits_keep_the_unit_shift() {
        assert_eq!(softmax_shift(0.3, 4), SOFTMAX_BIAS);
        assert_eq!(softmax_shift(-900., 4), SOFTMAX_BIAS);
        assert_eq!(softmax_shift(700., 10), SOFTMAX_BIAS);
    }

    #[test]
    fn overflowing_logits_shift_by_the_max() {
        assert_eq!(softmax_shift(800., 2), 800.);
        assert_eq!(softmax_shift(709., 100), 709.);

        let shift = softmax_shift(800., 2);
        assert_eq!(softmax_term(800., shift), 1.);
        assert_eq!(softmax_term(-400., shift), 0.);
    }

    #[test]
    fn terms_under_the_unit_shift_never_overflow() {
        for n in [1, 2, 10, 1000] {
            let mut max = 650.;
            while softmax_shift(max, n) == SOFTMAX_BIAS {
                max += 0.5;
            }

            let last_kept = max - 0.5;
            let total = n as f64 * softmax_term(last_kept, SOFTMAX_BIAS);
            assert!(total.is_finite(), "n = {n}");
        }
    }
}
