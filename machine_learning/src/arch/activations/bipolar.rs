use ndarray::ArrayViewMut1;

/// The bounded nonlinearity `2 / (1 + e^-x) - 1`, its values lie in `(-1, 1)`.
pub fn act(x: f64) -> f64 {
    2.0 / (1.0 + (-x).exp()) - 1.0
}

/// The derivative of `act` expressed through its output `y = act(x)`.
pub fn dact(y: f64) -> f64 {
    -0.5 * (y * y - 1.0)
}

/// Applies `act` in place over every entry of `v`.
pub fn activate(mut v: ArrayViewMut1<f64>) {
    v.par_mapv_inplace(act);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn act_is_odd_and_bounded() {
        assert_eq!(act(0.), 0.);
        for x in [0.1, 1., 5., 40.] {
            assert!((act(x) + act(-x)).abs() < 1e-15);
            assert!(act(x) > 0. && act(x) <= 1.);
        }
    }

    #[test]
    fn dact_matches_finite_differences() {
        const H: f64 = 1e-6;

        for x in [-2., -0.3, 0., 0.7, 1.5] {
            let numeric = (act(x + H) - act(x - H)) / (2. * H);
            assert!((dact(act(x)) - numeric).abs() < 1e-8, "x = {x}");
        }
    }
}
