/// The sum of squared errors, `E = 0.5 * Σ (t - o)²`.
pub struct SquaredError;

impl SquaredError {
    pub const SCALE: f64 = 0.5;

    pub fn term(target: f64, output: f64) -> f64 {
        (target - output) * (target - output)
    }
}
