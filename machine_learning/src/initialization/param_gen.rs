/// A source of initial weights, drawn in chunks.
pub trait ParamGen {
    /// Draws up to `n` values.
    ///
    /// A generator with fewer than `n` values left hands out what it has, an exhausted one
    /// returns `None`.
    fn sample(&mut self, n: usize) -> Option<Vec<f64>>;
}
