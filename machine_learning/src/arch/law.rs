use super::{
    activations::dact,
    loss::{CrossEntropy, SquaredError},
};

/// The behavior of a network's output layer: its activation, its loss and the error signal
/// it feeds back, plus the predicate telling when a sample is classified right.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputLaw {
    /// Bounded nonlinearity on the output, sum of squared errors.
    #[default]
    SquaredError,
    /// Softmax on the output, cross entropy.
    Softmax,
}

impl OutputLaw {
    /// The contribution of one output row to the loss, before scaling.
    pub fn loss_term(self, target: f64, output: f64) -> f64 {
        match self {
            OutputLaw::SquaredError => SquaredError::term(target, output),
            OutputLaw::Softmax => CrossEntropy::term(target, output),
        }
    }

    /// The factor applied to the sum of every `loss_term`.
    pub fn loss_scale(self) -> f64 {
        match self {
            OutputLaw::SquaredError => SquaredError::SCALE,
            OutputLaw::Softmax => CrossEntropy::SCALE,
        }
    }

    /// The error signal of one output neuron.
    pub fn output_delta(self, target: f64, output: f64) -> f64 {
        match self {
            OutputLaw::SquaredError => (target - output) * dact(output),
            OutputLaw::Softmax => target - output,
        }
    }

    /// Whether `output` classifies the sample the way `target` says.
    ///
    /// # Arguments
    /// * `output` - The network's output activation.
    /// * `target` - The expected output, of the same length.
    pub fn matches<'a, I>(self, output: I, target: &[f64]) -> bool
    where
        I: IntoIterator<Item = &'a f64>,
    {
        match self {
            OutputLaw::SquaredError => argmax_matches(output, target),
            OutputLaw::Softmax => margin_matches(output, target),
        }
    }
}

/// The strongest output must sit where the one-hot target holds `1.0`.
///
/// Outputs never exceeding `-1.0` point at index zero, as does a target without a `1.0`.
fn argmax_matches<'a, I>(output: I, target: &[f64]) -> bool
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut best = -1.0;
    let mut max_p = 0;

    for (i, &o) in output.into_iter().enumerate() {
        if best < o {
            best = o;
            max_p = i;
        }
    }

    let p_trg = target.iter().rposition(|&t| t == 1.0).unwrap_or(0);
    max_p == p_trg
}

/// Every output read as `1` above `0.1`, `-1` below `-0.1`, must equal its target.
///
/// An output inside the margin never matches.
fn margin_matches<'a, I>(output: I, target: &[f64]) -> bool
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut ok = true;

    for (&o, &t) in output.into_iter().zip(target) {
        let read = if o > 0.1 {
            1.0
        } else if o < -0.1 {
            -1.0
        } else {
            ok = false;
            0.0
        };

        if t != read {
            ok = false;
        }
    }

    ok
}
