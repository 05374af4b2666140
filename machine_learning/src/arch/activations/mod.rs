mod bipolar;
mod softmax;

pub use bipolar::{act, activate, dact};
pub use softmax::{SOFTMAX_BIAS, softmax_shift, softmax_term};
