pub mod activations;
mod law;
mod layer;
pub mod loss;
mod network;

pub use law::OutputLaw;
pub use layer::Layer;
pub use network::{Network, Shape};
