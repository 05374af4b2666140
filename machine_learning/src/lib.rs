pub mod arch;
pub mod backend;
pub mod engine;
pub mod error;
pub mod initialization;
pub mod shard;
pub mod training;

pub use error::{MlErr, Result};
