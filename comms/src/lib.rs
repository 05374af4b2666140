mod collective;
mod error;
mod local;
mod solo;

pub use collective::Collective;
pub use error::{CommErr, Result};
pub use local::LocalComm;
pub use solo::Solo;
