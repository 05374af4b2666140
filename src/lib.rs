pub mod config;
pub mod error;
pub mod session;

use log::info;

use config::{Adapter, RunConfig};

pub use error::SessionErr;
pub use session::Report;

/// Validates a config and trains on every sample in it.
///
/// # Errors
/// Returns a `SessionErr` if the config is invalid or any worker fails.
pub fn train(config: RunConfig) -> Result<Report, SessionErr> {
    info!("adapting config");
    let plan = Adapter::new().adapt(config)?;
    info!("network {:?}, seed {}, {:?} updates", plan.shape, plan.seed, plan.mode);
    session::run(&plan)
}
