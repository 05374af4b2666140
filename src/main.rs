use std::env;

use anyhow::{Context, bail};
use log::info;

use hpnn::config::RunConfig;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "hpnn".to_string());
    let Some(path) = args.next() else {
        bail!("usage: {program} <config.json>");
    };

    let config =
        RunConfig::from_path(&path).with_context(|| format!("failed to load config {path}"))?;
    let samples = config.samples.len();

    let report = hpnn::train(config).context("training failed")?;
    info!("trained {} parameters", report.network.param_count());

    for (i, outcome) in report.outcomes.iter().enumerate() {
        println!(
            "sample {i}: error {:.6e} after {} iteration(s), {}",
            outcome.error,
            outcome.iterations,
            if outcome.matched { "matched" } else { "not matched" }
        );
    }
    println!("{}/{samples} sample(s) matched", report.matched());

    Ok(())
}
