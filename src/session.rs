use std::thread;

use comms::{Collective, LocalComm, Solo};
use log::{debug, info, warn};
use machine_learning::{
    MlErr,
    arch::Network,
    engine::CpuEngine,
    training::{TrainOutcome, Trainer},
};

use crate::{config::RunPlan, error::SessionErr};

/// What the first worker saw once every sample was trained on.
#[derive(Debug, Clone)]
pub struct Report {
    /// One outcome per sample, in the order they were trained.
    pub outcomes: Vec<TrainOutcome>,
    /// The trained network.
    pub network: Network,
}

impl Report {
    /// The amount of samples classified right when their training stopped.
    pub fn matched(&self) -> usize {
        self.outcomes.iter().filter(|o| o.matched).count()
    }
}

/// Runs a whole training session, spawning one thread per worker.
///
/// Every worker owns a replica of the network and trains on every sample in lockstep with the
/// rest. The report is the one built by the first worker.
///
/// # Errors
/// The first failure among the workers. A worker that only saw a peer go away is reported only
/// when nothing else failed.
pub fn run(plan: &RunPlan) -> Result<Report, SessionErr> {
    if let Some(threads) = plan.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .build_global()
    {
        warn!("keeping the existing thread pool: {e}");
    }

    let workers = plan.workers.get();
    info!(
        "training {} sample(s) on {workers} worker(s) with {:?} backend",
        plan.samples.len(),
        plan.backend
    );

    if workers == 1 {
        return run_worker(Solo, plan);
    }

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = LocalComm::group(workers)
            .into_iter()
            .map(|comm| s.spawn(move || run_worker(comm, plan)))
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(rank, handle)| {
                handle
                    .join()
                    .unwrap_or(Err(SessionErr::WorkerPanicked { rank }))
            })
            .collect()
    });

    first_report(results)
}

/// Picks the outcome of a session out of every worker's result, in rank order.
///
/// A real failure wins over a worker that only saw a peer go away. With no failures the first
/// worker's report is returned.
fn first_report(results: Vec<Result<Report, SessionErr>>) -> Result<Report, SessionErr> {
    let mut reports = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => errors.push(e),
        }
    }

    if let Some(i) = errors.iter().position(|e| !e.is_disconnect()) {
        return Err(errors.swap_remove(i));
    }

    if let Some(e) = errors.pop() {
        return Err(e);
    }

    reports.into_iter().next().ok_or(SessionErr::MissingReport)
}

/// Builds, synchronizes and trains a single worker's replica.
fn run_worker<C: Collective>(comm: C, plan: &RunPlan) -> Result<Report, SessionErr> {
    let rank = comm.rank();

    let mut network = if rank == 0 {
        Network::random(&plan.shape, plan.law, plan.seed)?
    } else {
        Network::new(&plan.shape, plan.law)?
    };

    let engine = CpuEngine::new(comm, plan.backend).with_learning_rate(plan.learning_rate);
    engine.broadcast_weights(&mut network)?;

    let trainer =
        Trainer::new(engine, plan.mode, plan.threshold).with_max_iterations(plan.max_iterations);
    if rank == 0 {
        debug!("training with {:?} updates", trainer.mode());
    }

    let mut outcomes = Vec::with_capacity(plan.samples.len());
    for (i, sample) in plan.samples.iter().enumerate() {
        let outcome = trainer.train_sample(&mut network, &sample.input, &sample.target)?;

        if rank == 0 {
            info!(
                "sample {i}: init={:.10} {} N_ITER={} {}",
                outcome.initial_error,
                if outcome.first_matched { "OK" } else { "NO" },
                outcome.iterations,
                if outcome.matched { "SUCCESS" } else { "FAIL" }
            );
        }

        outcomes.push(outcome);
    }

    trainer.engine().comm().barrier().map_err(MlErr::from)?;

    Ok(Report { outcomes, network })
}
