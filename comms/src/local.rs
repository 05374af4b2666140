use std::sync::Arc;

use log::debug;
use parking_lot::{Condvar, Mutex};

use crate::{
    Collective, CommErr, Result,
    collective::{check_gather, check_root},
};

struct Phase {
    arrived: usize,
    generation: u64,
    broken: bool,
}

/// A reusable barrier that releases its waiters with an error once a party leaves the group.
struct Phaser {
    parties: usize,
    state: Mutex<Phase>,
    cvar: Condvar,
}

impl Phaser {
    fn new(parties: usize) -> Self {
        Self {
            parties,
            state: Mutex::new(Phase {
                arrived: 0,
                generation: 0,
                broken: false,
            }),
            cvar: Condvar::new(),
        }
    }

    fn wait(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.broken {
            return Err(CommErr::Disconnected);
        }

        let generation = state.generation;
        state.arrived += 1;

        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation += 1;
            self.cvar.notify_all();
            return Ok(());
        }

        // A release wins over a later disconnection, the waiter already made it through.
        while state.generation == generation {
            if state.broken {
                return Err(CommErr::Disconnected);
            }

            self.cvar.wait(&mut state);
        }

        Ok(())
    }

    fn abandon(&self) {
        self.state.lock().broken = true;
        self.cvar.notify_all();
    }
}

struct Shared {
    size: usize,
    phaser: Phaser,
    slots: Mutex<Vec<Vec<f64>>>,
}

/// A worker's handle into a group of threads living in the same process.
///
/// Contributions are staged in one slot per worker and every operation is framed by two
/// phases: one after all contributions are written and one after all of them were read.
pub struct LocalComm {
    rank: usize,
    shared: Arc<Shared>,
}

impl LocalComm {
    /// Creates a new group of connected handles.
    ///
    /// # Arguments
    /// * `size` - The amount of workers in the group, zero is taken as one.
    ///
    /// # Returns
    /// One handle per worker, ordered by rank.
    pub fn group(size: usize) -> Vec<Self> {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            size,
            phaser: Phaser::new(size),
            slots: Mutex::new(vec![Vec::new(); size]),
        });

        debug!("created an in-process group of {size} workers");

        (0..size)
            .map(|rank| Self {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    fn exchange<T, F>(&self, contribution: Option<Vec<f64>>, read: F) -> Result<T>
    where
        F: FnOnce(&[Vec<f64>]) -> Result<T>,
    {
        if let Some(contribution) = contribution {
            self.shared.slots.lock()[self.rank] = contribution;
        }

        self.shared.phaser.wait()?;
        let out = read(&self.shared.slots.lock());
        self.shared.phaser.wait()?;
        out
    }
}

fn check_len(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(CommErr::LengthMismatch { expected, got });
    }

    Ok(())
}

impl Collective for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn broadcast(&self, buf: &mut [f64], root: usize) -> Result<()> {
        check_root(root, self.shared.size)?;

        let contribution = (self.rank == root).then(|| buf.to_vec());
        self.exchange(contribution, |slots| {
            if self.rank != root {
                let src = &slots[root];
                check_len(buf.len(), src.len())?;
                buf.copy_from_slice(src);
            }

            Ok(())
        })
    }

    fn all_gather_rows(&self, buf: &mut [f64], block: usize) -> Result<()> {
        let size = self.shared.size;
        check_gather(buf.len(), block, size)?;

        let own = self.rank * block..(self.rank + 1) * block;
        let contribution = Some(buf[own].to_vec());

        self.exchange(contribution, |slots| {
            for (rank, slot) in slots.iter().enumerate() {
                check_len(block, slot.len())?;
                if rank != self.rank {
                    buf[rank * block..(rank + 1) * block].copy_from_slice(slot);
                }
            }

            Ok(())
        })
    }

    fn all_reduce_sum(&self, buf: &mut [f64]) -> Result<()> {
        let contribution = Some(buf.to_vec());

        self.exchange(contribution, |slots| {
            let mut total = vec![0.; buf.len()];
            for slot in slots {
                check_len(buf.len(), slot.len())?;
                total.iter_mut().zip(slot).for_each(|(acc, v)| *acc += v);
            }

            buf.copy_from_slice(&total);
            Ok(())
        })
    }

    fn barrier(&self) -> Result<()> {
        self.shared.phaser.wait()
    }
}

impl Drop for LocalComm {
    fn drop(&mut self) {
        self.shared.phaser.abandon();
    }
}
