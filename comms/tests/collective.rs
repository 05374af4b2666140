use std::thread;

use comms::{Collective, CommErr, LocalComm, Solo};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn run_group<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(LocalComm) -> T + Sync,
{
    let f = &f;
    thread::scope(|s| {
        let handles: Vec<_> = LocalComm::group(size)
            .into_iter()
            .map(|comm| s.spawn(move || f(comm)))
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

#[test]
fn gather_then_broadcast_rebuilds_any_vector() {
    let mut rng = StdRng::seed_from_u64(7);

    for size in 1..=5 {
        let len = rng.random_range(0..40);
        let expected: Vec<f64> = (0..len).map(|_| rng.random_range(-1.0..1.0)).collect();
        let block = len / size;

        let bufs = run_group(size, |comm| {
            let rank = comm.rank();
            let mut buf = vec![0.; len];

            let own = rank * block..(rank + 1) * block;
            buf[own.clone()].copy_from_slice(&expected[own]);
            if rank == 0 {
                buf[size * block..].copy_from_slice(&expected[size * block..]);
            }

            comm.all_gather_rows(&mut buf, block).unwrap();
            comm.broadcast(&mut buf[size * block..], 0).unwrap();
            buf
        });

        assert!(bufs.iter().all(|buf| buf == &expected), "size {size}");
    }
}

#[test]
fn reduce_is_identical_on_every_worker() {
    let bufs = run_group(4, |comm| {
        let mut rng = StdRng::seed_from_u64(comm.rank() as u64);
        let mut buf: Vec<f64> = (0..16).map(|_| rng.random_range(-1e3..1e3)).collect();

        comm.all_reduce_sum(&mut buf).unwrap();
        buf
    });

    let first = &bufs[0];
    assert!(bufs.iter().all(|buf| buf == first));
}

#[test]
fn sequence_of_operations_stays_in_step() {
    let sums = run_group(3, |comm| {
        let mut total = 0.;
        for round in 0..50 {
            let mut value = [(comm.rank() + round) as f64];
            comm.all_reduce_sum(&mut value).unwrap();
            comm.barrier().unwrap();
            total += value[0];
        }

        total
    });

    // Each round sums to 3 * round + 3.
    let expected: f64 = (0..50).map(|round| (3 * round + 3) as f64).sum();
    assert!(sums.iter().all(|&s| s == expected));
}

#[test]
fn mismatched_lengths_are_reported() {
    let results = run_group(2, |comm| {
        let mut buf = vec![0.; 2 + comm.rank()];
        comm.all_reduce_sum(&mut buf)
    });

    assert!(results.iter().all(|r| matches!(r, Err(CommErr::LengthMismatch { .. }))));
}

#[test]
fn solo_is_a_group_of_one() {
    assert_eq!(Solo.rank(), 0);
    assert_eq!(Solo.size(), 1);
}
