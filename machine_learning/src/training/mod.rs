mod trainer;

pub use trainer::{Mode, MAX_ITERATIONS, TrainOutcome, Trainer};
