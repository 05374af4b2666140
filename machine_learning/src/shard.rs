use std::ops::Range;

/// How the rows of a layer are split among cooperating workers.
///
/// Owner `r` computes rows `[r * quotient, (r + 1) * quotient)`. The rows left over by the
/// integer division, `[owners * quotient, rows)`, are all computed by `REMAINDER_OWNER`
/// instead of being split any further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardPlan {
    rows: usize,
    owners: usize,
    quotient: usize,
    remainder: usize,
}

impl ShardPlan {
    /// The worker computing the remainder rows.
    pub const REMAINDER_OWNER: usize = 0;

    /// Creates a new `ShardPlan`.
    ///
    /// # Arguments
    /// * `rows` - The amount of rows to split.
    /// * `owners` - The amount of workers sharing them, zero is taken as one.
    pub fn new(rows: usize, owners: usize) -> Self {
        let owners = owners.max(1);

        Self {
            rows,
            owners,
            quotient: rows / owners,
            remainder: rows % owners,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn owners(&self) -> usize {
        self.owners
    }

    /// The amount of rows every owner gets.
    pub fn quotient(&self) -> usize {
        self.quotient
    }

    /// The rows owned by `rank`.
    pub fn owned(&self, rank: usize) -> Range<usize> {
        rank * self.quotient..(rank + 1) * self.quotient
    }

    /// The rows left over by the even split, possibly empty.
    pub fn remainder(&self) -> Range<usize> {
        self.owners * self.quotient..self.rows
    }

    pub fn has_remainder(&self) -> bool {
        self.remainder > 0
    }

    /// Whether `rank` has remainder rows to compute.
    pub fn owns_remainder(&self, rank: usize) -> bool {
        self.has_remainder() && rank == Self::REMAINDER_OWNER
    }
}
