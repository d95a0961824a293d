use crate::utils::error::SeqPackError;

/// Which way the sequences move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Ragged `[length_sum, *feature]` to padded `[rows, cols, *feature]`.
    Forward,
    /// Padded `[rows, cols, *feature]` back to ragged `[length_sum, *feature]`.
    Backward,
}

impl Direction {
    /// Axis at which the feature block starts in the values tensor.
    pub fn offset_dim(&self) -> usize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackSequenceConfig {
    pub direction: Direction,
    pub num_threads: usize,
    pub min_blocks_per_thread: usize,
}

impl PackSequenceConfig {
    pub fn build(self) -> Result<Self, SeqPackError> {
        if self.num_threads == 0 {
            return Err(SeqPackError::invalid("num_threads must be at least 1"));
        }

        if self.min_blocks_per_thread == 0 {
            return Err(SeqPackError::invalid(
                "min_blocks_per_thread must be at least 1",
            ));
        }

        Ok(self)
    }

    /// Worker count for a copy of `total_blocks` feature blocks.
    pub fn threads_for(&self, total_blocks: usize) -> usize {
        let by_work = total_blocks / self.min_blocks_per_thread;
        self.num_threads.min(by_work).max(1)
    }
}

impl Default for PackSequenceConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Forward,
            num_threads: 1,
            min_blocks_per_thread: 4096,
        }
    }
}
