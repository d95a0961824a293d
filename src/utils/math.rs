/// Longest sequence in a lengths vector, or 0 when there are no sequences.
pub fn max_length(lengths: &[usize]) -> usize {
    lengths.iter().copied().max().unwrap_or(0)
}

/// Total number of valid positions across all sequences.
pub fn length_sum(lengths: &[usize]) -> usize {
    lengths.iter().sum()
}

/// Exclusive prefix sums: entry `c` is where sequence `c` starts in the packed layout.
pub fn sequence_offsets(lengths: &[usize]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(lengths.len());
    let mut offset = 0usize;
    for &len in lengths {
        offsets.push(offset);
        offset += len;
    }
    offsets
}
