use bytemuck::bytes_of;
use std::thread;
use tracing::trace;

use crate::{
    instruction::pack_sequence::{config::Direction, shape::SequenceShape},
    tensor::{Element, device::Device},
    utils::math,
};

/// Zero `dst`, then move every valid feature block of `src` into place.
///
/// `src` holds the values tensor and `dst` the freshly allocated output, both
/// as raw bytes of element type `T`. With `threads > 1` the output is split
/// into disjoint regions and each worker fills and copies its own region.
pub fn typed_cpu<T: Element, D: Device + ?Sized>(
    device: &D,
    shape: &SequenceShape,
    threads: usize,
    src: &[u8],
    dst: &mut [u8],
) {
    let block_bytes = shape.block_size * std::mem::size_of::<T>();
    let zero = T::zeroed();
    let pattern = bytes_of(&zero);

    if threads <= 1 || dst.is_empty() {
        device.fill(dst, pattern);
        copy_blocks(device, shape, block_bytes, src, dst);
        return;
    }

    match shape.direction {
        Direction::Forward => pack_rows(device, shape, block_bytes, threads, pattern, src, dst),
        Direction::Backward => {
            unpack_sequences(device, shape, block_bytes, threads, pattern, src, dst)
        }
    }
}

fn block(buf: &[u8], pos: usize, block_bytes: usize) -> &[u8] {
    &buf[pos * block_bytes..(pos + 1) * block_bytes]
}

fn block_mut(buf: &mut [u8], pos: usize, block_bytes: usize) -> &mut [u8] {
    &mut buf[pos * block_bytes..(pos + 1) * block_bytes]
}

fn copy_blocks<D: Device + ?Sized>(
    device: &D,
    shape: &SequenceShape,
    block_bytes: usize,
    src: &[u8],
    dst: &mut [u8],
) {
    let cols = shape.cols;
    let mut offset = 0usize;
    for (c, &len) in shape.lengths.iter().enumerate() {
        for r in 0..len {
            let (src_pos, dst_pos) = match shape.direction {
                Direction::Forward => (offset + r, r * cols + c),
                Direction::Backward => (r * cols + c, offset + r),
            };
            device.copy_items(
                block(src, src_pos, block_bytes),
                block_mut(dst, dst_pos, block_bytes),
            );
        }
        offset += len;
    }
}

// Padded output rows are contiguous, so workers take whole row ranges.
fn pack_rows<D: Device + ?Sized>(
    device: &D,
    shape: &SequenceShape,
    block_bytes: usize,
    threads: usize,
    pattern: &[u8],
    src: &[u8],
    dst: &mut [u8],
) {
    let offsets = math::sequence_offsets(&shape.lengths);
    let row_bytes = shape.cols * block_bytes;
    let rows_per_thread = shape.rows.div_ceil(threads);
    trace!(threads, rows_per_thread, "packing rows in parallel");

    thread::scope(|s| {
        for (chunk_idx, chunk) in dst.chunks_mut(rows_per_thread * row_bytes).enumerate() {
            let offsets = &offsets;
            s.spawn(move || {
                device.fill(chunk, pattern);
                let first_row = chunk_idx * rows_per_thread;
                for (i, row) in chunk.chunks_exact_mut(row_bytes).enumerate() {
                    let r = first_row + i;
                    for (c, (&len, &offset)) in shape.lengths.iter().zip(offsets).enumerate() {
                        if r < len {
                            device.copy_items(
                                block(src, offset + r, block_bytes),
                                block_mut(row, c, block_bytes),
                            );
                        }
                    }
                }
            });
        }
    });
}

// Each sequence lands in one contiguous ragged run, so workers take whole
// groups of consecutive sequences, balanced by position count.
fn unpack_sequences<D: Device + ?Sized>(
    device: &D,
    shape: &SequenceShape,
    block_bytes: usize,
    threads: usize,
    pattern: &[u8],
    src: &[u8],
    dst: &mut [u8],
) {
    let lengths = &shape.lengths;
    let cols = shape.cols;
    let per_thread = shape.length_sum.div_ceil(threads);

    let mut groups: Vec<(usize, usize)> = Vec::with_capacity(threads);
    let mut start = 0usize;
    let mut acc = 0usize;
    for (c, &len) in lengths.iter().enumerate() {
        acc += len;
        if acc >= per_thread {
            groups.push((start, c + 1));
            start = c + 1;
            acc = 0;
        }
    }
    if start < cols {
        groups.push((start, cols));
    }
    trace!(threads, groups = groups.len(), "unpacking sequences in parallel");

    thread::scope(|s| {
        let mut rest: &mut [u8] = dst;
        for &(first, last) in &groups {
            let positions: usize = lengths[first..last].iter().sum();
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(positions * block_bytes);
            rest = tail;
            s.spawn(move || {
                device.fill(chunk, pattern);
                let mut local = 0usize;
                for c in first..last {
                    for r in 0..lengths[c] {
                        device.copy_items(
                            block(src, r * cols + c, block_bytes),
                            block_mut(chunk, local + r, block_bytes),
                        );
                    }
                    local += lengths[c];
                }
            });
        }
    });
}
