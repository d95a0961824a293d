pub mod config;
pub mod cpu;
pub mod pack_sequence;
pub mod shape;

use crate::{
    instruction::pack_sequence::{config::Direction, pack_sequence::PackSequence},
    tensor::{Tensor, TensorDesc},
    utils::error::SeqPackError,
};

/// Pack (`Forward`) or unpack (`Backward`) `values` according to `lengths`.
/// Returns a newly allocated host tensor; inputs are never modified.
pub fn pack_or_unpack(
    direction: Direction,
    values: &Tensor,
    lengths: &Tensor,
) -> Result<Tensor, SeqPackError> {
    PackSequence::with_direction(direction).run(values, lengths)
}

/// Ragged `[length_sum, *feature]` to zero-padded `[rows, cols, *feature]`.
pub fn pack(values: &Tensor, lengths: &Tensor) -> Result<Tensor, SeqPackError> {
    pack_or_unpack(Direction::Forward, values, lengths)
}

/// Padded `[rows, cols, *feature]` back to ragged `[length_sum, *feature]`.
pub fn unpack(values: &Tensor, lengths: &Tensor) -> Result<Tensor, SeqPackError> {
    pack_or_unpack(Direction::Backward, values, lengths)
}

pub fn infer_output_desc(
    direction: Direction,
    values: &TensorDesc,
    lengths: &Tensor,
) -> Result<TensorDesc, SeqPackError> {
    PackSequence::with_direction(direction).infer_output_desc(values, lengths)
}
