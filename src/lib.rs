//! seqpack - ragged/padded conversion for variable-length sequence batches
//!
//! Packs concatenated sequences plus a lengths vector into a zero-padded
//! `[rows, cols, *feature]` grid, and unpacks such a grid back into its
//! ragged form. Works over `i32`, `i64`, `f32` and `f64` tensors against a
//! pluggable device backend.

mod instruction;

mod tensor;

mod utils;

pub use instruction::{
    instruction::Instruction,
    pack_rnn_sequence,
    pack_sequence::{
        config::{Direction, PackSequenceConfig},
        infer_output_desc, pack, pack_or_unpack,
        pack_sequence::{PackSequence, PackSequenceInstruction},
        shape::SequenceShape,
        unpack,
    },
    rnn_sequence, unpack_rnn_sequence,
};
pub use tensor::{
    DataType, DeviceId, Element, Tensor, TensorData, TensorDesc,
    device::{Device, cpu::CpuData, cpu::CpuDevice},
};
pub use utils::error::SeqPackError;
