use crate::{
    instruction::{
        instruction::Instruction,
        pack_sequence::{
            config::{Direction, PackSequenceConfig},
            pack_sequence::{PackSequence, PackSequenceInstruction},
        },
    },
    utils::error::SeqPackError,
};

pub mod instruction;
pub mod pack_sequence;

pub fn pack_rnn_sequence() -> Box<dyn Instruction> {
    Box::new(PackSequenceInstruction {
        op: PackSequence::with_direction(Direction::Forward),
    })
}

pub fn unpack_rnn_sequence() -> Box<dyn Instruction> {
    Box::new(PackSequenceInstruction {
        op: PackSequence::with_direction(Direction::Backward),
    })
}

pub fn rnn_sequence(
    config: PackSequenceConfig,
) -> Result<Box<dyn Instruction>, SeqPackError> {
    Ok(Box::new(PackSequenceInstruction {
        op: PackSequence::new(config)?,
    }))
}
