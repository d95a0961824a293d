use crate::{
    tensor::{Tensor, TensorDesc, device::Device, device::cpu::CpuDevice},
    utils::error::SeqPackError,
};
use std::fmt::Debug;

pub trait Instruction: Debug {
    // Operator name as registered by the surrounding framework
    fn name(&self) -> &'static str;

    // Output shapes and types for the given inputs, without running anything
    fn infer_output_descs(&self, inputs: &[&Tensor]) -> Result<Vec<TensorDesc>, SeqPackError>;

    // Run against the given device backend, returning freshly allocated outputs
    fn execute(&self, device: &dyn Device, inputs: &[&Tensor])
    -> Result<Vec<Tensor>, SeqPackError>;

    fn execute_cpu(&self, inputs: &[&Tensor]) -> Result<Vec<Tensor>, SeqPackError> {
        self.execute(&CpuDevice, inputs)
    }

    fn clone_box(&self) -> Box<dyn Instruction>;
}
