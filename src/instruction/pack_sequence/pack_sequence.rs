use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::{
    instruction::{
        instruction::Instruction,
        pack_sequence::{
            config::{Direction, PackSequenceConfig},
            cpu,
            shape::SequenceShape,
        },
    },
    tensor::{
        DataType, Element, Tensor, TensorDesc,
        device::{Device, cpu::CpuDevice},
    },
    utils::error::SeqPackError,
};

/// Converts between ragged and padded sequence batches in one direction.
#[derive(Clone, PartialEq, Eq)]
pub struct PackSequence {
    config: PackSequenceConfig,
}

impl Debug for PackSequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{}(direction={:?}, threads={})",
            self.name(),
            self.config.direction,
            self.config.num_threads
        )
    }
}

impl PackSequence {
    pub fn new(config: PackSequenceConfig) -> Result<Self, SeqPackError> {
        Ok(Self {
            config: config.build()?,
        })
    }

    /// Default tuning for `direction`.
    pub fn with_direction(direction: Direction) -> Self {
        Self {
            config: PackSequenceConfig {
                direction,
                ..Default::default()
            },
        }
    }

    pub fn direction(&self) -> Direction {
        self.config.direction
    }

    pub fn config(&self) -> &PackSequenceConfig {
        &self.config
    }

    pub fn name(&self) -> &'static str {
        match self.config.direction {
            Direction::Forward => "PackRNNSequence",
            Direction::Backward => "UnpackRNNSequence",
        }
    }

    /// Output descriptor for the given inputs, without allocating or copying.
    pub fn infer_output_desc(
        &self,
        values: &TensorDesc,
        lengths: &Tensor,
    ) -> Result<TensorDesc, SeqPackError> {
        let data_type = supported(values.data_type())?;
        SequenceShape::infer(self.config.direction, values, lengths)?.output_desc(data_type)
    }

    /// Run on host memory.
    pub fn run(&self, values: &Tensor, lengths: &Tensor) -> Result<Tensor, SeqPackError> {
        self.run_on(&CpuDevice, values, lengths)
    }

    /// Run against an injected device backend. The element type is resolved
    /// here, once, before entering the typed kernel.
    pub fn run_on<D: Device + ?Sized>(
        &self,
        device: &D,
        values: &Tensor,
        lengths: &Tensor,
    ) -> Result<Tensor, SeqPackError> {
        match values.desc.data_type() {
            DataType::Int32 => self.run_typed::<i32, D>(device, values, lengths),
            DataType::Int64 => self.run_typed::<i64, D>(device, values, lengths),
            DataType::Float => self.run_typed::<f32, D>(device, values, lengths),
            DataType::Double => self.run_typed::<f64, D>(device, values, lengths),
            other => Err(SeqPackError::UnsupportedType(other)),
        }
    }

    fn run_typed<T: Element, D: Device + ?Sized>(
        &self,
        device: &D,
        values: &Tensor,
        lengths: &Tensor,
    ) -> Result<Tensor, SeqPackError> {
        // all validation happens here, before the output exists
        values.check_storage()?;
        let shape = SequenceShape::infer(self.config.direction, &values.desc, lengths)?;
        let desc = shape.output_desc(T::DATA_TYPE)?;

        let mut buffer = device.allocate(desc.size_in_bytes());
        if buffer.len_bytes() != desc.size_in_bytes() {
            return Err(SeqPackError::InvalidArgument(format!(
                "device {:?} allocated {} bytes, {} requested",
                device.id(),
                buffer.len_bytes(),
                desc.size_in_bytes()
            )));
        }

        let threads = self.config.threads_for(shape.length_sum);
        cpu::typed_cpu::<T, D>(
            device,
            &shape,
            threads,
            values.bytes(),
            buffer.as_mut_slice(),
        );

        Tensor::from_storage(desc, device.id(), buffer)
    }
}

fn supported(data_type: DataType) -> Result<DataType, SeqPackError> {
    match data_type {
        DataType::Int32 | DataType::Int64 | DataType::Float | DataType::Double => Ok(data_type),
        other => Err(SeqPackError::UnsupportedType(other)),
    }
}

/// Operator form: inputs are `[values, lengths]`, one output.
#[derive(Clone)]
pub struct PackSequenceInstruction {
    pub op: PackSequence,
}

impl Debug for PackSequenceInstruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.op, f)
    }
}

impl PackSequenceInstruction {
    fn inputs<'a>(&self, inputs: &[&'a Tensor]) -> Result<(&'a Tensor, &'a Tensor), SeqPackError> {
        match inputs {
            &[values, lengths] => Ok((values, lengths)),
            _ => Err(SeqPackError::InvalidArgument(format!(
                "{} takes [values, lengths], got {} inputs",
                self.op.name(),
                inputs.len()
            ))),
        }
    }
}

impl Instruction for PackSequenceInstruction {
    fn name(&self) -> &'static str {
        self.op.name()
    }

    fn infer_output_descs(&self, inputs: &[&Tensor]) -> Result<Vec<TensorDesc>, SeqPackError> {
        let (values, lengths) = self.inputs(inputs)?;
        Ok(vec![self.op.infer_output_desc(&values.desc, lengths)?])
    }

    fn execute(
        &self,
        device: &dyn Device,
        inputs: &[&Tensor],
    ) -> Result<Vec<Tensor>, SeqPackError> {
        let (values, lengths) = self.inputs(inputs)?;
        Ok(vec![self.op.run_on(device, values, lengths)?])
    }

    fn clone_box(&self) -> Box<dyn Instruction> {
        Box::new(self.clone())
    }
}
