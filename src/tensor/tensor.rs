use bytemuck::{cast_slice, pod_read_unaligned};
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::{
    tensor::{data::TensorData, desc::TensorDesc, device::cpu::CpuData, element::Element},
    utils::error::SeqPackError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceId {
    CPU,
    Accelerator(usize),
}

pub struct Tensor {
    pub desc: TensorDesc,
    pub device: DeviceId,
    pub buffer: Box<dyn TensorData>,
}

impl Debug for Tensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Tensor(dims={:?}, type={:?}, device={:?})",
            self.desc.dims(),
            self.desc.data_type(),
            self.device
        )
    }
}

impl Tensor {
    /// Create a CPU-backed tensor from raw host bytes laid out as `desc` describes.
    pub fn new_cpu(desc: TensorDesc, host_data: Box<[u8]>) -> Result<Self, SeqPackError> {
        if host_data.len() != desc.size_in_bytes() {
            return Err(SeqPackError::InvalidArgument(format!(
                "host data is {} bytes but {:?} x {:?} needs {}",
                host_data.len(),
                desc.dims(),
                desc.data_type(),
                desc.size_in_bytes()
            )));
        }
        Ok(Self {
            desc,
            device: DeviceId::CPU,
            buffer: Box::new(CpuData::from_vec(host_data)),
        })
    }

    /// Create a CPU-backed tensor from typed row-major values.
    pub fn from_values<T: Element>(dims: Vec<usize>, values: &[T]) -> Result<Self, SeqPackError> {
        let desc = TensorDesc::new(dims, T::DATA_TYPE)?;
        if values.len() != desc.num_elements() {
            return Err(SeqPackError::InvalidArgument(format!(
                "{} values cannot fill shape {:?}",
                values.len(),
                desc.dims()
            )));
        }
        let bytes: &[u8] = cast_slice(values);
        Self::new_cpu(desc, bytes.into())
    }

    /// Wrap storage produced by a device backend.
    pub fn from_storage(
        desc: TensorDesc,
        device: DeviceId,
        buffer: Box<dyn TensorData>,
    ) -> Result<Self, SeqPackError> {
        let tensor = Self {
            desc,
            device,
            buffer,
        };
        tensor.check_storage()?;
        Ok(tensor)
    }

    /// Storage must hold exactly the bytes the descriptor describes.
    pub fn check_storage(&self) -> Result<(), SeqPackError> {
        if self.buffer.len_bytes() != self.desc.size_in_bytes() {
            return Err(SeqPackError::InvalidArgument(format!(
                "storage is {} bytes but {:?} x {:?} needs {}",
                self.buffer.len_bytes(),
                self.desc.dims(),
                self.desc.data_type(),
                self.desc.size_in_bytes()
            )));
        }
        Ok(())
    }

    pub fn is_cpu(&self) -> bool {
        matches!(self.device, DeviceId::CPU)
    }

    pub fn dims(&self) -> &[usize] {
        self.desc.dims()
    }

    pub fn bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Read the tensor back as typed values. Storage alignment is not assumed.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, SeqPackError> {
        if self.desc.data_type() != T::DATA_TYPE {
            return Err(SeqPackError::TypeMismatch {
                expected: T::DATA_TYPE,
                actual: self.desc.data_type(),
            });
        }
        Ok(self
            .bytes()
            .chunks_exact(std::mem::size_of::<T>())
            .map(pod_read_unaligned::<T>)
            .collect())
    }
}
