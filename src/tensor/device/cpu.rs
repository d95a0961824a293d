use crate::tensor::{data::TensorData, device::Device, tensor::DeviceId};

/// Simple CPU buffer: owns a boxed byte slice, no locks.
pub struct CpuData {
    pub data: Box<[u8]>,
}

impl CpuData {
    pub fn from_vec(v: Box<[u8]>) -> Self {
        Self { data: v }
    }
}

impl TensorData for CpuData {
    fn len_bytes(&self) -> usize {
        self.data.len()
    }

    fn as_slice(&self) -> &[u8] {
        &self.data
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Host memory backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuDevice;

impl Device for CpuDevice {
    fn id(&self) -> DeviceId {
        DeviceId::CPU
    }

    fn allocate(&self, len_bytes: usize) -> Box<dyn TensorData> {
        Box::new(CpuData::from_vec(vec![0u8; len_bytes].into_boxed_slice()))
    }

    fn fill(&self, dst: &mut [u8], pattern: &[u8]) {
        if pattern.iter().all(|&b| b == 0) {
            dst.fill(0);
            return;
        }
        for chunk in dst.chunks_exact_mut(pattern.len()) {
            chunk.copy_from_slice(pattern);
        }
    }

    fn copy_items(&self, src: &[u8], dst: &mut [u8]) {
        dst.copy_from_slice(src);
    }
}
