pub mod cpu;

use crate::tensor::{data::TensorData, tensor::DeviceId};

/// Memory-space backend the sequence kernels run against.
///
/// The kernels only ever need three primitives: allocate a buffer, fill it
/// with a repeated element pattern, and copy one contiguous run of bytes.
pub trait Device: Send + Sync {
    fn id(&self) -> DeviceId;

    /// Allocate `len_bytes` of storage. Contents are unspecified until filled.
    fn allocate(&self, len_bytes: usize) -> Box<dyn TensorData>;

    /// Repeat `pattern` (one element's bytes) across `dst`.
    /// `dst.len()` must be a multiple of `pattern.len()`.
    fn fill(&self, dst: &mut [u8], pattern: &[u8]);

    /// Copy a contiguous run of items. `src` and `dst` have equal lengths.
    fn copy_items(&self, src: &[u8], dst: &mut [u8]);
}
