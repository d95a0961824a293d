/// Minimal storage trait for tensor bytes, implemented per memory space.
pub trait TensorData: Send + Sync {
    /// Length in bytes of the underlying storage.
    fn len_bytes(&self) -> usize;

    fn as_slice(&self) -> &[u8];

    fn as_mut_slice(&mut self) -> &mut [u8];
}
