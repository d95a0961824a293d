use crate::{tensor::DataType, utils::error::SeqPackError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorDesc {
    dims: Vec<usize>,
    data_type: DataType,
}

impl TensorDesc {
    /// Dims may contain zeros (empty batches), but a descriptor always has at least one axis.
    ///
    /// The byte size of every non-zero extent must fit in `usize`, so any
    /// trailing product taken later cannot overflow even when a zero axis
    /// keeps the element count at 0.
    pub fn new(dims: Vec<usize>, data_type: DataType) -> Result<Self, SeqPackError> {
        if dims.is_empty() {
            return Err(SeqPackError::invalid("Tensor dimensions cannot be empty"));
        }

        let extent = dims
            .iter()
            .filter(|&&d| d != 0)
            .try_fold(data_type.size_in_bytes(), |acc, &d| acc.checked_mul(d));
        if extent.is_none() {
            return Err(SeqPackError::InvalidArgument(format!(
                "shape {:?} of {:?} overflows the addressable size",
                dims, data_type
            )));
        }

        Ok(Self { dims, data_type })
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    // Size in bytes for the tensor given its DataType
    pub fn size_in_bytes(&self) -> usize {
        self.num_elements() * self.data_type.size_in_bytes()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Number of elements spanned by the axes from `dim` onwards.
    /// Returns 1 when `dim == ndim`.
    pub fn size_from_dim(&self, dim: usize) -> usize {
        self.dims[dim.min(self.dims.len())..].iter().product()
    }
}
