use tracing::debug;

use crate::{
    instruction::pack_sequence::config::Direction,
    tensor::{DataType, Tensor, TensorDesc},
    utils::{error::SeqPackError, math},
};

/// Everything the copy stage needs to know, derived from the inputs before
/// any output is allocated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceShape {
    pub direction: Direction,
    pub lengths: Vec<usize>,
    pub rows: usize,
    pub cols: usize,
    pub length_sum: usize,
    /// Elements per feature block.
    pub block_size: usize,
    pub feature_dims: Vec<usize>,
}

impl SequenceShape {
    pub fn infer(
        direction: Direction,
        values: &TensorDesc,
        lengths: &Tensor,
    ) -> Result<Self, SeqPackError> {
        let dim_offset = direction.offset_dim();
        if values.ndim() <= dim_offset {
            return Err(SeqPackError::InvalidArgument(format!(
                "{:?} needs values with more than {} axes, got shape {:?}",
                direction,
                dim_offset,
                values.dims()
            )));
        }

        let lengths = read_lengths(lengths)?;
        let cols = lengths.len();
        // empty lengths is a supported batch of zero sequences
        let rows = math::max_length(&lengths);
        let length_sum = math::length_sum(&lengths);

        let dims = values.dims();
        match direction {
            Direction::Forward => {
                if dims[0] < length_sum {
                    return Err(SeqPackError::InvalidArgument(format!(
                        "lengths sum to {} but values only hold {} positions",
                        length_sum, dims[0]
                    )));
                }
            }
            Direction::Backward => {
                if dims[1] != cols {
                    return Err(SeqPackError::InvalidArgument(format!(
                        "padded values have {} columns but there are {} lengths",
                        dims[1], cols
                    )));
                }
                if dims[0] < rows {
                    return Err(SeqPackError::InvalidArgument(format!(
                        "longest sequence is {} but padded values only have {} rows",
                        rows, dims[0]
                    )));
                }
            }
        }

        let shape = Self {
            direction,
            rows,
            cols,
            length_sum,
            block_size: values.size_from_dim(dim_offset),
            feature_dims: dims[dim_offset..].to_vec(),
            lengths,
        };

        debug!(
            direction = ?shape.direction,
            rows = shape.rows,
            cols = shape.cols,
            length_sum = shape.length_sum,
            block_size = shape.block_size,
            "inferred sequence shape"
        );

        Ok(shape)
    }

    pub fn output_dims(&self) -> Vec<usize> {
        let mut dims = match self.direction {
            Direction::Forward => vec![self.rows, self.cols],
            Direction::Backward => vec![self.length_sum],
        };
        dims.extend_from_slice(&self.feature_dims);
        dims
    }

    pub fn output_desc(&self, data_type: DataType) -> Result<TensorDesc, SeqPackError> {
        TensorDesc::new(self.output_dims(), data_type)
    }
}

/// Validate a lengths tensor and widen it to indices.
///
/// Every entry is checked, not just the maximum.
pub fn read_lengths(lengths: &Tensor) -> Result<Vec<usize>, SeqPackError> {
    if lengths.desc.ndim() != 1 {
        return Err(SeqPackError::InvalidArgument(format!(
            "lengths must be 1-dimensional, got shape {:?}",
            lengths.dims()
        )));
    }
    if lengths.desc.data_type() != DataType::Int32 {
        return Err(SeqPackError::InvalidArgument(format!(
            "lengths must be Int32, got {:?}",
            lengths.desc.data_type()
        )));
    }
    lengths.check_storage()?;

    lengths
        .to_vec::<i32>()?
        .into_iter()
        .enumerate()
        .map(|(i, len)| {
            usize::try_from(len).map_err(|_| {
                SeqPackError::InvalidArgument(format!("lengths[{}] is negative ({})", i, len))
            })
        })
        .collect()
}
