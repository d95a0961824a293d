use bytemuck::Pod;
use std::fmt::Debug;

use crate::tensor::DataType;

mod sealed {
    pub trait Sealed {}

    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Scalar types the sequence kernels are instantiated for.
///
/// Sealed: the set is fixed to `i32`, `i64`, `f32` and `f64`. Everything
/// else is rejected at the dispatch boundary with `UnsupportedType`.
pub trait Element: Pod + Debug + PartialEq + Send + Sync + sealed::Sealed {
    const DATA_TYPE: DataType;
}

impl Element for i32 {
    const DATA_TYPE: DataType = DataType::Int32;
}

impl Element for i64 {
    const DATA_TYPE: DataType = DataType::Int64;
}

impl Element for f32 {
    const DATA_TYPE: DataType = DataType::Float;
}

impl Element for f64 {
    const DATA_TYPE: DataType = DataType::Double;
}
