mod data;
pub use data::TensorData;
mod data_type;
pub use data_type::DataType;
mod desc;
pub use desc::TensorDesc;
pub mod device;
mod element;
pub use element::Element;
mod tensor;
pub use tensor::{DeviceId, Tensor};
