pub mod core;
pub mod device;
pub mod input;

pub mod prelude {
    pub use crate::core::{Edge, PinDriver, PinEdgeListener, PinPort, PioError};
    pub use crate::device::{AdapterPins, AdapterState, UserPortPio, read_pad};
    pub use crate::input::{
        AttachError, ButtonMapping, DevicePoller, DeviceState, MappingStore, SnesButton, UserPort,
    };
}
