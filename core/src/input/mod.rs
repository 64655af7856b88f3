pub mod button;
pub mod host;
pub mod mapping;
pub mod registry;
pub mod store;

pub use button::{BUTTON_COUNT, SnesButton};
pub use host::{DeviceInfo, DevicePoller, DeviceState, VirtualDevices};
pub use mapping::{ButtonMapping, MappingError};
pub use registry::{AttachError, ControllerBinding, UserPort};
pub use store::{KeyValueStore, MappingHandle, MappingStore, MemoryStore, StoreError};
