pub mod pio;

pub use pio::{Edge, PinDriver, PinEdgeListener, PinPort, PioError, SharedListener};
