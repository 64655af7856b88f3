pub mod snes_adapter;
pub mod user_port;

pub use snes_adapter::{AdapterPins, AdapterState, SnesAdapter, read_pad};
pub use user_port::UserPortPio;
