//! Edge-triggered pin boundary between an emulated CPU's parallel port and
//! the peripherals wired to it.
//!
//! The CPU side only ever writes pin levels. A peripheral subscribes to
//! transitions on the pins it cares about and answers by driving other pins
//! through a [`PinDriver`]. Listeners run synchronously inside the write that
//! produced the edge, so the CPU's next read already observes their output.

use std::cell::RefCell;
use std::rc::Rc;

/// Pin transition a listener subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    Either,
}

impl Edge {
    /// Returns true if a transition from `old` to `new` matches this edge.
    pub fn matches(self, old: bool, new: bool) -> bool {
        match self {
            Edge::Rising => !old && new,
            Edge::Falling => old && !new,
            Edge::Either => old != new,
        }
    }
}

/// Drives the level of an input pin as seen by the CPU.
pub trait PinDriver {
    fn set_pin_level(&mut self, pin: u8, level: bool);
}

/// Callback invoked on a subscribed pin edge.
///
/// `level` is the new level of `pin`. `pins` is the port the edge happened
/// on; handlers use it to drive their output lines before the CPU's write
/// returns.
pub trait PinEdgeListener {
    fn on_edge(&mut self, pin: u8, level: bool, pins: &mut dyn PinDriver);
}

/// A listener shared between the port and whoever owns the peripheral.
pub type SharedListener = Rc<RefCell<dyn PinEdgeListener>>;

/// A port that dispatches pin edges to registered listeners.
pub trait PinPort: PinDriver {
    /// Subscribe `listener` to `edge` transitions of `pin`.
    ///
    /// A pin holds at most one listener; registering on an occupied pin
    /// fails with [`PioError::PinBusy`] and leaves the existing listener
    /// in place.
    fn register_pin_edge_listener(
        &mut self,
        pin: u8,
        edge: Edge,
        listener: SharedListener,
    ) -> Result<(), PioError>;

    /// Remove the listener on `pin`. Returns false if there was none.
    fn unregister_pin_edge_listener(&mut self, pin: u8) -> bool;

    fn has_pin_edge_listener(&self, pin: u8) -> bool;
}

/// Errors reported by a [`PinPort`] when registering listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PioError {
    /// The pin number does not exist on this port.
    InvalidPin(u8),
    /// The pin already has a listener.
    PinBusy(u8),
}

impl std::fmt::Display for PioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "no such pin: {pin}"),
            Self::PinBusy(pin) => write!(f, "pin {pin} already has an edge listener"),
        }
    }
}

impl std::error::Error for PioError {}
