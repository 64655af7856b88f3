use std::rc::Rc;

use crate::core::pio::{Edge, PinDriver, PinPort, PioError, SharedListener};

/// Number of pins on the user port.
pub const PIN_COUNT: u8 = 8;

/// Register offsets as seen by the CPU.
pub const REG_DATA: u8 = 0;
pub const REG_DIRECTION: u8 = 1;

/// Eight-pin user-port PIO.
///
/// The port has:
/// - An output register latching CPU writes
/// - A direction register: 0=input, 1=output per bit
/// - External input levels driven by peripherals
///
/// | Offset | Register            |
/// |--------|---------------------|
/// | 0      | Port data           |
/// | 1      | Direction register  |
///
/// A pin's driven level is its output register bit when the pin is an
/// output, and low otherwise. Any CPU write that changes a driven level
/// dispatches the listener registered on that pin, in pin order, before
/// the write returns.
pub struct UserPortPio {
    pins: PortPins,
    listeners: [Option<Registration>; PIN_COUNT as usize],
}

struct Registration {
    edge: Edge,
    listener: SharedListener,
}

/// Pin state, kept apart from the listener table so a dispatched listener
/// can drive pins while the table is being walked.
#[derive(Default)]
struct PortPins {
    output: u8,    // Output register, written by CPU
    direction: u8, // Direction register (0=input, 1=output)
    input: u8,     // External input levels, set by peripherals
}

impl PortPins {
    /// Levels the CPU is actively driving.
    fn driven(&self) -> u8 {
        self.output & self.direction
    }

    /// Levels read back through the data register.
    fn levels(&self) -> u8 {
        (self.input & !self.direction) | self.driven()
    }
}

impl PinDriver for PortPins {
    fn set_pin_level(&mut self, pin: u8, level: bool) {
        if pin >= PIN_COUNT {
            return;
        }
        if level {
            self.input |= 1 << pin;
        } else {
            self.input &= !(1 << pin);
        }
    }
}

impl UserPortPio {
    /// Create a port with every pin an input, all levels low and no listeners.
    pub fn new() -> Self {
        Self {
            pins: PortPins::default(),
            listeners: Default::default(),
        }
    }

    /// Read a port register. `offset` is masked to one bit.
    pub fn read(&self, offset: u8) -> u8 {
        match offset & 0x01 {
            REG_DATA => self.pins.levels(),
            _ => self.pins.direction,
        }
    }

    /// Write a port register and dispatch any resulting pin edges.
    ///
    /// Pins switched from output to input fall to low as far as listeners
    /// are concerned, so a direction write can produce edges too.
    pub fn write(&mut self, offset: u8, data: u8) {
        let before = self.pins.driven();
        match offset & 0x01 {
            REG_DATA => self.pins.output = data,
            _ => self.pins.direction = data,
        }
        self.dispatch_edges(before);
    }

    /// Current output register (including bits on pins configured as input).
    pub fn output_latch(&self) -> u8 {
        self.pins.output
    }

    /// Effective level of one pin. Out-of-range pins read low.
    pub fn pin_level(&self, pin: u8) -> bool {
        pin < PIN_COUNT && (self.pins.levels() >> pin) & 1 != 0
    }

    /// Return to power-on state. Listeners stay registered.
    pub fn reset(&mut self) {
        self.pins = PortPins::default();
    }

    fn dispatch_edges(&mut self, before: u8) {
        let changed = before ^ self.pins.driven();
        if changed == 0 {
            return;
        }

        for pin in 0..PIN_COUNT {
            let mask = 1 << pin;
            if changed & mask == 0 {
                continue;
            }
            let Some(registration) = &self.listeners[pin as usize] else {
                continue;
            };

            let old = before & mask != 0;
            if registration.edge.matches(old, !old) {
                let listener = Rc::clone(&registration.listener);
                listener.borrow_mut().on_edge(pin, !old, &mut self.pins);
            }
        }
    }
}

impl Default for UserPortPio {
    fn default() -> Self {
        Self::new()
    }
}

impl PinDriver for UserPortPio {
    fn set_pin_level(&mut self, pin: u8, level: bool) {
        self.pins.set_pin_level(pin, level);
    }
}

impl PinPort for UserPortPio {
    fn register_pin_edge_listener(
        &mut self,
        pin: u8,
        edge: Edge,
        listener: SharedListener,
    ) -> Result<(), PioError> {
        let slot = self
            .listeners
            .get_mut(pin as usize)
            .ok_or(PioError::InvalidPin(pin))?;
        if slot.is_some() {
            return Err(PioError::PinBusy(pin));
        }
        *slot = Some(Registration { edge, listener });
        Ok(())
    }

    fn unregister_pin_edge_listener(&mut self, pin: u8) -> bool {
        self.listeners
            .get_mut(pin as usize)
            .and_then(Option::take)
            .is_some()
    }

    fn has_pin_edge_listener(&self, pin: u8) -> bool {
        self.listeners
            .get(pin as usize)
            .is_some_and(Option::is_some)
    }
}
