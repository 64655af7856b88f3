//! SNES joypad shift register on a user port.
//!
//! The pad answers two control lines driven by the CPU:
//! - LATCH rising edge: sample the host device through the button mapping,
//!   freeze the result in a 16-bit register and present bit 0 on DATA
//! - CLOCK rising edge: advance to the next bit and present it on DATA
//!
//! Bits come out in [`SnesButton`] order, 1 = pressed. After the 16th bit
//! DATA reads 1 on every further CLOCK until the next LATCH, as on real
//! pads.
//!
//! ```text
//! LATCH  _/‾\____________________________
//! CLOCK  ______/‾\__/‾\__ ... __/‾\__/‾\_
//! DATA   ==B===X=Y==X=Sel ... ==U4==X=1==
//! ```
use std::rc::Rc;

use tracing::trace;

use crate::core::pio::{PinDriver, PinEdgeListener, PioError};
use crate::device::user_port::{PIN_COUNT, REG_DATA, REG_DIRECTION, UserPortPio};
use crate::input::button::{BUTTON_COUNT, SnesButton};
use crate::input::host::DevicePoller;
use crate::input::store::MappingHandle;

const REGISTER_BITS: u8 = BUTTON_COUNT as u8;

/// User-port pins the pad is wired to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdapterPins {
    pub latch: u8,
    pub clock: u8,
    pub data: u8,
}

impl AdapterPins {
    /// Data on pin 0, LATCH on pin 2, CLOCK on pin 3. Pin 1 is left for
    /// the data line of a second pad.
    pub const DEFAULT: AdapterPins = AdapterPins {
        latch: 2,
        clock: 3,
        data: 0,
    };

    /// Check the pins exist and are distinct.
    pub fn validate(&self) -> Result<(), PioError> {
        for pin in [self.latch, self.clock, self.data] {
            if pin >= PIN_COUNT {
                return Err(PioError::InvalidPin(pin));
            }
        }
        if self.latch == self.clock || self.data == self.latch {
            return Err(PioError::PinBusy(self.latch));
        }
        if self.data == self.clock {
            return Err(PioError::PinBusy(self.clock));
        }
        Ok(())
    }

    /// True if the two wirings share any line. Two pads on one LATCH,
    /// CLOCK or DATA pin would drive or answer each other's cycle.
    pub fn overlaps(&self, other: &AdapterPins) -> bool {
        let mine = [self.latch, self.clock, self.data];
        [other.latch, other.clock, other.data]
            .iter()
            .any(|pin| mine.contains(pin))
    }
}

impl Default for AdapterPins {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Read-cycle state of an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdapterState {
    /// Not bound to any pins.
    Idle,
    /// Bound, no LATCH seen yet.
    Armed,
    /// Shifting out bits 0..16.
    Shifting,
    /// All 16 bits shifted out; DATA held at 1.
    Overrun,
}

/// Shift register for one bound host device.
pub struct SnesAdapter {
    device_index: usize,
    pins: AdapterPins,
    poller: Rc<dyn DevicePoller>,
    mapping: MappingHandle,
    register: u16,
    cursor: u8,
    state: AdapterState,
}

impl SnesAdapter {
    pub fn new(
        device_index: usize,
        pins: AdapterPins,
        poller: Rc<dyn DevicePoller>,
        mapping: MappingHandle,
    ) -> Self {
        Self {
            device_index,
            pins,
            poller,
            mapping,
            register: 0,
            cursor: 0,
            state: AdapterState::Armed,
        }
    }

    /// Sample the device and freeze the register. Drives DATA with bit 0.
    ///
    /// A disconnected device latches as nothing pressed.
    pub fn latch(&mut self, pins: &mut dyn PinDriver) {
        let mapping = self.mapping.snapshot();
        let device = self.poller.poll(self.device_index);
        self.register = mapping.sample(device.as_ref());
        self.cursor = 0;
        self.state = AdapterState::Shifting;
        trace!(
            device_index = self.device_index,
            present = device.is_some(),
            register = %format!("{:016b}", self.register),
            "latch"
        );
        pins.set_pin_level(self.pins.data, self.bit(0));
    }

    /// Advance to the next bit and drive DATA with it, or with 1 once all
    /// bits are out.
    pub fn clock(&mut self, pins: &mut dyn PinDriver) {
        self.cursor = (self.cursor + 1).min(REGISTER_BITS);
        let level = if self.cursor < REGISTER_BITS {
            self.state = AdapterState::Shifting;
            self.bit(self.cursor)
        } else {
            self.state = AdapterState::Overrun;
            true
        };
        pins.set_pin_level(self.pins.data, level);
    }

    fn bit(&self, index: u8) -> bool {
        (self.register >> index) & 1 != 0
    }

    pub fn device_index(&self) -> usize {
        self.device_index
    }

    pub fn pins(&self) -> AdapterPins {
        self.pins
    }

    /// The frozen register, bit n = [`SnesButton`] n.
    pub fn register(&self) -> u16 {
        self.register
    }

    /// Index of the bit currently on DATA (16 once overrun).
    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn pressed(&self) -> impl Iterator<Item = SnesButton> {
        SnesButton::pressed_in(self.register)
    }
}

impl PinEdgeListener for SnesAdapter {
    fn on_edge(&mut self, pin: u8, _level: bool, pins: &mut dyn PinDriver) {
        if pin == self.pins.latch {
            self.latch(pins);
        } else if pin == self.pins.clock {
            self.clock(pins);
        }
    }
}

/// Read one pad the way a program on the CPU does: pulse LATCH, sample
/// DATA, then pulse CLOCK and sample 15 more times.
///
/// Configures LATCH and CLOCK as outputs and DATA as input. Returns the
/// word with bit n = [`SnesButton`] n.
pub fn read_pad(port: &mut UserPortPio, pins: AdapterPins) -> Result<u16, PioError> {
    pins.validate()?;
    let latch = 1u8 << pins.latch;
    let clock = 1u8 << pins.clock;
    let data = 1u8 << pins.data;

    let direction = (port.read(REG_DIRECTION) | latch | clock) & !data;
    port.write(REG_DIRECTION, direction);

    let idle = port.output_latch() & !(latch | clock);
    port.write(REG_DATA, idle);
    port.write(REG_DATA, idle | latch);
    port.write(REG_DATA, idle);

    let mut word = 0u16;
    for bit in 0..REGISTER_BITS {
        if bit > 0 {
            port.write(REG_DATA, idle | clock);
            port.write(REG_DATA, idle);
        }
        if port.read(REG_DATA) & data != 0 {
            word |= 1 << bit;
        }
    }
    Ok(word)
}
