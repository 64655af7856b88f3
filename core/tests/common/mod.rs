#![allow(dead_code)]

use std::rc::Rc;

use snespad_core::device::user_port::{REG_DATA, REG_DIRECTION};
use snespad_core::input::VirtualDevices;
use snespad_core::prelude::*;

pub const PADS: AdapterPins = AdapterPins::DEFAULT;

/// A user port, a set of virtual host pads and an in-memory mapping store,
/// wired the way a machine wires them.
pub struct Rig {
    pub pio: UserPortPio,
    pub devices: Rc<VirtualDevices>,
    pub poller: Rc<dyn DevicePoller>,
    pub mappings: MappingStore,
    pub port: UserPort,
}

impl Rig {
    pub fn new() -> Self {
        let devices = Rc::new(VirtualDevices::new());
        let poller: Rc<dyn DevicePoller> = devices.clone();
        let mut pio = UserPortPio::new();
        // LATCH and CLOCK driven by the CPU, everything else input
        pio.write(REG_DIRECTION, (1 << PADS.latch) | (1 << PADS.clock));
        Self {
            pio,
            devices,
            poller,
            mappings: MappingStore::in_memory(),
            port: UserPort::new(),
        }
    }

    /// Connect a 16-button pad at `index` and attach it on the default pins.
    pub fn with_pad(index: usize, id: &str) -> Self {
        let mut rig = Self::new();
        rig.devices.connect(index, id, 16, 2);
        rig.attach(index, id, PADS).unwrap();
        rig
    }

    pub fn attach(&mut self, index: usize, id: &str, pins: AdapterPins) -> Result<(), AttachError> {
        self.port
            .attach(&mut self.pio, &self.poller, &mut self.mappings, index, id, pins)
    }

    pub fn detach(&mut self, index: usize) -> bool {
        self.port.detach(&mut self.pio, index)
    }

    pub fn press(&self, index: usize, buttons: &[usize]) {
        self.devices.release_all(index);
        for &b in buttons {
            self.devices.set_button(index, b, true);
        }
    }

    /// Pulse a CPU-driven pin high then low.
    pub fn pulse(&mut self, pin: u8) {
        let idle = self.pio.output_latch() & !(1 << pin);
        self.pio.write(REG_DATA, idle | (1 << pin));
        self.pio.write(REG_DATA, idle);
    }

    pub fn latch(&mut self) {
        self.pulse(PADS.latch);
    }

    pub fn clock(&mut self) {
        self.pulse(PADS.clock);
    }

    pub fn data(&self) -> bool {
        self.pio.pin_level(PADS.data)
    }

    /// LATCH then 16 reads, one CLOCK between each.
    pub fn read_bits(&mut self) -> Vec<bool> {
        self.latch();
        let mut bits = vec![self.data()];
        for _ in 1..16 {
            self.clock();
            bits.push(self.data());
        }
        bits
    }
}

pub fn word_to_bits(word: u16) -> Vec<bool> {
    (0..16).map(|i| (word >> i) & 1 != 0).collect()
}
