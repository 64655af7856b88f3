//! Controllers attached to the user port.
//!
//! The application owns one [`UserPort`] per emulated machine and passes it
//! the PIO on every attach/detach. Each attached host device gets a
//! [`ControllerBinding`], which holds the adapter's listener registrations
//! on the LATCH and CLOCK pins.

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::core::pio::{Edge, PinPort, PioError, SharedListener};
use crate::device::snes_adapter::{AdapterPins, AdapterState, SnesAdapter};

use super::host::DevicePoller;
use super::store::{MappingHandle, MappingStore};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from attaching a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    /// Another device is already bound to one of the pins.
    PinsInUse { pins: AdapterPins, owner: usize },

    /// The port refused a listener registration.
    Pio(PioError),
}

impl std::fmt::Display for AttachError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PinsInUse { pins, owner } => write!(
                f,
                "pins {}/{}/{} overlap device {owner}",
                pins.latch, pins.clock, pins.data
            ),
            Self::Pio(e) => write!(f, "pin registration failed: {e}"),
        }
    }
}

impl std::error::Error for AttachError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pio(e) => Some(e),
            Self::PinsInUse { .. } => None,
        }
    }
}

impl From<PioError> for AttachError {
    fn from(e: PioError) -> Self {
        Self::Pio(e)
    }
}

// ---------------------------------------------------------------------------
// ControllerBinding
// ---------------------------------------------------------------------------

/// One host device bound to a set of user-port pins.
pub struct ControllerBinding {
    device_index: usize,
    device_id: String,
    pins: AdapterPins,
    adapter: Rc<RefCell<SnesAdapter>>,
    attached: bool,
}

impl ControllerBinding {
    /// Register a fresh adapter on the LATCH and CLOCK rising edges.
    ///
    /// If the CLOCK registration fails the LATCH registration is removed
    /// again, so an error leaves the port untouched.
    pub fn attach(
        port: &mut dyn PinPort,
        device_index: usize,
        device_id: &str,
        pins: AdapterPins,
        poller: Rc<dyn DevicePoller>,
        mapping: MappingHandle,
    ) -> Result<Self, AttachError> {
        pins.validate()?;

        let adapter = Rc::new(RefCell::new(SnesAdapter::new(
            device_index,
            pins,
            poller,
            mapping,
        )));
        register(port, pins, adapter.clone())?;

        debug!(device_index, device_id, ?pins, "attached controller");
        Ok(Self {
            device_index,
            device_id: device_id.to_string(),
            pins,
            adapter,
            attached: true,
        })
    }

    /// Register the same adapter again on the pins it was detached from.
    /// Does nothing if still attached.
    pub fn reattach(&mut self, port: &mut dyn PinPort) -> Result<(), AttachError> {
        if self.attached {
            return Ok(());
        }
        register(port, self.pins, self.adapter.clone())?;
        self.attached = true;
        debug!(
            device_index = self.device_index,
            device_id = %self.device_id,
            "reattached controller"
        );
        Ok(())
    }

    /// Remove both listener registrations. Detaching twice is a no-op.
    pub fn detach(&mut self, port: &mut dyn PinPort) {
        if !self.attached {
            return;
        }
        port.unregister_pin_edge_listener(self.pins.latch);
        port.unregister_pin_edge_listener(self.pins.clock);
        self.attached = false;
        debug!(
            device_index = self.device_index,
            device_id = %self.device_id,
            "detached controller"
        );
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn device_index(&self) -> usize {
        self.device_index
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn pins(&self) -> AdapterPins {
        self.pins
    }

    pub fn state(&self) -> AdapterState {
        if self.attached {
            self.adapter.borrow().state()
        } else {
            AdapterState::Idle
        }
    }

    /// The adapter, for inspecting its register and cursor.
    pub fn adapter(&self) -> Ref<'_, SnesAdapter> {
        self.adapter.borrow()
    }
}

/// LATCH then CLOCK on the rising edge. A CLOCK failure unregisters LATCH.
fn register(
    port: &mut dyn PinPort,
    pins: AdapterPins,
    adapter: Rc<RefCell<SnesAdapter>>,
) -> Result<(), PioError> {
    let listener: SharedListener = adapter;
    port.register_pin_edge_listener(pins.latch, Edge::Rising, Rc::clone(&listener))?;
    if let Err(e) = port.register_pin_edge_listener(pins.clock, Edge::Rising, listener) {
        port.unregister_pin_edge_listener(pins.latch);
        return Err(e);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// UserPort
// ---------------------------------------------------------------------------

/// Attached controllers, keyed by host device index.
#[derive(Default)]
pub struct UserPort {
    bindings: BTreeMap<usize, ControllerBinding>,
}

impl UserPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the host device at `device_index` to `pins`.
    ///
    /// Re-attaching a device that is already attached replaces its old
    /// binding. Attaching to any pin held by a different device is rejected
    /// and that device's binding is left intact. If the new registration
    /// fails, the old binding of this device is restored on its old pins.
    pub fn attach(
        &mut self,
        port: &mut dyn PinPort,
        poller: &Rc<dyn DevicePoller>,
        mappings: &mut MappingStore,
        device_index: usize,
        device_id: &str,
        pins: AdapterPins,
    ) -> Result<(), AttachError> {
        pins.validate()?;
        if let Some(owner) = self
            .bindings
            .values()
            .find(|b| b.device_index != device_index && b.pins.overlaps(&pins))
        {
            warn!(
                device_index,
                owner = owner.device_index,
                ?pins,
                "pins already bound, attach rejected"
            );
            return Err(AttachError::PinsInUse {
                pins,
                owner: owner.device_index,
            });
        }

        let mut previous = self.bindings.remove(&device_index);
        if let Some(previous) = previous.as_mut() {
            previous.detach(port);
        }

        match ControllerBinding::attach(
            port,
            device_index,
            device_id,
            pins,
            Rc::clone(poller),
            mappings.handle(device_id),
        ) {
            Ok(binding) => {
                self.bindings.insert(device_index, binding);
                Ok(())
            }
            Err(e) => {
                if let Some(mut previous) = previous {
                    match previous.reattach(port) {
                        Ok(()) => {
                            self.bindings.insert(device_index, previous);
                        }
                        Err(restore) => warn!(
                            device_index,
                            error = %restore,
                            "could not restore previous binding"
                        ),
                    }
                }
                Err(e)
            }
        }
    }

    /// Detach the device at `device_index`. Returns false if it was not
    /// attached.
    pub fn detach(&mut self, port: &mut dyn PinPort, device_index: usize) -> bool {
        match self.bindings.remove(&device_index) {
            Some(mut binding) => {
                binding.detach(port);
                true
            }
            None => false,
        }
    }

    pub fn detach_all(&mut self, port: &mut dyn PinPort) {
        for (_, mut binding) in std::mem::take(&mut self.bindings) {
            binding.detach(port);
        }
    }

    pub fn is_attached(&self, device_index: usize) -> bool {
        self.bindings.contains_key(&device_index)
    }

    pub fn binding(&self, device_index: usize) -> Option<&ControllerBinding> {
        self.bindings.get(&device_index)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &ControllerBinding> {
        self.bindings.values()
    }
}
