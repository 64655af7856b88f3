//! Host input devices as seen by the adapter.
//!
//! A [`DevicePoller`] reports the pads currently connected to the host. The
//! adapter only ever asks for one device's digital buttons at LATCH time;
//! axis values are carried along for display.

use std::cell::RefCell;
use std::collections::BTreeMap;

/// Snapshot of one host device's inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviceState {
    /// Digital button states, indexed by host button index.
    pub buttons: Vec<bool>,
    /// Axis positions in [-1.0, 1.0].
    pub axes: Vec<f32>,
}

impl DeviceState {
    /// A device with `buttons` released buttons and `axes` centred axes.
    pub fn released(buttons: usize, axes: usize) -> Self {
        Self {
            buttons: vec![false; buttons],
            axes: vec![0.0; axes],
        }
    }

    /// Buttons past the end of the device read as released.
    pub fn is_pressed(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }
}

/// A connected host device.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceInfo {
    /// Stable for as long as the device stays connected.
    pub index: usize,
    /// Identity of the physical device, stable across reconnects.
    pub id: String,
    pub state: DeviceState,
}

/// Enumerates and polls host input devices.
pub trait DevicePoller {
    fn list_connected(&self) -> Vec<DeviceInfo>;

    /// Current state of the device at `index`, or `None` if it is not connected.
    fn poll(&self, index: usize) -> Option<DeviceState> {
        self.list_connected()
            .into_iter()
            .find(|d| d.index == index)
            .map(|d| d.state)
    }

    fn device_id(&self, index: usize) -> Option<String> {
        self.list_connected()
            .into_iter()
            .find(|d| d.index == index)
            .map(|d| d.id)
    }
}

/// In-memory devices driven programmatically.
///
/// All mutation goes through `&self` so the same instance can be shared with
/// attached adapters and still be updated between reads.
#[derive(Default)]
pub struct VirtualDevices {
    devices: RefCell<BTreeMap<usize, DeviceInfo>>,
}

impl VirtualDevices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a device with all buttons released. Replaces any device
    /// already at `index`.
    pub fn connect(&self, index: usize, id: &str, buttons: usize, axes: usize) {
        self.devices.borrow_mut().insert(
            index,
            DeviceInfo {
                index,
                id: id.to_string(),
                state: DeviceState::released(buttons, axes),
            },
        );
    }

    pub fn disconnect(&self, index: usize) -> bool {
        self.devices.borrow_mut().remove(&index).is_some()
    }

    /// Press or release a host button. Ignored for unknown devices or
    /// out-of-range buttons.
    pub fn set_button(&self, index: usize, button: usize, pressed: bool) {
        if let Some(slot) = self
            .devices
            .borrow_mut()
            .get_mut(&index)
            .and_then(|d| d.state.buttons.get_mut(button))
        {
            *slot = pressed;
        }
    }

    pub fn set_axis(&self, index: usize, axis: usize, value: f32) {
        if let Some(slot) = self
            .devices
            .borrow_mut()
            .get_mut(&index)
            .and_then(|d| d.state.axes.get_mut(axis))
        {
            *slot = value.clamp(-1.0, 1.0);
        }
    }

    pub fn release_all(&self, index: usize) {
        if let Some(device) = self.devices.borrow_mut().get_mut(&index) {
            device.state.buttons.fill(false);
        }
    }
}

impl DevicePoller for VirtualDevices {
    fn list_connected(&self) -> Vec<DeviceInfo> {
        self.devices.borrow().values().cloned().collect()
    }

    fn poll(&self, index: usize) -> Option<DeviceState> {
        self.devices.borrow().get(&index).map(|d| d.state.clone())
    }

    fn device_id(&self, index: usize) -> Option<String> {
        self.devices.borrow().get(&index).map(|d| d.id.clone())
    }
}
