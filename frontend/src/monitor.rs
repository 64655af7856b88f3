use std::error::Error;
use std::rc::Rc;
use std::time::Duration;

use sdl2::EventPump;
use sdl2::event::Event;
use snespad_core::device::{AdapterPins, UserPortPio, read_pad};
use snespad_core::input::{
    ButtonMapping, DevicePoller, DeviceState, MappingStore, SnesButton, UserPort,
};
use tracing::info;

use crate::host::SdlDevices;

/// Attach one controller to a user port and read it like a program on the
/// emulated CPU would, printing the pad word whenever it changes along with
/// the host buttons behind it.
///
/// Runs until the controller disconnects or the user interrupts.
pub fn run(
    devices: Rc<SdlDevices>,
    event_pump: &mut EventPump,
    mappings: &mut MappingStore,
    device_index: usize,
    pins: AdapterPins,
    poll_interval: Duration,
) -> Result<(), Box<dyn Error>> {
    let device_id = devices
        .device_id(device_index)
        .ok_or_else(|| format!("no controller at index {device_index}"))?;
    let instance_id = devices.instance_id(device_index);

    let mut pio = UserPortPio::new();
    let mut port = UserPort::new();
    let poller: Rc<dyn DevicePoller> = devices.clone();
    port.attach(&mut pio, &poller, mappings, device_index, &device_id, pins)?;
    println!(
        "monitoring {device_id} (latch {}, clock {}, data {})",
        pins.latch, pins.clock, pins.data
    );

    let mut last = None;
    'main: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'main,
                Event::ControllerDeviceRemoved { which, .. } if Some(which) == instance_id => {
                    info!(device_index, "controller disconnected");
                    break 'main;
                }
                _ => {}
            }
        }

        let word = read_pad(&mut pio, pins)?;
        if last != Some(word) {
            let host = devices
                .poll(device_index)
                .map(|state| host_presses(&mappings.working(&device_id), &state))
                .unwrap_or_default();
            println!("{word:016b}  {:<24} {host}", describe(word));
            last = Some(word);
        }

        std::thread::sleep(poll_interval);
    }

    port.detach_all(&mut pio);
    Ok(())
}

fn describe(word: u16) -> String {
    let names: Vec<_> = SnesButton::pressed_in(word).map(SnesButton::name).collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(" ")
    }
}

/// Pressed host buttons and the pad buttons each one drives, e.g.
/// `0:B 8:A+Start 12:-`.
fn host_presses(mapping: &ButtonMapping, state: &DeviceState) -> String {
    state
        .buttons
        .iter()
        .enumerate()
        .filter(|&(_, &down)| down)
        .filter_map(|(index, _)| u8::try_from(index).ok())
        .map(|host| {
            let bound: Vec<_> = mapping.buttons_for(host).map(SnesButton::name).collect();
            if bound.is_empty() {
                format!("{host}:-")
            } else {
                format!("{host}:{}", bound.join("+"))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
