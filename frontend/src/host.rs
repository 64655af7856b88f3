use std::collections::BTreeMap;

use sdl2::GameControllerSubsystem;
use sdl2::controller::{Axis, Button, GameController};
use snespad_core::input::{DeviceInfo, DevicePoller, DeviceState};
use tracing::{info, warn};

/// Host button order. Position n is host button index n, laid out so the
/// canonical mapping puts each SNES button on the same physical spot of a
/// modern pad (SNES B is the bottom face button, SNES A the right one).
const HOST_BUTTONS: [Button; 15] = [
    Button::A,             // 0  -> B
    Button::X,             // 1  -> Y
    Button::Back,          // 2  -> Select
    Button::Start,         // 3  -> Start
    Button::DPadUp,        // 4  -> Up
    Button::DPadDown,      // 5  -> Down
    Button::DPadLeft,      // 6  -> Left
    Button::DPadRight,     // 7  -> Right
    Button::B,             // 8  -> A
    Button::Y,             // 9  -> X
    Button::LeftShoulder,  // 10 -> L
    Button::RightShoulder, // 11 -> R
    Button::Guide,
    Button::LeftStick,
    Button::RightStick,
];

const HOST_AXES: [Axis; 6] = [
    Axis::LeftX,
    Axis::LeftY,
    Axis::RightX,
    Axis::RightY,
    Axis::TriggerLeft,
    Axis::TriggerRight,
];

/// SDL game controllers, indexed by their joystick index at open time.
pub struct SdlDevices {
    _subsystem: GameControllerSubsystem,
    controllers: BTreeMap<usize, GameController>,
}

impl SdlDevices {
    /// Open every connected joystick SDL recognises as a game controller.
    pub fn open(subsystem: GameControllerSubsystem) -> Result<Self, String> {
        let mut controllers = BTreeMap::new();
        for index in 0..subsystem.num_joysticks()? {
            if !subsystem.is_game_controller(index) {
                continue;
            }
            match subsystem.open(index) {
                Ok(controller) => {
                    info!(index, name = %controller.name(), "opened game controller");
                    controllers.insert(index as usize, controller);
                }
                Err(e) => warn!(index, error = %e, "could not open game controller"),
            }
        }
        Ok(Self {
            _subsystem: subsystem,
            controllers,
        })
    }

    /// SDL instance id of the controller at `index`, as carried by
    /// controller events.
    pub fn instance_id(&self, index: usize) -> Option<u32> {
        self.controllers.get(&index).map(GameController::instance_id)
    }

    fn state_of(controller: &GameController) -> DeviceState {
        DeviceState {
            buttons: HOST_BUTTONS.iter().map(|&b| controller.button(b)).collect(),
            axes: HOST_AXES
                .iter()
                .map(|&a| f32::from(controller.axis(a)) / f32::from(i16::MAX))
                .map(|v| v.clamp(-1.0, 1.0))
                .collect(),
        }
    }
}

impl DevicePoller for SdlDevices {
    fn list_connected(&self) -> Vec<DeviceInfo> {
        self.controllers
            .iter()
            .filter(|(_, c)| c.attached())
            .map(|(&index, c)| DeviceInfo {
                index,
                id: c.name(),
                state: Self::state_of(c),
            })
            .collect()
    }

    fn poll(&self, index: usize) -> Option<DeviceState> {
        self.controllers
            .get(&index)
            .filter(|c| c.attached())
            .map(Self::state_of)
    }

    fn device_id(&self, index: usize) -> Option<String> {
        self.controllers
            .get(&index)
            .filter(|c| c.attached())
            .map(GameController::name)
    }
}

/// Display name of a host button index.
pub fn host_button_name(index: u8) -> String {
    HOST_BUTTONS
        .get(index as usize)
        .map(|b| b.string())
        .unwrap_or_else(|| format!("button{index}"))
}
