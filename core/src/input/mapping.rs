//! Logical-button to host-button mapping and its persisted record format.
//!
//! A record is a JSON object keyed by button name, with the host button
//! index as value and `-1` for an ignored button:
//!
//! ```text
//! {"A":8,"B":0,"L":10,"R":11,"Select":2,"Start":3,"Unused1":-1,...}
//! ```
//!
//! Buttons missing from a record keep their canonical binding. An `Ignore`
//! key is skipped.

use serde_json::{Map, Value};

use super::button::{BUTTON_COUNT, SnesButton};
use super::host::DeviceState;

/// Host index value stored for an ignored button.
pub const IGNORE: i64 = -1;

/// Key some front-ends write when a host button is set to "Ignore". It
/// binds nothing and is skipped on load.
const IGNORE_LABEL: &str = "Ignore";

/// Binds each logical button to at most one host button.
///
/// Several logical buttons may share a host button; pressing it then sets
/// all of their bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonMapping {
    slots: [Option<u8>; BUTTON_COUNT],
}

impl ButtonMapping {
    /// The canonical mapping: host button n drives bit n for the twelve
    /// physical buttons, the unused bits are ignored.
    pub fn new() -> Self {
        let mut slots = [None; BUTTON_COUNT];
        for button in SnesButton::ALL {
            slots[button.bit()] = button.default_host_index();
        }
        Self { slots }
    }

    /// A mapping with every button ignored.
    pub fn unmapped() -> Self {
        Self {
            slots: [None; BUTTON_COUNT],
        }
    }

    pub fn host_index(&self, button: SnesButton) -> Option<u8> {
        self.slots[button.bit()]
    }

    /// Rebind `button`. `None` ignores it. Replaces any previous binding.
    pub fn set(&mut self, button: SnesButton, host: Option<u8>) {
        self.slots[button.bit()] = host;
    }

    /// Logical buttons driven by host button `host`.
    pub fn buttons_for(&self, host: u8) -> impl Iterator<Item = SnesButton> + '_ {
        SnesButton::ALL
            .into_iter()
            .filter(move |b| self.slots[b.bit()] == Some(host))
    }

    /// Pack a device state into a register word, bit n = `SnesButton` n.
    ///
    /// An absent device reads as nothing pressed.
    pub fn sample(&self, state: Option<&DeviceState>) -> u16 {
        let Some(state) = state else {
            return 0;
        };
        SnesButton::ALL
            .into_iter()
            .filter(|b| {
                self.slots[b.bit()].is_some_and(|host| state.is_pressed(host as usize))
            })
            .fold(0, |word, b| word | (1 << b.bit()))
    }

    /// Serialize to the persisted record format.
    pub fn to_record(&self) -> String {
        let mut record = Map::new();
        for button in SnesButton::ALL {
            let index = self.host_index(button).map_or(IGNORE, i64::from);
            record.insert(button.name().to_string(), Value::from(index));
        }
        Value::Object(record).to_string()
    }

    /// Parse and validate a persisted record.
    pub fn from_record(text: &str) -> Result<Self, MappingError> {
        let Value::Object(record) = serde_json::from_str::<Value>(text)? else {
            return Err(MappingError::NotAnObject);
        };

        let mut mapping = Self::new();
        for (name, value) in &record {
            if name.eq_ignore_ascii_case(IGNORE_LABEL) {
                continue;
            }
            let button = SnesButton::from_name(name)
                .ok_or_else(|| MappingError::UnknownButton(name.clone()))?;
            let host = match value.as_i64() {
                Some(IGNORE) => None,
                Some(index) => Some(u8::try_from(index).map_err(|_| {
                    MappingError::InvalidIndex {
                        button,
                        value: value.to_string(),
                    }
                })?),
                None => {
                    return Err(MappingError::InvalidIndex {
                        button,
                        value: value.to_string(),
                    });
                }
            };
            mapping.set(button, host);
        }
        Ok(mapping)
    }
}

impl Default for ButtonMapping {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Reasons a persisted mapping record is rejected.
#[derive(Debug)]
pub enum MappingError {
    /// Not valid JSON.
    Syntax(serde_json::Error),

    /// Valid JSON, but not an object.
    NotAnObject,

    /// A key that is not a button name.
    UnknownButton(String),

    /// A value that is not -1 or a host index in 0..=255.
    InvalidIndex { button: SnesButton, value: String },
}

impl std::fmt::Display for MappingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(e) => write!(f, "mapping is not valid JSON: {e}"),
            Self::NotAnObject => write!(f, "mapping is not a JSON object"),
            Self::UnknownButton(name) => write!(f, "mapping names unknown button {name:?}"),
            Self::InvalidIndex { button, value } => {
                write!(f, "mapping for {button} has invalid host index {value}")
            }
        }
    }
}

impl std::error::Error for MappingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Syntax(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MappingError {
    fn from(e: serde_json::Error) -> Self {
        Self::Syntax(e)
    }
}
